//! Download-and-unpack of a single tool artifact.
//!
//! An install is: pick the archive format from the URL, stream the artifact
//! into a [`ScratchFile`], run `tar` into the install directory, and drop the
//! scratch file whatever the outcome. Nothing is retried and a partially
//! extracted directory is left in place.

mod extract;
mod fetch;
mod scratch;

use std::path::Path;
use tracing::{debug, instrument};

use crate::events::{EventSink, ProvisionEvent};
use crate::Result;

pub use extract::{ArchiveFormat, TarExtractor};
pub use fetch::{ArtifactFetcher, HttpFetcher};
pub use scratch::ScratchFile;

/// Installs artifacts using a fetcher and a tar extractor.
pub struct ArchiveInstaller {
    fetcher: Box<dyn ArtifactFetcher>,
    extractor: TarExtractor,
}

impl ArchiveInstaller {
    /// Create an installer.
    #[must_use]
    pub fn new(fetcher: Box<dyn ArtifactFetcher>, extractor: TarExtractor) -> Self {
        Self { fetcher, extractor }
    }

    /// Fetch `url` and unpack it into `install_dir`, which must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedFormat`] before any network access
    /// when the URL's extension is not recognized, otherwise propagates
    /// fetcher and extractor errors.
    #[instrument(
        name = "install_artifact",
        skip(self, install_dir, events),
        fields(install_dir = %install_dir.display())
    )]
    pub async fn install(
        &self,
        url: &str,
        install_dir: &Path,
        events: &dyn EventSink,
    ) -> Result<()> {
        let format = ArchiveFormat::from_url(url)?;

        events.emit(&ProvisionEvent::Downloading {
            url: url.to_string(),
        });

        let mut scratch = ScratchFile::create()?;
        events.emit(&ProvisionEvent::ScratchCreated {
            path: scratch.path().to_path_buf(),
        });

        let result = self
            .fetch_and_extract(url, format, &mut scratch, install_dir)
            .await;

        let path = scratch.remove();
        events.emit(&ProvisionEvent::ScratchRemoved { path });

        result
    }

    async fn fetch_and_extract(
        &self,
        url: &str,
        format: ArchiveFormat,
        scratch: &mut ScratchFile,
        install_dir: &Path,
    ) -> Result<()> {
        let bytes = self.fetcher.fetch(url, scratch).await?;
        debug!(bytes, ?format, "Artifact downloaded");

        self.extractor
            .extract(scratch.path(), format, install_dir)
            .await
    }
}

impl std::fmt::Debug for ArchiveInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveInstaller")
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}
