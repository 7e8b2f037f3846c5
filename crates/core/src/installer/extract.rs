//! Archive extraction through the system `tar`.

use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

/// Compression of a tar archive, chosen from the URL's trailing extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.tgz` or `.gz`.
    TarGz,
    /// `.xz`.
    TarXz,
}

impl ArchiveFormat {
    /// Pick the format from a resolved URL.
    ///
    /// Only the trailing extension of the last path segment counts; the
    /// content is never sniffed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any other extension, or none.
    pub fn from_url(url: &str) -> Result<Self> {
        let extension = extension(url);
        match extension {
            ".tgz" | ".gz" => Ok(Self::TarGz),
            ".xz" => Ok(Self::TarXz),
            other => Err(Error::UnsupportedFormat {
                url: url.to_string(),
                extension: other.to_string(),
            }),
        }
    }

    /// `tar` mode flags for this format.
    #[must_use]
    pub fn tar_flags(self) -> &'static str {
        match self {
            Self::TarGz => "-xzf",
            Self::TarXz => "-xJf",
        }
    }
}

/// Trailing `.ext` of the last `/`-separated segment, or `""`.
fn extension(url: &str) -> &str {
    let segment = url.rsplit('/').next().unwrap_or(url);
    segment.rfind('.').map_or("", |dot| &segment[dot..])
}

/// Runs `tar` with one leading path component stripped.
#[derive(Debug, Clone)]
pub struct TarExtractor {
    program: PathBuf,
}

impl TarExtractor {
    /// Use `program` as the tar executable.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Unpack `archive` into `dest`, so `top/bin/tool` lands at `dest/bin/tool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExtractionFailed`] if `tar` cannot be started or exits
    /// unsuccessfully; its stderr is included in the message.
    pub async fn extract(&self, archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
        debug!(
            archive = %archive.display(),
            dest = %dest.display(),
            ?format,
            "Extracting archive"
        );

        let output = Command::new(&self.program)
            .arg(format.tar_flags())
            .arg(archive)
            .arg("-C")
            .arg(dest)
            .arg("--strip-components=1")
            .output()
            .await
            .map_err(|e| {
                Error::extraction_failed(
                    archive,
                    format!("failed to run {}: {e}", self.program.display()),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extraction_failed(
                archive,
                format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        Ok(())
    }
}
