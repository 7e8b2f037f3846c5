//! Scratch file for in-flight downloads.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::trace;

use crate::{Error, Result};

const PREFIX: &str = "toolenv-download-";

/// A private temporary file that is deleted when dropped.
///
/// Dropping covers every exit path of an install: success, extraction
/// failure, or an early return on a download error.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Create a scratch file in the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteFailed`] if the file cannot be created.
    pub fn create() -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempfile()
            .map_err(|source| Error::WriteFailed {
                path: std::env::temp_dir(),
                source,
            })?;
        trace!(path = %file.path().display(), "Created scratch file");
        Ok(Self { file })
    }

    /// Path of the file on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Append bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteFailed`] on IO failure.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.file
            .as_file_mut()
            .write_all(bytes)
            .map_err(|source| self.write_failed(source))
    }

    /// Flush buffered content to disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteFailed`] on IO failure.
    pub fn flush(&mut self) -> Result<()> {
        self.file
            .as_file_mut()
            .flush()
            .map_err(|source| self.write_failed(source))
    }

    fn write_failed(&self, source: std::io::Error) -> Error {
        Error::WriteFailed {
            path: self.path().to_path_buf(),
            source,
        }
    }

    /// Close and delete the file now, returning where it was.
    #[must_use]
    pub fn remove(self) -> PathBuf {
        let path = self.path().to_path_buf();
        drop(self);
        path
    }
}
