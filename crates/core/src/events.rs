//! Progress events emitted while provisioning.
//!
//! The pipeline never prints. Frontends implement [`EventSink`] and decide how
//! (or whether) to show each event.

use serde::Serialize;
use std::path::PathBuf;

/// Something observable happened during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProvisionEvent {
    /// `storage/` was wiped and recreated.
    StorageReset {
        /// Storage directory.
        path: PathBuf,
    },
    /// A tool is about to be installed.
    ToolStarted {
        /// Tool name.
        name: String,
        /// Tool version.
        version: String,
    },
    /// The artifact download is starting.
    Downloading {
        /// Resolved URL.
        url: String,
    },
    /// The scratch download file was created.
    ScratchCreated {
        /// Scratch file path.
        path: PathBuf,
    },
    /// The scratch download file was removed.
    ScratchRemoved {
        /// Scratch file path.
        path: PathBuf,
    },
    /// A tool finished installing.
    ToolInstalled {
        /// Tool name.
        name: String,
        /// Tool version.
        version: String,
        /// Install directory.
        install_dir: PathBuf,
    },
    /// The activation script was written.
    ScriptWritten {
        /// Script path.
        path: PathBuf,
    },
    /// The whole run succeeded.
    Completed {
        /// Environment directory name, relative to the working directory.
        env_name: String,
    },
}

/// Receiver for [`ProvisionEvent`]s.
pub trait EventSink: Send + Sync {
    /// Handle one event.
    fn emit(&self, event: &ProvisionEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &ProvisionEvent) {}
}
