//! Provisioning pipeline for per-project virtual tool environments.
//!
//! A manifest (`toolenv.yml`) lists tools with a version, a download URL
//! template and the variables they expose. Provisioning downloads and unpacks
//! every tool into `env/storage/<name>@<version>/` and writes
//! `env/bin/activate`, a sourceable script that puts the tools on `PATH` and
//! defines `deactivate` to undo it.
//!
//! # Example
//!
//! ```ignore
//! use toolenv_core::{HttpFetcher, NoopSink, Platform, ProvisionConfig, Provisioner};
//!
//! let config = ProvisionConfig::new(std::env::current_dir()?);
//! let provisioner = Provisioner::new(config, Platform::detect(), Box::new(HttpFetcher::new()?));
//! let report = provisioner.run(&NoopSink).await?;
//! println!("source {}", report.activate_script.display());
//! ```

#![warn(missing_docs)]

pub mod activation;
pub mod config;
mod error;
pub mod events;
pub mod installer;
pub mod manifest;
mod orchestrator;
pub mod platform;
pub mod template;

pub use config::{DEFAULT_ENV_NAME, ProvisionConfig};
pub use error::{BoxError, Error, Result, Stage};
pub use events::{EventSink, NoopSink, ProvisionEvent};
pub use installer::{ArchiveFormat, ArtifactFetcher, HttpFetcher, ScratchFile};
pub use manifest::{DEFAULT_MANIFEST, Manifest, Normalization, ToolSpec};
pub use orchestrator::{InstalledTool, ProvisionReport, Provisioner};
pub use platform::Platform;
pub use template::{Bindings, Template, UnknownVariablePolicy};
