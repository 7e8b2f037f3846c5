//! Event renderers for the toolenv CLI.
//!
//! This module is allowed to use println!/eprintln! as it's the output layer.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use toolenv_core::{EventSink, ProvisionEvent};

/// Output stream a rendered line belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Human-readable progress on stderr, run summary on stdout.
#[derive(Debug, Default)]
pub struct CliRenderer;

impl CliRenderer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Lines printed for `event`.
    pub fn lines(event: &ProvisionEvent) -> Vec<(Stream, String)> {
        match event {
            ProvisionEvent::ToolStarted { name, version } => {
                vec![(
                    Stream::Stderr,
                    format!("\nInstalling {name} version {version} ..."),
                )]
            }
            ProvisionEvent::Downloading { url } => {
                vec![(Stream::Stderr, format!("|- Downloading from \"{url}\""))]
            }
            ProvisionEvent::ScratchCreated { path } => vec![(
                Stream::Stderr,
                format!("|- Creating a temporary file {}", path.display()),
            )],
            ProvisionEvent::ScratchRemoved { path } => vec![(
                Stream::Stderr,
                format!("|- Removing the temporary file {}", path.display()),
            )],
            ProvisionEvent::ToolInstalled { .. } => {
                vec![(Stream::Stderr, "|- Done!".to_string())]
            }
            ProvisionEvent::Completed { env_name } => vec![
                (Stream::Stdout, format!("Environment created at ./{env_name}")),
                (
                    Stream::Stdout,
                    format!("Activate with: source ./{env_name}/bin/activate"),
                ),
            ],
            ProvisionEvent::StorageReset { .. } | ProvisionEvent::ScriptWritten { .. } => {
                Vec::new()
            }
        }
    }
}

impl EventSink for CliRenderer {
    fn emit(&self, event: &ProvisionEvent) {
        for (stream, line) in Self::lines(event) {
            match stream {
                Stream::Stdout => println!("{line}"),
                Stream::Stderr => eprintln!("{line}"),
            }
        }
    }
}

/// Every event as one JSON object per line on stdout.
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EventSink for JsonRenderer {
    fn emit(&self, event: &ProvisionEvent) {
        match serde_json::to_string(event) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
        }
    }
}
