//! Platform detection and normalization.
//!
//! Detected identifiers follow the naming most release pages use
//! (`linux`/`darwin`/`windows`, `amd64`/`arm64`/`386`). A tool's
//! [`Normalization`] tables then rename each axis independently to whatever
//! that vendor's download scheme expects.

use std::fmt;

use crate::manifest::Normalization;

/// An (os, arch) pair used for URL resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Operating system identifier.
    pub os: String,
    /// Architecture identifier.
    pub arch: String,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the platform this process was built for.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_rust_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust's target identifiers onto release-page naming.
    #[must_use]
    pub fn from_rust_target(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "powerpc64" => "ppc64",
            "loongarch64" => "loong64",
            other => other,
        };
        Self::new(os, arch)
    }

    /// Apply a tool's aliasing tables.
    ///
    /// The architecture and the OS are looked up independently; a missing
    /// table or entry leaves that axis unchanged.
    #[must_use]
    pub fn normalize(&self, normalization: Option<&Normalization>) -> Self {
        let Some(normalization) = normalization else {
            return self.clone();
        };

        let arch = normalization
            .arch
            .get(&self.arch)
            .map_or_else(|| self.arch.clone(), Clone::clone);
        let os = normalization
            .os
            .get(&self.os)
            .map_or_else(|| self.os.clone(), Clone::clone);

        Self { os, arch }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
