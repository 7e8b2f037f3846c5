//! Run configuration.

use std::path::PathBuf;

use crate::manifest::DEFAULT_MANIFEST;
use crate::template::UnknownVariablePolicy;

/// Environment directory name used when none is configured.
pub const DEFAULT_ENV_NAME: &str = "env";

/// Extraction program used when none is configured.
pub const DEFAULT_TAR_PROGRAM: &str = "tar";

/// Settings for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// Directory the manifest and the environment are resolved against.
    pub root: PathBuf,
    /// Manifest path, relative to `root` unless absolute.
    pub manifest: PathBuf,
    /// Environment directory name under `root`.
    pub env_name: String,
    /// Handling of placeholders without a binding.
    pub unknown_variables: UnknownVariablePolicy,
    /// Program invoked to unpack archives.
    pub tar_program: PathBuf,
}

impl ProvisionConfig {
    /// Defaults rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            env_name: DEFAULT_ENV_NAME.to_string(),
            unknown_variables: UnknownVariablePolicy::default(),
            tar_program: PathBuf::from(DEFAULT_TAR_PROGRAM),
        }
    }

    /// Set the manifest path.
    #[must_use]
    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = manifest.into();
        self
    }

    /// Set the environment directory name.
    #[must_use]
    pub fn with_env_name(mut self, env_name: impl Into<String>) -> Self {
        self.env_name = env_name.into();
        self
    }

    /// Set the unknown-variable policy.
    #[must_use]
    pub fn with_unknown_variables(mut self, policy: UnknownVariablePolicy) -> Self {
        self.unknown_variables = policy;
        self
    }

    /// Set the extraction program.
    #[must_use]
    pub fn with_tar_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.tar_program = program.into();
        self
    }

    /// Absolute-or-root-relative manifest path.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }

    /// `<root>/<env_name>`.
    #[must_use]
    pub fn env_dir(&self) -> PathBuf {
        self.root.join(&self.env_name)
    }

    /// `<root>/<env_name>/bin`.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.env_dir().join("bin")
    }

    /// `<root>/<env_name>/storage`.
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.env_dir().join("storage")
    }

    /// `<root>/<env_name>/bin/activate`.
    #[must_use]
    pub fn activate_path(&self) -> PathBuf {
        self.bin_dir().join("activate")
    }
}
