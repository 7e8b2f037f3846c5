//! Manifest loading.
//!
//! The manifest is a YAML document with a top-level `tools` list. Decoding is
//! permissive: missing fields become empty values and semantic problems (such
//! as an unsupported archive extension) only surface when a tool is used.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::{Error, Result};

/// File name the manifest is read from when none is configured.
pub const DEFAULT_MANIFEST: &str = "toolenv.yml";

/// Env key that prepends to `PATH` instead of being exported on its own.
pub const PATH_KEY: &str = "PATH";

/// Ordered list of tools making up an environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Tools in installation order.
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
}

impl Manifest {
    /// Read and decode the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file cannot be read and
    /// [`Error::ConfigMalformed`] if it does not decode.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading manifest");

        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    /// Decode manifest content; `path` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigMalformed`] if the content does not decode or
    /// holds no YAML document at all.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        if is_blank(content) {
            return Err(Error::ConfigMalformed {
                path: path.to_path_buf(),
                source: serde::de::Error::custom("the manifest is empty"),
            });
        }

        let manifest: Self =
            serde_yaml::from_str(content).map_err(|source| Error::ConfigMalformed {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(tools = manifest.tools.len(), "Manifest decoded");
        Ok(manifest)
    }
}

/// True when `content` has nothing but whitespace and comments.
fn is_blank(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// One tool to install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name, namespaces the install directory.
    #[serde(default)]
    pub name: String,

    /// Opaque version string.
    #[serde(default)]
    pub version: String,

    /// Download URL template with `{{version}}`, `{{os}}` and `{{arch}}`.
    #[serde(default, rename = "url")]
    pub url_template: String,

    /// Variables to expose on activation, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    /// Per-tool renaming of the detected platform identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<Normalization>,
}

impl ToolSpec {
    /// Directory name under `storage/`, `<name>@<version>`.
    #[must_use]
    pub fn install_dir_name(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Aliasing tables from detected identifiers to the names a vendor uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalization {
    /// Detected architecture -> replacement.
    #[serde(default)]
    pub arch: HashMap<String, String>,

    /// Detected OS -> replacement.
    #[serde(default)]
    pub os: HashMap<String, String>,
}
