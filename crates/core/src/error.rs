//! Error types for provisioning operations.

use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error used for transport failures coming from any fetcher.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Pipeline stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading and decoding the manifest.
    LoadManifest,
    /// Creating `bin/` and wiping `storage/`.
    ResetStorage,
    /// Expanding the download URL template.
    ResolveUrl,
    /// Creating `storage/<name>@<version>/`.
    CreateInstallDir,
    /// Downloading and extracting the artifact.
    Install,
    /// Rendering and writing `bin/activate`.
    GenerateActivationScript,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadManifest => "loading the manifest",
            Self::ResetStorage => "resetting the storage",
            Self::ResolveUrl => "building the tool URL",
            Self::CreateInstallDir => "creating the installation directory",
            Self::Install => "downloading and extracting",
            Self::GenerateActivationScript => "generating the activation script",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while provisioning an environment.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The manifest file is absent or unreadable.
    #[error("Failed to open {}", path.display())]
    #[diagnostic(
        code(toolenv::config::not_found),
        help("Create a toolenv.yml in the current directory listing the tools to install")
    )]
    ConfigNotFound {
        /// Manifest path that was tried.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest does not match the expected schema.
    #[error("Failed to parse {}", path.display())]
    #[diagnostic(
        code(toolenv::config::malformed),
        help("The manifest needs a top-level `tools` list with name, version and url entries")
    )]
    ConfigMalformed {
        /// Manifest path.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The template substitution syntax is invalid.
    #[error("Malformed template '{template}' at offset {offset}: {message}")]
    #[diagnostic(
        code(toolenv::template::malformed),
        help("Placeholders are version, os or arch wrapped in double braces")
    )]
    TemplateMalformed {
        /// Template source.
        template: String,
        /// Byte offset of the offending placeholder.
        offset: usize,
        /// What is wrong with it.
        message: String,
    },

    /// The template parsed but could not be expanded.
    #[error("Failed to expand template '{template}': {message}")]
    #[diagnostic(code(toolenv::template::expansion_failed))]
    TemplateExpansionFailed {
        /// Template source.
        template: String,
        /// Reason.
        message: String,
    },

    /// A directory of the environment tree could not be created.
    #[error("Failed to create directory {}", path.display())]
    #[diagnostic(code(toolenv::fs::create_dir))]
    DirectoryCreateFailed {
        /// Directory path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The previous storage directory could not be removed.
    #[error("Failed to clean up the storage at {}", path.display())]
    #[diagnostic(code(toolenv::fs::storage_reset))]
    StorageResetFailed {
        /// Storage path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client")]
    #[diagnostic(code(toolenv::network::client))]
    HttpClient {
        /// Client builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Transport-level failure while fetching.
    #[error("Network error while fetching {url}")]
    #[diagnostic(code(toolenv::network::transport))]
    Network {
        /// URL being fetched.
        url: String,
        /// Transport error.
        #[source]
        source: BoxError,
    },

    /// The server answered 404.
    #[error("Failed to download file: {url} was not found")]
    #[diagnostic(
        code(toolenv::network::not_found),
        help("Check the tool's `url` template and `version` in the manifest")
    )]
    RemoteNotFound {
        /// URL being fetched.
        url: String,
    },

    /// The server answered with a non-success status other than 404.
    #[error("Failed to download file: {url} returned HTTP {status}")]
    #[diagnostic(code(toolenv::network::status))]
    RemoteError {
        /// URL being fetched.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The URL's trailing extension is not a supported archive type.
    #[error("Unsupported archive format: '{extension}' ({url})")]
    #[diagnostic(
        code(toolenv::archive::unsupported),
        help("Supported extensions are .tgz, .gz and .xz")
    )]
    UnsupportedFormat {
        /// Resolved URL.
        url: String,
        /// Extension found, empty when there is none.
        extension: String,
    },

    /// The archive could not be unpacked.
    #[error("Failed to extract {}: {message}", archive.display())]
    #[diagnostic(code(toolenv::archive::extraction_failed))]
    ExtractionFailed {
        /// Archive path.
        archive: PathBuf,
        /// Reason, including the extractor's stderr when available.
        message: String,
    },

    /// A file could not be written.
    #[error("Failed to write {}", path.display())]
    #[diagnostic(code(toolenv::fs::write))]
    WriteFailed {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An error annotated with the pipeline stage (and tool) it happened in.
    #[error(
        "Failed while {stage}{}",
        .tool.as_ref().map(|t| format!(" for {t}")).unwrap_or_default()
    )]
    #[diagnostic(code(toolenv::stage))]
    Stage {
        /// Stage that failed.
        stage: Stage,
        /// Tool being processed, if any.
        tool: Option<String>,
        /// Wrapped error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with stage context.
    #[must_use]
    pub fn at_stage(self, stage: Stage, tool: Option<&str>) -> Self {
        Self::Stage {
            stage,
            tool: tool.map(str::to_owned),
            source: Box::new(self),
        }
    }

    /// Create a template malformed error.
    #[must_use]
    pub fn template_malformed(
        template: impl Into<String>,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::TemplateMalformed {
            template: template.into(),
            offset,
            message: message.into(),
        }
    }

    /// Create a template expansion error.
    #[must_use]
    pub fn template_expansion(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateExpansionFailed {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Create an extraction failed error.
    #[must_use]
    pub fn extraction_failed(archive: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            archive: archive.into(),
            message: message.into(),
        }
    }

    /// The underlying error with all stage wrappers removed.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// The innermost stage this error was annotated with.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, source, .. } => source.stage().or(Some(*stage)),
            _ => None,
        }
    }
}
