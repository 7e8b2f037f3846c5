//! End-to-end provisioning of a tool environment.
//!
//! Stages run strictly in order:
//! load manifest → reset storage → per tool (normalize, resolve URL, create
//! install dir, install) → write activation script. The first failure stops
//! the run and is returned wrapped with its stage and tool.

use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::activation;
use crate::config::ProvisionConfig;
use crate::error::Stage;
use crate::events::{EventSink, ProvisionEvent};
use crate::installer::{ArchiveInstaller, ArtifactFetcher, TarExtractor};
use crate::manifest::{Manifest, ToolSpec};
use crate::platform::Platform;
use crate::template::{Bindings, Template};
use crate::{Error, Result};

/// One tool installed by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledTool {
    /// Tool name.
    pub name: String,
    /// Tool version.
    pub version: String,
    /// URL the artifact was fetched from.
    pub url: String,
    /// `storage/<name>@<version>`.
    pub install_dir: PathBuf,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Environment directory.
    pub env_dir: PathBuf,
    /// Generated activation script.
    pub activate_script: PathBuf,
    /// Installed tools, in manifest order.
    pub tools: Vec<InstalledTool>,
}

/// Runs the provisioning pipeline.
#[derive(Debug)]
pub struct Provisioner {
    config: ProvisionConfig,
    platform: Platform,
    installer: ArchiveInstaller,
}

impl Provisioner {
    /// Create a provisioner for `platform`, downloading through `fetcher`.
    #[must_use]
    pub fn new(
        config: ProvisionConfig,
        platform: Platform,
        fetcher: Box<dyn ArtifactFetcher>,
    ) -> Self {
        let installer = ArchiveInstaller::new(fetcher, TarExtractor::new(&config.tar_program));
        Self {
            config,
            platform,
            installer,
        }
    }

    /// Provision the environment described by the manifest.
    ///
    /// # Errors
    ///
    /// Returns the first failure, wrapped in [`Error::Stage`].
    #[instrument(
        name = "provision",
        skip_all,
        fields(root = %self.config.root.display(), platform = %self.platform)
    )]
    pub async fn run(&self, events: &dyn EventSink) -> Result<ProvisionReport> {
        let manifest = Manifest::load(&self.config.manifest_path())
            .map_err(|e| e.at_stage(Stage::LoadManifest, None))?;

        let storage_dir = self
            .reset_storage()
            .map_err(|e| e.at_stage(Stage::ResetStorage, None))?;
        events.emit(&ProvisionEvent::StorageReset {
            path: storage_dir.clone(),
        });

        let mut tools = Vec::with_capacity(manifest.tools.len());
        for tool in &manifest.tools {
            let installed = self.install_tool(tool, &storage_dir, events).await?;
            tools.push(installed);
        }

        let activate_script = self
            .generate_activation_script(&manifest.tools)
            .map_err(|e| e.at_stage(Stage::GenerateActivationScript, None))?;
        events.emit(&ProvisionEvent::ScriptWritten {
            path: activate_script.clone(),
        });

        events.emit(&ProvisionEvent::Completed {
            env_name: self.config.env_name.clone(),
        });
        info!(tools = tools.len(), "Environment provisioned");

        Ok(ProvisionReport {
            env_dir: self.config.env_dir(),
            activate_script,
            tools,
        })
    }

    /// Create `bin/` and replace `storage/` with an empty directory.
    fn reset_storage(&self) -> Result<PathBuf> {
        let bin_dir = self.config.bin_dir();
        create_dir_all(&bin_dir)?;

        let storage_dir = self.config.storage_dir();
        match std::fs::remove_dir_all(&storage_dir) {
            Ok(()) => debug!(path = %storage_dir.display(), "Removed previous storage"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(Error::StorageResetFailed {
                    path: storage_dir,
                    source,
                });
            }
        }
        create_dir_all(&storage_dir)?;

        Ok(storage_dir)
    }

    async fn install_tool(
        &self,
        tool: &ToolSpec,
        storage_dir: &Path,
        events: &dyn EventSink,
    ) -> Result<InstalledTool> {
        let name = tool.name.as_str();
        let platform = self.platform.normalize(tool.normalization.as_ref());
        debug!(tool = name, %platform, "Normalized platform");

        let url = Template::parse(&tool.url_template)
            .and_then(|t| {
                t.render(
                    &Bindings::for_url(&tool.version, &platform),
                    self.config.unknown_variables,
                )
            })
            .map_err(|e| e.at_stage(Stage::ResolveUrl, Some(name)))?;

        let install_dir = resolve_install_dir(storage_dir, tool)
            .and_then(|dir| create_dir_all(&dir).map(|()| dir))
            .map_err(|e| e.at_stage(Stage::CreateInstallDir, Some(name)))?;

        events.emit(&ProvisionEvent::ToolStarted {
            name: tool.name.clone(),
            version: tool.version.clone(),
        });

        self.installer
            .install(&url, &install_dir, events)
            .await
            .map_err(|e| e.at_stage(Stage::Install, Some(name)))?;

        events.emit(&ProvisionEvent::ToolInstalled {
            name: tool.name.clone(),
            version: tool.version.clone(),
            install_dir: install_dir.clone(),
        });
        info!(tool = name, version = %tool.version, %url, "Installed tool");

        Ok(InstalledTool {
            name: tool.name.clone(),
            version: tool.version.clone(),
            url,
            install_dir,
        })
    }

    fn generate_activation_script(&self, tools: &[ToolSpec]) -> Result<PathBuf> {
        let env_dir = self.config.env_dir();
        let env_dir = env_dir.canonicalize().map_err(|source| Error::WriteFailed {
            path: env_dir.clone(),
            source,
        })?;

        let script = activation::render(
            &self.config.env_name,
            &env_dir,
            tools,
            self.config.unknown_variables,
        )?;

        let path = self.config.activate_path();
        activation::write(&path, &script)?;
        debug!(path = %path.display(), "Wrote activation script");
        Ok(path)
    }
}

/// `storage/<name>@<version>`, refusing anything that would resolve outside
/// `storage_dir`.
fn resolve_install_dir(storage_dir: &Path, tool: &ToolSpec) -> Result<PathBuf> {
    let dir_name = tool.install_dir_name();
    let mut components = Path::new(&dir_name).components();

    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(storage_dir.join(&dir_name)),
        _ => Err(Error::DirectoryCreateFailed {
            path: storage_dir.join(&dir_name),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("'{dir_name}' is not a plain directory name"),
            ),
        }),
    }
}

fn create_dir_all(path: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder
        .create(path)
        .map_err(|source| Error::DirectoryCreateFailed {
            path: path.to_path_buf(),
            source,
        })
}
