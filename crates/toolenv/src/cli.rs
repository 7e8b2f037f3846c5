use clap::Parser;
use std::path::PathBuf;
use toolenv_core::config::DEFAULT_TAR_PROGRAM;
use toolenv_core::{DEFAULT_ENV_NAME, DEFAULT_MANIFEST, ProvisionConfig, UnknownVariablePolicy};

use crate::logging::{LogLevel, TracingFormat};

/// Exit code for a successful run.
pub const EXIT_OK: i32 = 0;
/// Exit code for a failed run.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "toolenv")]
#[command(about = "A virtual tool environment manager")]
#[command(
    long_about = "Reads toolenv.yml from the current directory, installs every listed tool \
                  into ./env/storage and writes ./env/bin/activate."
)]
#[command(version)]
pub struct Cli {
    #[arg(
        short = 'l',
        long,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(long, help = "Log format", default_value = "compact", value_enum)]
    pub log_format: TracingFormat,

    #[arg(long, help = "Emit progress events as JSON lines")]
    pub json: bool,

    #[arg(long, help = "Manifest file to read", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    #[arg(long, help = "Name of the environment directory", default_value = DEFAULT_ENV_NAME)]
    pub env_name: String,

    #[arg(long, help = "Fail on template placeholders without a value")]
    pub strict_templates: bool,

    #[arg(
        long,
        env = "TOOLENV_TAR",
        help = "tar executable used for extraction",
        default_value = DEFAULT_TAR_PROGRAM
    )]
    pub tar: PathBuf,
}

impl Cli {
    /// Build the run configuration rooted at `root`.
    pub fn provision_config(&self, root: PathBuf) -> ProvisionConfig {
        let policy = if self.strict_templates {
            UnknownVariablePolicy::Error
        } else {
            UnknownVariablePolicy::Empty
        };

        ProvisionConfig::new(root)
            .with_manifest(&self.manifest)
            .with_env_name(&self.env_name)
            .with_unknown_variables(policy)
            .with_tar_program(&self.tar)
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["toolenv"]).unwrap();

        assert_eq!(cli.level, LogLevel::Warn);
        assert_eq!(cli.log_format, TracingFormat::Compact);
        assert!(!cli.json);
        assert_eq!(cli.manifest, PathBuf::from("toolenv.yml"));
        assert_eq!(cli.env_name, "env");
        assert!(!cli.strict_templates);
    }

    #[test]
    fn test_cli_log_level_parsing() {
        let cli = Cli::try_parse_from(["toolenv", "--level", "debug"]).unwrap();
        assert_eq!(cli.level, LogLevel::Debug);

        let cli = Cli::try_parse_from(["toolenv", "-l", "error"]).unwrap();
        assert_eq!(cli.level, LogLevel::Error);
    }

    #[test]
    fn test_invalid_log_level() {
        let result = Cli::try_parse_from(["toolenv", "--level", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_positional_arguments_rejected() {
        let result = Cli::try_parse_from(["toolenv", "extra"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["toolenv", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_provision_config_mapping() {
        let cli = Cli::try_parse_from([
            "toolenv",
            "--manifest",
            "tools.yml",
            "--env-name",
            ".venv-tools",
            "--strict-templates",
            "--tar",
            "gtar",
        ])
        .unwrap();

        let config = cli.provision_config(PathBuf::from("/work"));
        assert_eq!(config.manifest_path(), PathBuf::from("/work/tools.yml"));
        assert_eq!(config.env_dir(), PathBuf::from("/work/.venv-tools"));
        assert_eq!(config.unknown_variables, UnknownVariablePolicy::Error);
        assert_eq!(config.tar_program, PathBuf::from("gtar"));
    }
}
