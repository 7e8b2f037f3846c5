//! toolenv CLI
//!
//! Provisions the tool environment described by `toolenv.yml` in the current
//! directory and writes a sourceable activation script.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod logging;
mod renderer;

use cli::{Cli, EXIT_FAILURE, EXIT_OK};
use logging::TracingConfig;
use renderer::{CliRenderer, JsonRenderer};
use toolenv_core::{EventSink, HttpFetcher, Platform, Provisioner};

fn main() {
    // NOTE: eprintln! here is intentional, tracing may be unusable during a panic.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    let exit_code = match rt.block_on(run(cli)) {
        Ok(()) => EXIT_OK,
        Err(report) => {
            eprintln!("{report:?}");
            EXIT_FAILURE
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> miette::Result<()> {
    logging::init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
    })?;

    let root = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to read the working directory: {e}"))?;
    let config = cli.provision_config(root);

    let platform = Platform::detect();
    tracing::debug!(%platform, "Detected platform");

    let fetcher = HttpFetcher::new()?;
    let provisioner = Provisioner::new(config, platform, Box::new(fetcher));

    let renderer: Box<dyn EventSink> = if cli.json {
        Box::new(JsonRenderer::new())
    } else {
        Box::new(CliRenderer::new())
    };

    let report = provisioner.run(renderer.as_ref()).await?;
    tracing::info!(
        tools = report.tools.len(),
        script = %report.activate_script.display(),
        "Done"
    );
    Ok(())
}
