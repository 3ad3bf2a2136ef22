mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod remote;

use crate::cli::{Cli, Commands};
use crate::config::PartialAppConfig;
use crate::error::{CliError, Result};
use clap::Parser;
use tokio::task;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook
        .install()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install error report hook: {}", e)))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("macromol CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    if let Some(num_threads) = cli.threads {
        info!("Setting Rayon global thread pool to {} threads.", num_threads);
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e)))?;
    }

    let config = PartialAppConfig::discover(cli.config.as_deref())?;

    let command_result = match &cli.command {
        Commands::Info(args) => {
            info!("Dispatching to 'info' command.");
            task::block_in_place(|| commands::info::run(args, &config))
        }
        Commands::Convert(args) => {
            info!("Dispatching to 'convert' command.");
            task::block_in_place(|| commands::convert::run(args, &config))
        }
        Commands::Assembly(args) => {
            info!("Dispatching to 'assembly' command.");
            task::block_in_place(|| commands::assembly::run(args, &config))
        }
        Commands::Fetch(args) => {
            info!("Dispatching to 'fetch' command.");
            commands::fetch::run(args, &config).await
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
