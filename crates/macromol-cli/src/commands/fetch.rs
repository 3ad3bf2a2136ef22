use crate::cli::FetchArgs;
use crate::commands::{info::Summary, save};
use crate::config::PartialAppConfig;
use crate::error::{CliError, Result};
use crate::remote::{self, FetchProgress};
use indicatif::{ProgressBar, ProgressStyle};
use macromol::workflows::file::{File, FileFormat};
use std::time::Duration;
use tracing::info;

const SPINNER_TICK_MS: u64 = 80;

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} {bytes}") {
        pb.set_style(style);
    }
    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr_with_hz(10));
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

pub async fn run(args: &FetchArgs, config: &PartialAppConfig) -> Result<()> {
    let settings = config.fetch_settings(args);
    let pb = spinner();
    pb.set_message(format!("Fetching {}...", args.code));

    let progress_callback = |progress: FetchProgress| match progress {
        FetchProgress::Started { total_size } => {
            if let Some(size) = total_size {
                pb.set_length(size);
            }
        }
        FetchProgress::Downloading { downloaded } => pb.set_position(downloaded),
    };

    let body = match remote::fetch(&args.code, &settings, progress_callback).await {
        Ok(body) => {
            pb.finish_and_clear();
            body
        }
        Err(e) => {
            pb.finish_with_message("✗ Download failed.");
            return Err(e);
        }
    };
    let Some(text) = body else {
        println!("No structure found for '{}'.", args.code);
        return Ok(());
    };

    let to_file = |e| CliError::FileParsing {
        path: args.code.clone().into(),
        source: e,
    };
    match &args.output {
        Some(path) if FileFormat::from_path(path) == Some(FileFormat::Mmcif) => {
            let file = File::parse(&text, FileFormat::Pdb).map_err(to_file)?;
            save(&file, path)?;
            println!("✓ Written to: {}", path.display());
        }
        Some(path) => {
            std::fs::write(path, &text)?;
            println!("✓ Written to: {}", path.display());
        }
        None => {
            let file = File::parse(&text, FileFormat::Pdb).map_err(to_file)?;
            println!("{}", Summary::of(&args.code, &file));
        }
    }
    info!("Fetched {}", args.code);
    Ok(())
}
