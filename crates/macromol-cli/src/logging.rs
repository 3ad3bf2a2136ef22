use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    prelude::*,
};

/// Crates whose events follow the `-v` count; everything else stays at WARN.
const OWN_TARGETS: [&str; 2] = ["macromol", "macromol_cli"];

pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// HTTP and runtime crates are capped at WARN so `-vvv` shows parsing detail, not socket traffic.
pub fn targets_for(level: LevelFilter) -> Targets {
    let dependencies = level.min(LevelFilter::WARN);
    OWN_TARGETS
        .iter()
        .fold(Targets::new().with_default(dependencies), |targets, &name| {
            targets.with_target(name, level)
        })
}

/// Installs the global subscriber: compact stderr output plus an optional plain log file.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let targets = targets_for(level_for(verbosity, quiet));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(CliError::Io)?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_thread_ids(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(targets)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use macromol::workflows::file::{File as StructureFile, FileFormat};
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{Level, debug, info, trace, warn};

    static INIT: Once = Once::new();

    const ONE_ATOM: &str = "ATOM      1  N   GLY A   1       0.000   0.000   0.000  1.00  0.00           N\n";

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0, false), LevelFilter::WARN);
        assert_eq!(level_for(1, false), LevelFilter::INFO);
        assert_eq!(level_for(2, false), LevelFilter::DEBUG);
        assert_eq!(level_for(7, false), LevelFilter::TRACE);
        assert_eq!(level_for(3, true), LevelFilter::OFF);
    }

    #[test]
    fn dependencies_never_exceed_warn() {
        let targets = targets_for(LevelFilter::TRACE);
        assert!(targets.would_enable("macromol::engine::builder", &Level::TRACE));
        assert!(targets.would_enable("macromol_cli::remote", &Level::DEBUG));
        assert!(!targets.would_enable("hyper_util::client", &Level::DEBUG));
        assert!(targets.would_enable("reqwest::connect", &Level::WARN));

        let quiet = targets_for(LevelFilter::OFF);
        assert!(!quiet.would_enable("macromol", &Level::ERROR));
        assert!(!quiet.would_enable("reqwest", &Level::ERROR));
    }

    #[test]
    #[serial]
    fn global_subscriber_accepts_library_events() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });

        warn!("This is a warning");
        info!("This is info");
        debug!("This is debug");
        trace!("This is trace");
        StructureFile::parse(ONE_ATOM, FileFormat::Pdb).unwrap();
    }

    #[test]
    #[serial]
    fn file_layer_records_library_events() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let file = File::create(&log_path).unwrap();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true);
        let subscriber = tracing_subscriber::registry()
            .with(targets_for(LevelFilter::INFO))
            .with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            StructureFile::parse(ONE_ATOM, FileFormat::Pdb).unwrap();
        });

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Loaded structure"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains("DEBUG"));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = Path::new("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
