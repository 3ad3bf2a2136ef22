use macromol::engine::config::ConfigError;
use macromol::engine::error::AssemblyError;
use macromol::workflows::file::FileError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to load '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error("Failed to write '{path}': {source}", path = path.display())]
    FileWriting {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration '{path}': {source}", path = path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("'{code}' is not a structure code the server recognises")]
    InvalidCode { code: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
