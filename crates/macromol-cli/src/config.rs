use crate::cli::{BuildArgs, FetchArgs};
use crate::error::{CliError, Result};
use crate::remote::{DEFAULT_BASE_URL, FetchSettings};
use directories::ProjectDirs;
use macromol::engine::config::{BuildOptions, BuildOptionsBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialBuildConfig {
    infer_bonds: Option<bool>,
    reconstruct_missing_residues: Option<bool>,
    backbone_link_cutoff: Option<f64>,
    long_bond_threshold: Option<f64>,
    topology: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialFetchConfig {
    base_url: Option<String>,
    strict: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputConfig {
    trim: Option<u32>,
}

/// Settings read from the optional config file. Command-line flags win over every field.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    #[serde(default)]
    build: PartialBuildConfig,
    #[serde(default)]
    fetch: PartialFetchConfig,
    #[serde(default)]
    output: PartialOutputConfig,
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "macromol", "macromol").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `explicit` if given, else the platform config file if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No configuration file found, using defaults.");
                Ok(Self::default())
            }
        }
    }

    pub fn build_options(&self, args: &BuildArgs) -> Result<BuildOptions> {
        let file = &self.build;
        let mut builder = BuildOptionsBuilder::new();
        if args.no_bonds {
            builder = builder.infer_bonds(false);
        } else if let Some(enabled) = file.infer_bonds {
            builder = builder.infer_bonds(enabled);
        }
        if args.no_missing {
            builder = builder.reconstruct_missing_residues(false);
        } else if let Some(enabled) = file.reconstruct_missing_residues {
            builder = builder.reconstruct_missing_residues(enabled);
        }
        if let Some(cutoff) = file.backbone_link_cutoff {
            builder = builder.backbone_link_cutoff(cutoff);
        }
        if let Some(threshold) = file.long_bond_threshold {
            builder = builder.long_bond_threshold(threshold);
        }
        if let Some(path) = args.topology.as_ref().or(file.topology.as_ref()) {
            builder = builder.topology_path(path.clone());
        }
        Ok(builder.build()?)
    }

    pub fn fetch_settings(&self, args: &FetchArgs) -> FetchSettings {
        FetchSettings {
            base_url: args
                .base_url
                .clone()
                .or_else(|| self.fetch.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            strict: args.strict || self.fetch.strict.unwrap_or(false),
        }
    }

    pub fn trim(&self, cli_places: Option<u32>) -> Option<u32> {
        cli_places.or(self.output.trim)
    }
}
