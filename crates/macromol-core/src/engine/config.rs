use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub const DEFAULT_BACKBONE_LINK_CUTOFF: f64 = 5.0;
pub const DEFAULT_LONG_BOND_THRESHOLD: f64 = crate::core::models::model::DEFAULT_LONG_BOND_THRESHOLD;

/// Options controlling how an [`IntermediateDict`](crate::core::io::dict::IntermediateDict)
/// becomes models.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Create table-driven intra-residue bonds and backbone links. Listed `conect` bonds are
    /// made either way.
    pub infer_bonds: bool,
    /// Insert ghost residues for residues declared unobserved.
    pub reconstruct_missing_residues: bool,
    /// Largest distance, in Å, at which consecutive residues are linked.
    pub backbone_link_cutoff: f64,
    /// Bonds at least this long, in Å, raise a warning.
    pub long_bond_threshold: f64,
    /// A residue connectivity table replacing the embedded one.
    pub topology_path: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            infer_bonds: true,
            reconstruct_missing_residues: true,
            backbone_link_cutoff: DEFAULT_BACKBONE_LINK_CUTOFF,
            long_bond_threshold: DEFAULT_LONG_BOND_THRESHOLD,
            topology_path: None,
        }
    }
}

impl BuildOptions {
    pub fn builder() -> BuildOptionsBuilder {
        BuildOptionsBuilder::new()
    }
}

#[derive(Default)]
pub struct BuildOptionsBuilder {
    infer_bonds: Option<bool>,
    reconstruct_missing_residues: Option<bool>,
    backbone_link_cutoff: Option<f64>,
    long_bond_threshold: Option<f64>,
    topology_path: Option<PathBuf>,
}

impl BuildOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infer_bonds(mut self, enabled: bool) -> Self {
        self.infer_bonds = Some(enabled);
        self
    }
    pub fn reconstruct_missing_residues(mut self, enabled: bool) -> Self {
        self.reconstruct_missing_residues = Some(enabled);
        self
    }
    pub fn backbone_link_cutoff(mut self, angstroms: f64) -> Self {
        self.backbone_link_cutoff = Some(angstroms);
        self
    }
    pub fn long_bond_threshold(mut self, angstroms: f64) -> Self {
        self.long_bond_threshold = Some(angstroms);
        self
    }
    pub fn topology_path(mut self, path: PathBuf) -> Self {
        self.topology_path = Some(path);
        self
    }

    pub fn build(self) -> Result<BuildOptions, ConfigError> {
        let defaults = BuildOptions::default();
        let backbone_link_cutoff = positive(
            "backbone_link_cutoff",
            self.backbone_link_cutoff.unwrap_or(defaults.backbone_link_cutoff),
        )?;
        let long_bond_threshold = positive(
            "long_bond_threshold",
            self.long_bond_threshold.unwrap_or(defaults.long_bond_threshold),
        )?;
        Ok(BuildOptions {
            infer_bonds: self.infer_bonds.unwrap_or(defaults.infer_bonds),
            reconstruct_missing_residues: self
                .reconstruct_missing_residues
                .unwrap_or(defaults.reconstruct_missing_residues),
            backbone_link_cutoff,
            long_bond_threshold,
            topology_path: self.topology_path,
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a positive finite distance, got {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_without_overrides_matches_defaults() {
        let options = BuildOptionsBuilder::new().build().unwrap();
        assert_eq!(options, BuildOptions::default());
        assert!(options.infer_bonds);
        assert_eq!(options.backbone_link_cutoff, 5.0);
        assert_eq!(options.long_bond_threshold, 20.0);
    }

    #[test]
    fn builder_applies_overrides() {
        let options = BuildOptions::builder()
            .infer_bonds(false)
            .reconstruct_missing_residues(false)
            .long_bond_threshold(12.5)
            .topology_path(PathBuf::from("custom.toml"))
            .build()
            .unwrap();
        assert!(!options.infer_bonds);
        assert!(!options.reconstruct_missing_residues);
        assert_eq!(options.long_bond_threshold, 12.5);
        assert_eq!(options.topology_path, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn builder_rejects_non_positive_and_non_finite_thresholds() {
        let err = BuildOptions::builder().backbone_link_cutoff(0.0).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter { name: "backbone_link_cutoff", .. }
        ));
        assert!(BuildOptions::builder().long_bond_threshold(f64::NAN).build().is_err());
        assert!(BuildOptions::builder().long_bond_threshold(-1.0).build().is_err());
    }
}
