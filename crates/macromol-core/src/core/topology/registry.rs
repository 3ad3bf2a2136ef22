use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const STANDARD_TOPOLOGY: &str = include_str!("../../../data/topology.toml");
const STANDARD_ORIGIN: &str = "<built-in topology>";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ResidueTopology {
    #[serde(default)]
    pub atoms: Vec<String>,
    #[serde(default)]
    pub bonds: Vec<[String; 2]>,
    pub link_in: Option<String>,
    pub link_out: Option<String>,
}

impl ResidueTopology {
    /// Atom joined to the previous residue's [`link_out`](Self::link_out) atom.
    pub fn link_in(&self) -> &str {
        self.link_in.as_deref().unwrap_or("N")
    }

    pub fn link_out(&self) -> &str {
        self.link_out.as_deref().unwrap_or("C")
    }

    /// Whether the table bonds these two atom names, in either order.
    pub fn bonds_between(&self, a: &str, b: &str) -> bool {
        self.bonds
            .iter()
            .any(|[x, y]| (x == a && y == b) || (x == b && y == a))
    }
}

/// Guesses an element symbol from a standard atom name.
pub fn element_from_atom_name(name: &str) -> String {
    if name.starts_with("SE") {
        return "SE".to_string();
    }
    name.chars()
        .find(char::is_ascii_alphabetic)
        .map(|c| c.to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct TopologyRegistry {
    registry: HashMap<String, ResidueTopology>,
}

impl TopologyRegistry {
    pub fn load(path: &Path) -> Result<Self, TopologyLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| TopologyLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.to_string_lossy())
    }

    /// The table embedded in the crate.
    pub fn standard() -> Result<Self, TopologyLoadError> {
        Self::from_toml_str(STANDARD_TOPOLOGY, STANDARD_ORIGIN)
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, TopologyLoadError> {
        let registry: HashMap<String, ResidueTopology> =
            toml::from_str(content).map_err(|e| TopologyLoadError::Toml {
                path: origin.to_string(),
                source: e,
            })?;
        Ok(Self { registry })
    }

    pub fn get(&self, residue_name: &str) -> Option<&ResidueTopology> {
        self.registry.get(residue_name)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum TopologyLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}
