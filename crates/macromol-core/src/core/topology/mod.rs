//! # Topology Module
//!
//! Residue connectivity used when inferring covalent bonds and when rebuilding residues that
//! were declared but never observed.
//!
//! ## Key Components
//!
//! - [`registry`] - Residue name to atom/bond table, loaded from TOML
//!
//! ## Usage
//!
//! A table covering the standard amino acids, selenomethionine, water and the standard
//! nucleotides ships with the crate. A file with the same layout can replace it.
//!
//! ```ignore
//! use macromol::core::topology::registry::TopologyRegistry;
//!
//! let registry = TopologyRegistry::standard()?;
//! let ala = registry.get("ALA").unwrap();
//! assert_eq!(ala.link_out(), "C");
//! ```

pub mod registry;
