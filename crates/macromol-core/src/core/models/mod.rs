//! # Core Models Module
//!
//! This module contains the data structures used to represent a parsed macromolecular
//! structure in memory.
//!
//! ## Overview
//!
//! A structure file holds one or more [`model::Model`]s. Each model owns its molecules,
//! residues, atoms and bonds in arenas keyed by the handle types in [`ids`]. Entities
//! never hold references to each other; instead they carry ids, and every traversal
//! (atom to residue, residue to polymer, polymer to model) goes through the model.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atoms with coordinates, displacement parameters and element data
//! - [`residue`] - Polymer residues and their atom lookup by name
//! - [`molecule`] - Polymers, branched polymers, ligands and waters
//! - [`model`] - The arena that owns everything and answers structural queries
//! - [`topology`] - Bonds and bond orders
//! - [`assembly`] - Biological assembly definitions
//! - [`ids`] - Handle types for atoms, residues and molecules
//!
//! ## Usage
//!
//! ```ignore
//! use macromol::core::models::{atom::Atom, model::Model, molecule::*, residue::Residue};
//!
//! let mut model = Model::new(1);
//! let chain = model.add_molecule(Molecule::new(MoleculeType::Polymer, entity));
//! let residue = model.add_residue(chain, Residue::new("A", 1, "", "ALA", chain))?;
//! model.add_atom_to_residue(residue, Atom::new(1, "CA", "C", Point3::origin()))?;
//! ```

pub mod assembly;
pub mod atom;
pub mod ids;
pub mod model;
pub mod molecule;
pub mod residue;
pub mod topology;
