//! Static chemistry tables and small numeric helpers shared by every layer.
//!
//! - [`elements`] - Atomic masses, covalent radii and metal classification
//! - [`identifiers`] - Residue codes, water names and residue-key ordering
//! - [`geometry`] - Distances, rotations, RMSD and rounding
//! - [`formatting`] - Fixed-width number formatting for PDB columns

pub mod elements;
pub mod formatting;
pub mod geometry;
pub mod identifiers;
