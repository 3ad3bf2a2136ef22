//! # Core Module
//!
//! The format-level and data-level foundation of the library.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Models, molecules, residues, atoms and bonds
//! - **File I/O** ([`io`]) - The intermediate dictionary plus PDB and mmCIF codecs
//! - **Structural Knowledge** ([`topology`]) - Heavy-atom names and bonds of standard residues
//! - **Utilities** ([`utils`]) - Element tables, residue identifiers, geometry and formatting
//!
//! Nothing here knows how a dictionary becomes a model; that lives in
//! [`engine`](crate::engine).

pub mod io;
pub mod models;
pub mod topology;
pub mod utils;
