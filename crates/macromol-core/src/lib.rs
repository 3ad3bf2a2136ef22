//! # macromol
//!
//! A library for loading, querying and writing macromolecular structures stored as PDB or
//! mmCIF files.
//!
//! ## Architectural Philosophy
//!
//! The library is split into three layers, each depending only on the ones below it.
//!
//! - **[`core`]: The Foundation.** Holds the data models (`Model`, `Molecule`, `Residue`,
//!   `Atom`), the format-neutral `IntermediateDict`, the PDB and mmCIF readers and writers, and
//!   the residue topology table.
//!
//! - **[`engine`]: The Logic Core.** Turns a dictionary into typed models (altloc resolution,
//!   missing-residue reconstruction, bond inference, secondary structure), expands biological
//!   assembly operator expressions, and serializes models back into coordinate categories.
//!
//! - **[`workflows`]: The Public API.** The [`File`](workflows::file::File) façade ties the other
//!   two layers together: open a file, inspect its metadata and models, generate an assembly,
//!   and save it in either format.

pub mod core;
pub mod engine;
pub mod workflows;
