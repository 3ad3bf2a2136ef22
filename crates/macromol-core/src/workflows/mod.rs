//! # Workflows Module
//!
//! High-level entry points for users of the library.
//!
//! - **Structure Files** ([`file`]) - Open, inspect, transform and save a PDB or mmCIF file.

pub mod file;
