//! # Engine Module
//!
//! The stateful half of the library: it turns a parsed dictionary into models and back.
//!
//! ## Overview
//!
//! The builder materialises the typed molecule hierarchy from an
//! [`IntermediateDict`](crate::core::io::dict::IntermediateDict), resolving alternate
//! locations, rebuilding unobserved residues, attaching secondary structure and bind sites and
//! inferring covalent bonds. The assembly engine expands operator expressions into the chain
//! copies of a biological unit, and the serializer writes models back into `atom_site` rows.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Builder options and their validation
//! - **Construction** ([`builder`]) - The phased dictionary to model build
//! - **Connectivity** ([`bonds`]) - Table-driven, backbone and listed bonds
//! - **Assemblies** ([`assembly`]) - Operator expressions, matrices and assembly records
//! - **Output** ([`serializer`]) - Models back into coordinate categories
//! - **Error Handling** ([`error`]) - Assembly errors and non-fatal structure warnings

pub mod assembly;
pub(crate) mod bonds;
pub mod builder;
pub mod config;
pub mod error;
pub mod serializer;
