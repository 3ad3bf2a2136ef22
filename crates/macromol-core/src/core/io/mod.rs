//! Reading and writing structure files.
//!
//! Both formats speak through the [`dict::IntermediateDict`]: PDB records are mapped onto
//! mmCIF categories on the way in and back out again on the way out, so everything above this
//! layer deals with one vocabulary.

pub mod connections;
pub mod dict;
pub mod mmcif;
pub mod pdb;
pub mod traits;
