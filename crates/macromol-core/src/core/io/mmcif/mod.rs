//! The mmCIF format: STAR-style data blocks of categories, read and written losslessly.

pub mod lexer;
pub mod parser;
pub mod writer;

use super::dict::IntermediateDict;
use super::traits::StructureFormat;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CifError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Unterminated quoted value on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("Text field opened on line {line} is never closed")]
    UnterminatedTextField { line: usize },
}

pub struct CifFile;

impl StructureFormat for CifFile {
    type Error = CifError;

    fn read_dict(reader: &mut impl BufRead) -> Result<IntermediateDict, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = String::from_utf8_lossy(&bytes);
        parser::parse(&text)
    }

    fn write_dict(dict: &IntermediateDict, writer: &mut impl Write) -> Result<(), Self::Error> {
        writer.write_all(writer::dict_to_string(dict).as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn lexical_errors_surface_with_their_line() {
        let err = CifFile::read_dict_from_str("data_x\n_a.b 'open\n").unwrap_err();
        assert!(matches!(err, CifError::UnterminatedQuote { line: 2 }));
    }

    #[test]
    fn dictionary_survives_a_trip_through_a_file() {
        let text = "data_1ABC\n_struct.title 'Two words'\nloop_\n_atom_site.id\n_atom_site.label_atom_id\n1 N\n2 CA\n";
        let dict = CifFile::read_dict_from_str(text).unwrap();
        let file = NamedTempFile::new().unwrap();
        CifFile::write_dict_to_path(&dict, file.path()).unwrap();
        let reread = CifFile::read_dict_from_path(file.path()).unwrap();
        assert_eq!(reread, dict);
    }
}
