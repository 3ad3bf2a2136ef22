//! The PDB format: fixed-column records translated to and from the mmCIF vocabulary.

pub mod reader;
pub mod record;
pub mod writer;

use super::dict::IntermediateDict;
use super::traits::StructureFormat;
use record::RecordStream;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Record on line {line} is {length} characters long; PDB records hold at most 80")]
    OverlongRecord { line: usize, length: usize },
}

pub struct PdbFile;

impl StructureFormat for PdbFile {
    type Error = PdbError;

    fn read_dict(reader: &mut impl BufRead) -> Result<IntermediateDict, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = String::from_utf8_lossy(&bytes);
        let stream = RecordStream::parse(&text);
        Ok(reader::records_to_dict(&stream))
    }

    fn write_dict(dict: &IntermediateDict, writer: &mut impl Write) -> Result<(), Self::Error> {
        for line in writer::dict_to_lines(dict) {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}
