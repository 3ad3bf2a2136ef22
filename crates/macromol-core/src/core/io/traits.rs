use super::dict::IntermediateDict;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing a structure file format.
///
/// Every format translates to and from the same [`IntermediateDict`], so the builder and the
/// serializer never need to know which format they are dealing with.
pub trait StructureFormat {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a dictionary from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_dict(reader: &mut impl BufRead) -> Result<IntermediateDict, Self::Error>;

    /// Writes a dictionary to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_dict(dict: &IntermediateDict, writer: &mut impl Write) -> Result<(), Self::Error>;

    fn read_dict_from_str(text: &str) -> Result<IntermediateDict, Self::Error> {
        let mut reader = text.as_bytes();
        Self::read_dict(&mut reader)
    }

    fn write_dict_to_string(dict: &IntermediateDict) -> Result<String, Self::Error> {
        let mut buffer = Vec::new();
        Self::write_dict(dict, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Reads a dictionary from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_dict_from_path<P: AsRef<Path>>(path: P) -> Result<IntermediateDict, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_dict(&mut reader)
    }

    /// Writes a dictionary to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_dict_to_path<P: AsRef<Path>>(dict: &IntermediateDict, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_dict(dict, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
