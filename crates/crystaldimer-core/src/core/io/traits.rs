use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Common interface of the text formats this crate reads and writes.
///
/// Implementors are zero-sized markers; the parsed value is `Self::Content`.
pub trait PersistedFile {
    /// The in-memory value the file describes.
    type Content;

    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Parses the whole content from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a line cannot be parsed.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Content, Self::Error>;

    /// Serializes the content in canonical form.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(content: &Self::Content, writer: &mut impl Write) -> Result<(), Self::Error>;

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Content, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn write_to_path<P: AsRef<Path>>(content: &Self::Content, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(content, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Parses content held in memory.
    fn read_from_str(text: &str) -> Result<Self::Content, Self::Error> {
        Self::read_from(&mut text.as_bytes())
    }

    /// Serializes into an owned string.
    fn write_to_string(content: &Self::Content) -> Result<String, Self::Error> {
        let mut buffer = Vec::new();
        Self::write_to(content, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
