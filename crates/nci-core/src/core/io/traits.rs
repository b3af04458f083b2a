use crate::core::models::system::MolecularSystem;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::Path;
use tracing::debug;

/// A structure file format that can be read into a [`MolecularSystem`].
pub trait MolecularFile {
    /// Short format name used in log output.
    const FORMAT: &'static str;

    /// Header data the format carries besides atoms and bonds.
    type Metadata;

    type Error: Error + From<io::Error>;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error>;

    fn read_from_str(text: &str) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        Self::read_from(&mut Cursor::new(text))
    }

    /// Opens `path` and reads it with a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let path = path.as_ref();
        debug!(format = Self::FORMAT, path = %path.display(), "Reading structure file.");
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }
}
