pub mod batch;
pub mod contacts;
pub mod params;

use crate::error::{CliError, Result};
use ncikit::core::io::bgf::BgfFile;
use ncikit::core::io::report::{self, ContactRecord};
use ncikit::core::io::traits::MolecularFile;
use ncikit::core::models::system::MolecularSystem;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

pub(crate) fn load_structure(path: &Path) -> Result<MolecularSystem> {
    info!("Loading input structure from {:?}", path);
    let (system, metadata) = BgfFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    debug!(
        atoms = system.atom_count(),
        force_field = metadata.force_field.as_deref().unwrap_or("unspecified"),
        "Structure loaded."
    );
    Ok(system)
}

pub(crate) fn write_report(path: &Path, records: &[ContactRecord]) -> Result<()> {
    let file = File::create(path)?;
    report::write_csv(BufWriter::new(file), records).map_err(|source| CliError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    info!(rows = records.len(), "Report written to {:?}", path);
    Ok(())
}
