//! Reading molecular structures and writing contact reports.
//!
//! Structure readers implement the [`traits::MolecularFile`] interface and build a
//! `MolecularSystem`. The [`report`] module turns active contacts into flat
//! records and writes them as CSV.

pub mod bgf;
pub mod report;
pub mod traits;
