use crate::core::structure::Structure;
use crate::engine::interactions::contacts::{ContactType, FrozenContacts};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One row of a contact report: both features with their anchor atom, their
/// center positions and the center-to-center distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactRecord {
    pub contact_id: usize,
    pub contact_type: String,
    pub feature1: usize,
    pub feature1_type: String,
    pub atom1: usize,
    pub label1: String,
    pub x1: f64,
    pub y1: f64,
    pub z1: f64,
    pub feature2: usize,
    pub feature2_type: String,
    pub atom2: usize,
    pub label2: String,
    pub x2: f64,
    pub y2: f64,
    pub z2: f64,
    pub distance: f64,
}

impl ContactRecord {
    pub fn from_contact(structure: &dyn Structure, frozen: &FrozenContacts, contact: usize) -> Self {
        let features = &frozen.features;
        let (feature1, feature2) = (frozen.store.index1(contact), frozen.store.index2(contact));
        let (atom1, atom2) = (features.anchor_atom(feature1), features.anchor_atom(feature2));
        let (c1, c2) = (features.center(feature1), features.center(feature2));
        Self {
            contact_id: contact,
            contact_type: frozen.store.contact_type(contact).key().to_string(),
            feature1,
            feature1_type: features.feature_type(feature1).to_string(),
            atom1,
            label1: structure.atom_label(atom1),
            x1: c1.x,
            y1: c1.y,
            z1: c1.z,
            feature2,
            feature2_type: features.feature_type(feature2).to_string(),
            atom2,
            label2: structure.atom_label(atom2),
            x2: c2.x,
            y2: c2.y,
            z2: c2.z,
            distance: (c1 - c2).norm(),
        }
    }
}

/// Column names of [`ContactRecord`], in field order.
pub const COLUMNS: [&str; 17] = [
    "contact_id",
    "contact_type",
    "feature1",
    "feature1_type",
    "atom1",
    "label1",
    "x1",
    "y1",
    "z1",
    "feature2",
    "feature2_type",
    "atom2",
    "label2",
    "x2",
    "y2",
    "z2",
    "distance",
];

/// Writes `records` as CSV. The header row is written even when there are no records.
pub fn write_csv<W: Write>(writer: W, records: &[ContactRecord]) -> Result<(), ReportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Number of contacts per type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSummary {
    pub counts: BTreeMap<ContactType, usize>,
}

impl ContactSummary {
    pub fn add(&mut self, contact_type: ContactType) {
        *self.counts.entry(contact_type).or_default() += 1;
    }

    pub fn count(&self, contact_type: ContactType) -> usize {
        self.counts.get(&contact_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl FromIterator<ContactType> for ContactSummary {
    fn from_iter<I: IntoIterator<Item = ContactType>>(iter: I) -> Self {
        let mut summary = Self::default();
        for contact_type in iter {
            summary.add(contact_type);
        }
        summary
    }
}

impl fmt::Display for ContactSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (contact_type, count) in &self.counts {
            writeln!(f, "{:<24} {count:>6}", contact_type.name())?;
        }
        write!(f, "{:<24} {:>6}", "total", self.total())
    }
}
