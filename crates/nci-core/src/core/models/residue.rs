use super::ids::{AtomId, ChainId};
use crate::core::chemistry::residues;
use std::collections::HashMap;
use std::fmt;

/// Broad classification of a residue derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    AminoAcid,
    Nucleotide,
    Water,
    Other,
}

impl ResidueKind {
    /// Classifies a residue by its (case-insensitive) name.
    pub fn classify(name: &str) -> Self {
        if residues::is_amino_acid(name) {
            ResidueKind::AminoAcid
        } else if residues::is_nucleotide(name) {
            ResidueKind::Nucleotide
        } else if residues::is_water(name) {
            ResidueKind::Water
        } else {
            ResidueKind::Other
        }
    }

    pub fn is_polymer(self) -> bool {
        matches!(self, ResidueKind::AminoAcid | ResidueKind::Nucleotide)
    }
}

impl fmt::Display for ResidueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResidueKind::AminoAcid => "AminoAcid",
            ResidueKind::Nucleotide => "Nucleotide",
            ResidueKind::Water => "Water",
            ResidueKind::Other => "Other",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub residue_number: isize,              // Residue sequence number from source file
    pub name: String,                       // Name of the residue (e.g., "SER", "HOH", "HEM")
    pub kind: ResidueKind,                  // Classification derived from the name
    pub chain_id: ChainId,                  // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,          // Atoms belonging to this residue, in insertion order
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(residue_number: isize, name: &str, chain_id: ChainId) -> Self {
        Self {
            residue_number,
            name: name.to_string(),
            kind: ResidueKind::classify(name),
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        // Alternate locations share a name; the first one stays addressable by name.
        self.atom_name_map
            .entry(atom_name.to_string())
            .or_insert(atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    fn dummy_chain_id(n: u64) -> ChainId {
        ChainId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let chain_id = dummy_chain_id(1);
        let residue = Residue::new(10, "GLY", chain_id);
        assert_eq!(residue.residue_number, 10);
        assert_eq!(residue.name, "GLY");
        assert_eq!(residue.kind, ResidueKind::AminoAcid);
        assert_eq!(residue.chain_id, chain_id);
        assert!(residue.atoms().is_empty());
        assert!(residue.get_atom_id_by_name("CA").is_none());
    }

    #[test]
    fn add_atom_keeps_first_id_for_duplicate_names() {
        let mut residue = Residue::new(5, "SER", dummy_chain_id(2));
        let first = dummy_atom_id(42);
        let second = dummy_atom_id(43);
        residue.add_atom("OG", first);
        residue.add_atom("OG", second);
        assert_eq!(residue.atoms(), &[first, second]);
        assert_eq!(residue.get_atom_id_by_name("OG"), Some(first));
    }

    #[test]
    fn classify_recognizes_residue_families() {
        assert_eq!(ResidueKind::classify("lys"), ResidueKind::AminoAcid);
        assert_eq!(ResidueKind::classify("DA"), ResidueKind::Nucleotide);
        assert_eq!(ResidueKind::classify("HOH"), ResidueKind::Water);
        assert_eq!(ResidueKind::classify("HEM"), ResidueKind::Other);
        assert!(ResidueKind::AminoAcid.is_polymer());
        assert!(!ResidueKind::Water.is_polymer());
    }
}
