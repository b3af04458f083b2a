use phf::{Map, Set, phf_map, phf_set};

static AMINO_ACIDS: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "HID", "HIE", "HIP", "HSD", "HSE", "HSP", "CYX", "ASH", "GLH", "LYN",
    "MSE", "SEC", "PYL",
};

static NUCLEOTIDES: Set<&'static str> = phf_set! {
    "A", "C", "G", "U", "T", "I", "DA", "DC", "DG", "DT", "DU", "DI",
    "ADE", "CYT", "GUA", "URA", "THY",
};

static WATER_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "SOL", "TIP", "TIP3", "TIP4", "SPC", "DOD", "D2O",
};

static PROTEIN_BACKBONE_ATOMS: Set<&'static str> = phf_set! {
    "N", "H", "HN", "CA", "HA", "C", "O", "OXT", "H1", "H2", "H3", "NT",
    "OT1", "OT2", "HA1", "HA2", "HA3", "1HA", "2HA",
};

static NUCLEIC_BACKBONE_ATOMS: Set<&'static str> = phf_set! {
    "P", "OP1", "OP2", "OP3", "O1P", "O2P", "O3P", "O5'", "C5'", "C4'", "O4'",
    "C3'", "O3'", "C2'", "O2'", "C1'",
};

/// Side-chain atoms carrying the positive charge of basic residues.
static POSITIVE_SIDECHAIN_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "ARG" => &["NE", "NH1", "NH2"],
    "LYS" => &["NZ"],
    "HIS" => &["ND1", "NE2"],
    "HIP" => &["ND1", "NE2"],
    "HSP" => &["ND1", "NE2"],
};

/// Side-chain atoms carrying the negative charge of acidic residues.
static NEGATIVE_SIDECHAIN_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "ASP" => &["OD1", "OD2"],
    "GLU" => &["OE1", "OE2"],
};

/// Phosphate oxygens of nucleic acid backbones.
static PHOSPHATE_OXYGENS: Set<&'static str> = phf_set! {
    "OP1", "OP2", "OP3", "O1P", "O2P", "O3P",
};

/// Side-chain atoms that coordinate metals through a lone pair.
static DATIVE_SIDECHAIN_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "HIS" => &["ND1", "NE2"],
    "HID" => &["ND1", "NE2"],
    "HIE" => &["ND1", "NE2"],
    "HSD" => &["ND1", "NE2"],
    "HSE" => &["ND1", "NE2"],
    "CYS" => &["SG"],
    "MET" => &["SD"],
    "ASN" => &["OD1"],
    "GLN" => &["OE1"],
    "SER" => &["OG"],
    "THR" => &["OG1"],
    "TYR" => &["OH"],
};

static HISTIDINE_NAMES: Set<&'static str> = phf_set! {
    "HIS", "HID", "HIE", "HIP", "HSD", "HSE", "HSP",
};

fn normalized(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

pub fn is_amino_acid(residue_name: &str) -> bool {
    AMINO_ACIDS.contains(normalized(residue_name).as_str())
}

pub fn is_nucleotide(residue_name: &str) -> bool {
    NUCLEOTIDES.contains(normalized(residue_name).as_str())
}

pub fn is_water(residue_name: &str) -> bool {
    WATER_NAMES.contains(normalized(residue_name).as_str())
}

pub fn is_polymer(residue_name: &str) -> bool {
    is_amino_acid(residue_name) || is_nucleotide(residue_name)
}

/// Whether the named atom belongs to the backbone of the named polymer residue.
///
/// Atoms of non-polymer residues are never backbone atoms.
pub fn is_backbone_atom(residue_name: &str, atom_name: &str) -> bool {
    let atom_name = atom_name.trim();
    if is_amino_acid(residue_name) {
        PROTEIN_BACKBONE_ATOMS.contains(atom_name)
    } else if is_nucleotide(residue_name) {
        NUCLEIC_BACKBONE_ATOMS.contains(atom_name)
    } else {
        false
    }
}

pub fn is_histidine(residue_name: &str) -> bool {
    HISTIDINE_NAMES.contains(normalized(residue_name).as_str())
}

/// Whether the atom is one of the two imidazole nitrogens of a histidine.
pub fn is_histidine_ring_nitrogen(residue_name: &str, atom_name: &str) -> bool {
    is_histidine(residue_name) && matches!(atom_name.trim(), "ND1" | "NE2")
}

/// Charged side-chain atoms of a basic amino acid, if the residue is one.
pub fn positive_sidechain_atoms(residue_name: &str) -> Option<&'static [&'static str]> {
    POSITIVE_SIDECHAIN_ATOMS
        .get(normalized(residue_name).as_str())
        .copied()
}

/// Charged side-chain atoms of an acidic amino acid, if the residue is one.
pub fn negative_sidechain_atoms(residue_name: &str) -> Option<&'static [&'static str]> {
    NEGATIVE_SIDECHAIN_ATOMS
        .get(normalized(residue_name).as_str())
        .copied()
}

/// Side-chain atoms that donate a lone pair to a coordinated metal.
pub fn dative_sidechain_atoms(residue_name: &str) -> &'static [&'static str] {
    DATIVE_SIDECHAIN_ATOMS
        .get(normalized(residue_name).as_str())
        .copied()
        .unwrap_or(&[])
}

pub fn is_phosphate_oxygen(atom_name: &str) -> bool {
    PHOSPHATE_OXYGENS.contains(atom_name.trim())
}
