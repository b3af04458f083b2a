use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Element symbols indexed by atomic number (index 0 is the unknown element).
const SYMBOLS: [&str; 104] = [
    "X", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr",
];

/// Van der Waals radii in Angstroms, keyed by upper-case element symbol.
static VDW_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 1.1, "HE" => 1.4,
    "LI" => 1.81, "BE" => 1.53, "B" => 1.92, "C" => 1.7, "N" => 1.55, "O" => 1.52, "F" => 1.47,
    "NE" => 1.54, "NA" => 2.27, "MG" => 1.73, "AL" => 1.84, "SI" => 2.1, "P" => 1.8, "S" => 1.8,
    "CL" => 1.75, "AR" => 1.88, "K" => 2.75, "CA" => 2.31, "MN" => 2.0, "FE" => 2.0, "CO" => 2.0,
    "NI" => 1.63, "CU" => 1.4, "ZN" => 1.39, "GA" => 1.87, "GE" => 2.11, "AS" => 1.85,
    "SE" => 1.9, "BR" => 1.85, "KR" => 2.02, "RB" => 3.03, "SR" => 2.49, "PD" => 1.63,
    "AG" => 1.72, "CD" => 1.58, "IN" => 1.93, "SN" => 2.17, "SB" => 2.06, "TE" => 2.06,
    "I" => 1.98, "XE" => 2.16, "CS" => 3.43, "BA" => 2.68, "PT" => 1.75, "AU" => 1.66,
    "HG" => 1.55, "TL" => 1.96, "PB" => 2.02, "BI" => 2.07, "AT" => 2.02, "U" => 1.86,
};

/// Radius used for elements without a tabulated van der Waals radius.
pub const DEFAULT_VDW_RADIUS: f64 = 2.0;

/// Largest radius in the van der Waals table.
pub const MAX_VDW_RADIUS: f64 = 3.43;

/// A chemical element identified by its atomic number.
///
/// Atomic number zero denotes an unknown element. The element drives every
/// chemistry decision in the library (feature perception, valence, radii), so
/// it is stored explicitly on each atom rather than re-derived from names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Element(pub u8);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown element symbol: '{0}'")]
pub struct ParseElementError(pub String);

impl Element {
    pub const UNKNOWN: Element = Element(0);
    pub const H: Element = Element(1);
    pub const LI: Element = Element(3);
    pub const C: Element = Element(6);
    pub const N: Element = Element(7);
    pub const O: Element = Element(8);
    pub const F: Element = Element(9);
    pub const NA: Element = Element(11);
    pub const MG: Element = Element(12);
    pub const P: Element = Element(15);
    pub const S: Element = Element(16);
    pub const CL: Element = Element(17);
    pub const K: Element = Element(19);
    pub const CA: Element = Element(20);
    pub const FE: Element = Element(26);
    pub const CU: Element = Element(29);
    pub const ZN: Element = Element(30);
    pub const SE: Element = Element(34);
    pub const BR: Element = Element(35);
    pub const I: Element = Element(53);
    pub const AT: Element = Element(85);

    /// Returns the atomic number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// Returns the element symbol in conventional capitalization (e.g. `"Cl"`).
    pub fn symbol(self) -> &'static str {
        SYMBOLS.get(self.0 as usize).copied().unwrap_or("X")
    }

    /// Looks up an element by symbol, ignoring case.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The element symbol, e.g. `"ZN"`, `"Zn"` or `"zn"`.
    ///
    /// # Return
    ///
    /// Returns `Some(Element)` if the symbol is known, otherwise `None`.
    pub fn from_symbol(symbol: &str) -> Option<Element> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return None;
        }
        SYMBOLS
            .iter()
            .skip(1)
            .position(|s| s.eq_ignore_ascii_case(symbol))
            .map(|index| Element(index as u8 + 1))
    }

    /// Guesses the element from a PDB-style atom name.
    ///
    /// Only the leading alphabetic character is used, which is correct for the
    /// organic subset found in biomolecules. Ions and metals should carry their
    /// element explicitly.
    pub fn guess_from_atom_name(name: &str) -> Element {
        name.trim()
            .chars()
            .find(|c| c.is_ascii_alphabetic())
            .and_then(|c| Element::from_symbol(&c.to_string()))
            .unwrap_or(Element::UNKNOWN)
    }

    /// Returns the van der Waals radius in Angstroms.
    pub fn vdw_radius(self) -> f64 {
        VDW_RADII
            .get(self.symbol().to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(DEFAULT_VDW_RADIUS)
    }

    pub fn is_hydrogen(self) -> bool {
        self == Element::H
    }

    /// Halogens that can act as halogen-bond donors (Cl, Br, I, At).
    pub fn is_halogen_donor_element(self) -> bool {
        matches!(self, Element::CL | Element::BR | Element::I | Element::AT)
    }

    pub fn is_halogen(self) -> bool {
        self == Element::F || self.is_halogen_donor_element()
    }

    /// Transition metals, lanthanides and actinides; these coordinate through
    /// dative bonds.
    pub fn is_transition_metal(self) -> bool {
        matches!(self.0, 21..=30 | 39..=48 | 57..=80 | 89..=103)
    }

    /// Alkali, alkaline earth and post-transition metals that bind ionically.
    pub fn is_ionic_type_metal(self) -> bool {
        matches!(
            self.0,
            3 | 4 | 11 | 12 | 13 | 19 | 20 | 31 | 37 | 38 | 49 | 50 | 55 | 56 | 81 | 82 | 83
        )
    }

    pub fn is_metal(self) -> bool {
        self.is_transition_metal() || self.is_ionic_type_metal()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::from_symbol(s).ok_or_else(|| ParseElementError(s.to_string()))
    }
}
