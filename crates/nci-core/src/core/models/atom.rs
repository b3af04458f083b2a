use super::element::Element;
use super::ids::ResidueId;
use nalgebra::Point3;
use std::str::FromStr;

/// Represents the role or classification of an atom within a molecular structure.
///
/// Detectors use the role to label hydrogen bonds as backbone or water mediated,
/// and to skip water-water pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Backbone atom of a polymer residue (e.g. N, CA, C, O).
    Backbone,
    /// Sidechain atom of a polymer residue.
    Sidechain,
    /// Atom of a small molecule or other hetero group.
    Ligand,
    /// Solvent water atom.
    Water,
    /// Unknown or unclassified atom role.
    #[default]
    Other,
}

/// Represents an atom in a molecular structure.
///
/// Besides identity and coordinates, an atom carries the attributes the interaction
/// detectors rely on: element, formal charge, alternate location and model index.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number from the source file, if any.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "OG1", "ZN").
    pub name: String,
    /// The chemical element.
    pub element: Element,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The role or classification of the atom in the molecular structure.
    pub role: AtomRole,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Integer formal charge.
    pub formal_charge: i8,
    /// Alternate location indicator; `None` when the atom has a single location.
    pub altloc: Option<char>,
    /// Index of the model (ensemble member) this atom belongs to.
    pub model_index: usize,
}

impl Atom {
    /// Creates a new `Atom` with its element guessed from the atom name.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `residue_id` - The ID of the residue this atom belongs to.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            element: Element::guess_from_atom_name(name),
            residue_id,
            role: AtomRole::default(),
            position,
            formal_charge: 0,
            altloc: None,
            model_index: 0,
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_role(mut self, role: AtomRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_formal_charge(mut self, charge: i8) -> Self {
        self.formal_charge = charge;
        self
    }

    pub fn with_altloc(mut self, altloc: char) -> Self {
        self.altloc = Some(altloc);
        self
    }

    pub fn with_model_index(mut self, model_index: usize) -> Self {
        self.model_index = model_index;
        self
    }
}

impl FromStr for AtomRole {
    type Err = ();

    /// Parses a string into an `AtomRole`.
    ///
    /// Case-insensitive; accepts common spellings such as "side-chain" or "side_chain".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backbone" => Ok(AtomRole::Backbone),
            "sidechain" | "side-chain" | "side_chain" => Ok(AtomRole::Sidechain),
            "ligand" => Ok(AtomRole::Ligand),
            "water" => Ok(AtomRole::Water),
            "other" | "unknown" => Ok(AtomRole::Other),
            _ => Err(()),
        }
    }
}
