use crate::core::models::element::Element;
use crate::core::models::topology::BondOrder;
use crate::core::structure::Structure;

/// Idealized bonding geometry around an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    /// No bonded neighbors; no directional preference.
    Spherical,
    Linear,
    Trigonal,
    Tetrahedral,
}

impl Geometry {
    /// Ideal angle in degrees between two substituents, or `None` for spherical atoms.
    pub fn ideal_angle(self) -> Option<f64> {
        match self {
            Geometry::Spherical => None,
            Geometry::Linear => Some(180.0),
            Geometry::Trigonal => Some(120.0),
            Geometry::Tetrahedral => Some(109.4712),
        }
    }
}

fn default_valence(element: Element, formal_charge: i8) -> Option<i32> {
    let charge = formal_charge as i32;
    match element {
        Element::C => Some(4 - charge.abs()),
        Element::N | Element::P => Some(3 + charge),
        Element::O | Element::S | Element::SE => Some(2 + charge),
        e if e.is_halogen() => Some(1 + charge),
        _ => None,
    }
}

fn bond_order_between(structure: &dyn Structure, atom: usize, neighbor: usize) -> BondOrder {
    structure.bond_order(atom, neighbor).unwrap_or_default()
}

/// Hydrogens bonded explicitly to `atom`.
pub fn explicit_hydrogen_count(structure: &dyn Structure, atom: usize) -> usize {
    structure.bonded_element_count(atom, Element::H)
}

/// Hydrogens implied by the valence model.
///
/// The free valence left after summing the orders of every bond of `atom`
/// (aromatic bonds count 1.5, bonds to explicit hydrogens included) is filled
/// with hydrogens. Only the atom's own bonds are consulted.
pub fn implicit_hydrogen_count(structure: &dyn Structure, atom: usize) -> usize {
    let Some(valence) = default_valence(structure.element(atom), structure.formal_charge(atom))
    else {
        return 0;
    };
    let bonded: f64 = structure
        .bonded_neighbors(atom)
        .iter()
        .map(|&n| bond_order_between(structure, atom, n).valence_contribution())
        .sum();
    let free = valence as f64 - bonded;
    if free <= 0.0 { 0 } else { free.floor() as usize }
}

pub fn total_hydrogen_count(structure: &dyn Structure, atom: usize) -> usize {
    explicit_hydrogen_count(structure, atom) + implicit_hydrogen_count(structure, atom)
}

/// Whether any bond of `atom` is double, triple or aromatic.
pub fn has_multiple_bond(structure: &dyn Structure, atom: usize) -> bool {
    structure
        .bonded_neighbors(atom)
        .iter()
        .any(|&n| bond_order_between(structure, atom, n).is_multiple())
}

/// Assigns the idealized geometry of an atom from its bonds.
///
/// Triple bonds or two double bonds give a linear center, any other multiple
/// bond a trigonal one. Nitrogens next to a multiple bond (amides, anilines,
/// guanidines) are treated as trigonal through conjugation.
pub fn geometry(structure: &dyn Structure, atom: usize) -> Geometry {
    let neighbors = structure.bonded_neighbors(atom);
    if neighbors.len() + implicit_hydrogen_count(structure, atom) == 0 {
        return Geometry::Spherical;
    }

    let mut doubles = 0;
    let mut multiple = false;
    for &n in neighbors {
        match bond_order_between(structure, atom, n) {
            BondOrder::Triple => return Geometry::Linear,
            BondOrder::Double => {
                doubles += 1;
                multiple = true;
            }
            BondOrder::Aromatic => multiple = true,
            BondOrder::Single => {}
        }
    }
    if doubles >= 2 {
        return Geometry::Linear;
    }
    if multiple {
        return Geometry::Trigonal;
    }
    if structure.element(atom) == Element::N
        && structure.formal_charge(atom) <= 0
        && neighbors
            .iter()
            .any(|&n| !structure.element(n).is_hydrogen() && has_multiple_bond(structure, n))
    {
        return Geometry::Trigonal;
    }
    Geometry::Tetrahedral
}
