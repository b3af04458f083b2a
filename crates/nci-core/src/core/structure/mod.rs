//! # Structure View Module
//!
//! Dense, index-addressed read access to a molecular structure.
//!
//! ## Overview
//!
//! Interaction detection works on contiguous integer indices rather than slot-map
//! handles: features store atom indices, the contact store records feature
//! indices, and bitsets are sized by counts. The [`Structure`] trait is the single
//! seam through which every detector and refinement pass reads atoms, residues and
//! bonds, so the engine never depends on how a structure is stored.
//!
//! ## Key Components
//!
//! - [`Structure`] - Object-safe read interface (atoms, residues, bonds)
//! - [`indexed::IndexedStructure`] - Adapter that exposes a `MolecularSystem` through `Structure`
//! - [`selection::AtomSelection`] - Composable atom selections resolved to bitsets

pub mod indexed;
pub mod selection;

pub use indexed::IndexedStructure;

use crate::core::models::atom::AtomRole;
use crate::core::models::element::Element;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;

/// Read-only view of a molecular structure with dense atom and residue indices.
///
/// Atom indices run from `0` to `atom_count() - 1`, residue indices from `0` to
/// `residue_count() - 1`. Implementations must keep both stable for the lifetime
/// of the view.
pub trait Structure {
    fn atom_count(&self) -> usize;
    fn residue_count(&self) -> usize;

    fn element(&self, atom: usize) -> Element;
    fn position(&self, atom: usize) -> Point3<f64>;
    fn atom_name(&self, atom: usize) -> &str;
    fn formal_charge(&self, atom: usize) -> i8;
    fn altloc(&self, atom: usize) -> Option<char>;
    fn model_index(&self, atom: usize) -> usize;
    fn role(&self, atom: usize) -> AtomRole;
    fn residue_index(&self, atom: usize) -> usize;

    fn residue_name(&self, residue: usize) -> &str;
    fn residue_number(&self, residue: usize) -> isize;
    fn chain_id(&self, residue: usize) -> char;
    /// Atoms of a residue in ascending index order.
    fn residue_atoms(&self, residue: usize) -> &[usize];

    /// Atoms covalently bonded to `atom`, hydrogens included.
    fn bonded_neighbors(&self, atom: usize) -> &[usize];
    fn bond_order(&self, atom1: usize, atom2: usize) -> Option<BondOrder>;

    fn is_bonded(&self, atom1: usize, atom2: usize) -> bool {
        self.bonded_neighbors(atom1).contains(&atom2)
    }

    /// Number of bonded neighbors with the given element.
    fn bonded_element_count(&self, atom: usize, element: Element) -> usize {
        self.bonded_neighbors(atom)
            .iter()
            .filter(|&&n| self.element(n) == element)
            .count()
    }

    /// Number of bonded non-hydrogen neighbors.
    fn heavy_degree(&self, atom: usize) -> usize {
        self.bonded_neighbors(atom)
            .iter()
            .filter(|&&n| !self.element(n).is_hydrogen())
            .count()
    }

    fn is_water(&self, atom: usize) -> bool {
        self.role(atom) == AtomRole::Water
    }

    fn is_backbone(&self, atom: usize) -> bool {
        self.role(atom) == AtomRole::Backbone
    }

    /// Residue name of the residue containing `atom`.
    fn atom_residue_name(&self, atom: usize) -> &str {
        self.residue_name(self.residue_index(atom))
    }

    /// Human readable label such as `A:ASP 42:OD1`.
    fn atom_label(&self, atom: usize) -> String {
        let residue = self.residue_index(atom);
        let altloc = self
            .altloc(atom)
            .map(|c| format!("%{c}"))
            .unwrap_or_default();
        format!(
            "{}:{} {}:{}{}",
            self.chain_id(residue),
            self.residue_name(residue),
            self.residue_number(residue),
            self.atom_name(atom),
            altloc
        )
    }
}
