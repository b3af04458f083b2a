#![allow(dead_code)]

use nalgebra::Point3;
use ncikit::core::models::atom::Atom;
use ncikit::core::models::chain::ChainType;
use ncikit::core::models::element::Element;
use ncikit::core::models::ids::{AtomId, ResidueId};
use ncikit::core::models::system::MolecularSystem;
use ncikit::core::models::topology::BondOrder;
use ncikit::core::structure::Structure;
use ncikit::engine::interactions::contacts::{ContactType, FrozenContacts};

/// Builds small systems residue by residue.
pub struct Sketch {
    pub system: MolecularSystem,
    residue: Option<ResidueId>,
}

impl Sketch {
    pub fn new() -> Self {
        Self {
            system: MolecularSystem::new(),
            residue: None,
        }
    }

    pub fn residue(&mut self, chain: char, number: isize, name: &str) -> &mut Self {
        let chain_type = if name == "HOH" {
            ChainType::Water
        } else {
            ChainType::Ligand
        };
        let chain_id = self.system.add_chain(chain, chain_type);
        self.residue = self.system.add_residue(chain_id, number, name);
        self
    }

    pub fn atom(&mut self, name: &str, element: Element, [x, y, z]: [f64; 3]) -> AtomId {
        let residue = self.residue.expect("start a residue first");
        let atom = Atom::new(name, residue, Point3::new(x, y, z)).with_element(element);
        self.system
            .add_atom_to_residue(residue, atom)
            .expect("residue exists")
    }

    pub fn bond(&mut self, a: AtomId, b: AtomId, order: BondOrder) -> &mut Self {
        self.system.add_bond(a, b, order).expect("valid bond");
        self
    }

    /// Six aromatic carbons around `center` in a plane parallel to xy,
    /// starting at angle `phase` (radians).
    pub fn hexagon(&mut self, prefix: &str, center: [f64; 3], phase: f64) -> Vec<AtomId> {
        let ids: Vec<AtomId> = (0..6)
            .map(|k| {
                let t = phase + k as f64 * std::f64::consts::FRAC_PI_3;
                self.atom(
                    &format!("{prefix}{k}"),
                    Element::C,
                    [
                        center[0] + 1.39 * t.cos(),
                        center[1] + 1.39 * t.sin(),
                        center[2],
                    ],
                )
            })
            .collect();
        for k in 0..6 {
            self.bond(ids[k], ids[(k + 1) % 6], BondOrder::Aromatic);
        }
        ids
    }
}

/// Contacts as (type, first label, second label), labels sorted within each
/// pair and the rows sorted.
pub fn contact_rows(
    structure: &dyn Structure,
    frozen: &FrozenContacts,
    contacts: impl Iterator<Item = usize>,
) -> Vec<(ContactType, String, String)> {
    let mut rows: Vec<_> = contacts
        .map(|c| {
            let a = structure.atom_label(frozen.features.anchor_atom(frozen.store.index1(c)));
            let b = structure.atom_label(frozen.features.anchor_atom(frozen.store.index2(c)));
            let (a, b) = if a <= b { (a, b) } else { (b, a) };
            (frozen.store.contact_type(c), a, b)
        })
        .collect();
    rows.sort();
    rows
}

pub fn active_of_type(frozen: &FrozenContacts, contact_type: ContactType) -> Vec<usize> {
    frozen
        .active_contacts()
        .filter(|&c| frozen.store.contact_type(c) == contact_type)
        .collect()
}
