use super::Structure;
use crate::core::chemistry::residues;
use crate::core::models::atom::{Atom, AtomRole};
use crate::core::models::element::Element;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::residue::ResidueKind;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use slotmap::SecondaryMap;
use std::collections::HashMap;

/// Dense view of a [`MolecularSystem`] implementing [`Structure`].
///
/// Atoms are numbered chain by chain, residue by residue, in insertion order, so
/// each residue owns a contiguous, ascending block of atom indices. Bond
/// connectivity is flattened into a CSR neighbor list. Atoms whose role is
/// [`AtomRole::Other`] get a role inferred from their residue.
#[derive(Debug)]
pub struct IndexedStructure<'a> {
    system: &'a MolecularSystem,
    atoms: Vec<&'a Atom>,
    atom_ids: Vec<AtomId>,
    atom_index: SecondaryMap<AtomId, usize>,
    roles: Vec<AtomRole>,
    atom_residue: Vec<usize>,
    residue_ids: Vec<ResidueId>,
    residue_chains: Vec<char>,
    residue_atoms: Vec<Vec<usize>>,
    neighbor_offsets: Vec<usize>,
    neighbors: Vec<usize>,
    bond_orders: HashMap<(usize, usize), BondOrder>,
}

fn inferred_role(atom: &Atom, residue_name: &str, kind: ResidueKind) -> AtomRole {
    if atom.role != AtomRole::Other {
        return atom.role;
    }
    match kind {
        ResidueKind::Water => AtomRole::Water,
        ResidueKind::AminoAcid | ResidueKind::Nucleotide => {
            if residues::is_backbone_atom(residue_name, &atom.name) {
                AtomRole::Backbone
            } else {
                AtomRole::Sidechain
            }
        }
        ResidueKind::Other => AtomRole::Ligand,
    }
}

impl<'a> IndexedStructure<'a> {
    /// Builds the dense view.
    ///
    /// # Arguments
    ///
    /// * `system` - The molecular system to index; it stays borrowed for the view's lifetime.
    pub fn new(system: &'a MolecularSystem) -> Self {
        let mut atoms = Vec::with_capacity(system.atom_count());
        let mut atom_ids = Vec::with_capacity(system.atom_count());
        let mut atom_index = SecondaryMap::new();
        let mut roles = Vec::with_capacity(system.atom_count());
        let mut atom_residue = Vec::with_capacity(system.atom_count());
        let mut residue_ids = Vec::new();
        let mut residue_chains = Vec::new();
        let mut residue_atoms = Vec::new();

        for (_, chain) in system.chains_iter() {
            for &residue_id in chain.residues() {
                let Some(residue) = system.residue(residue_id) else {
                    continue;
                };
                let residue_index = residue_ids.len();
                let mut members = Vec::with_capacity(residue.atoms().len());
                for &atom_id in residue.atoms() {
                    let Some(atom) = system.atom(atom_id) else {
                        continue;
                    };
                    let index = atoms.len();
                    atom_index.insert(atom_id, index);
                    roles.push(inferred_role(atom, &residue.name, residue.kind));
                    atoms.push(atom);
                    atom_ids.push(atom_id);
                    atom_residue.push(residue_index);
                    members.push(index);
                }
                residue_ids.push(residue_id);
                residue_chains.push(chain.id);
                residue_atoms.push(members);
            }
        }

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); atoms.len()];
        let mut bond_orders = HashMap::with_capacity(system.bonds().len());
        for bond in system.bonds() {
            let (Some(&i), Some(&j)) = (
                atom_index.get(bond.atom1_id),
                atom_index.get(bond.atom2_id),
            ) else {
                continue;
            };
            adjacency[i].push(j);
            adjacency[j].push(i);
            bond_orders.insert((i.min(j), i.max(j)), bond.order);
        }

        let mut neighbor_offsets = Vec::with_capacity(atoms.len() + 1);
        let mut neighbors = Vec::with_capacity(system.bonds().len() * 2);
        neighbor_offsets.push(0);
        for mut list in adjacency {
            list.sort_unstable();
            neighbors.extend(list);
            neighbor_offsets.push(neighbors.len());
        }

        Self {
            system,
            atoms,
            atom_ids,
            atom_index,
            roles,
            atom_residue,
            residue_ids,
            residue_chains,
            residue_atoms,
            neighbor_offsets,
            neighbors,
            bond_orders,
        }
    }

    pub fn system(&self) -> &'a MolecularSystem {
        self.system
    }

    /// Stable system handle of the atom at `index`.
    pub fn atom_id(&self, index: usize) -> AtomId {
        self.atom_ids[index]
    }

    /// Dense index of a system atom, if it is part of the view.
    pub fn index_of(&self, atom_id: AtomId) -> Option<usize> {
        self.atom_index.get(atom_id).copied()
    }

    pub fn residue_id(&self, residue: usize) -> ResidueId {
        self.residue_ids[residue]
    }

    pub fn atom(&self, index: usize) -> &'a Atom {
        self.atoms[index]
    }
}

impl Structure for IndexedStructure<'_> {
    fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    fn residue_count(&self) -> usize {
        self.residue_ids.len()
    }

    fn element(&self, atom: usize) -> Element {
        self.atoms[atom].element
    }

    fn position(&self, atom: usize) -> Point3<f64> {
        self.atoms[atom].position
    }

    fn atom_name(&self, atom: usize) -> &str {
        &self.atoms[atom].name
    }

    fn formal_charge(&self, atom: usize) -> i8 {
        self.atoms[atom].formal_charge
    }

    fn altloc(&self, atom: usize) -> Option<char> {
        self.atoms[atom].altloc
    }

    fn model_index(&self, atom: usize) -> usize {
        self.atoms[atom].model_index
    }

    fn role(&self, atom: usize) -> AtomRole {
        self.roles[atom]
    }

    fn residue_index(&self, atom: usize) -> usize {
        self.atom_residue[atom]
    }

    fn residue_name(&self, residue: usize) -> &str {
        self.system
            .residue(self.residue_ids[residue])
            .map(|r| r.name.as_str())
            .unwrap_or("")
    }

    fn residue_number(&self, residue: usize) -> isize {
        self.system
            .residue(self.residue_ids[residue])
            .map(|r| r.residue_number)
            .unwrap_or_default()
    }

    fn chain_id(&self, residue: usize) -> char {
        self.residue_chains[residue]
    }

    fn residue_atoms(&self, residue: usize) -> &[usize] {
        &self.residue_atoms[residue]
    }

    fn bonded_neighbors(&self, atom: usize) -> &[usize] {
        &self.neighbors[self.neighbor_offsets[atom]..self.neighbor_offsets[atom + 1]]
    }

    fn bond_order(&self, atom1: usize, atom2: usize) -> Option<BondOrder> {
        self.bond_orders
            .get(&(atom1.min(atom2), atom1.max(atom2)))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::chain::ChainType;

    fn small_system() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let protein = system.add_chain('A', ChainType::Protein);
        let water = system.add_chain('W', ChainType::Water);
        let ser = system.add_residue(protein, 5, "SER").unwrap();
        let hoh = system.add_residue(water, 1, "HOH").unwrap();
        let ca = system
            .add_atom_to_residue(ser, Atom::new("CA", ser, Point3::new(0.0, 0.0, 0.0)))
            .unwrap();
        let cb = system
            .add_atom_to_residue(ser, Atom::new("CB", ser, Point3::new(1.5, 0.0, 0.0)))
            .unwrap();
        let og = system
            .add_atom_to_residue(ser, Atom::new("OG", ser, Point3::new(2.0, 1.3, 0.0)))
            .unwrap();
        system
            .add_atom_to_residue(hoh, Atom::new("O", hoh, Point3::new(4.5, 1.3, 0.0)))
            .unwrap();
        system.add_bond(ca, cb, BondOrder::Single).unwrap();
        system.add_bond(cb, og, BondOrder::Single).unwrap();
        system
    }

    #[test]
    fn atoms_are_numbered_by_chain_and_residue() {
        let system = small_system();
        let view = IndexedStructure::new(&system);
        assert_eq!(view.atom_count(), 4);
        assert_eq!(view.residue_count(), 2);
        assert_eq!(view.residue_atoms(0), &[0, 1, 2]);
        assert_eq!(view.residue_atoms(1), &[3]);
        assert_eq!(view.atom_name(2), "OG");
        assert_eq!(view.residue_name(1), "HOH");
        assert_eq!(view.residue_number(0), 5);
        assert_eq!(view.chain_id(1), 'W');
        for index in 0..view.atom_count() {
            assert_eq!(view.index_of(view.atom_id(index)), Some(index));
        }
    }

    #[test]
    fn neighbor_lists_are_symmetric_and_sorted() {
        let system = small_system();
        let view = IndexedStructure::new(&system);
        assert_eq!(view.bonded_neighbors(0), &[1]);
        assert_eq!(view.bonded_neighbors(1), &[0, 2]);
        assert_eq!(view.bonded_neighbors(3), &[] as &[usize]);
        assert!(view.is_bonded(2, 1));
        assert_eq!(view.bond_order(2, 1), Some(BondOrder::Single));
        assert_eq!(view.bond_order(0, 2), None);
        assert_eq!(view.heavy_degree(1), 2);
    }

    #[test]
    fn roles_are_inferred_from_residue_classes() {
        let system = small_system();
        let view = IndexedStructure::new(&system);
        assert_eq!(view.role(0), AtomRole::Backbone);
        assert_eq!(view.role(2), AtomRole::Sidechain);
        assert_eq!(view.role(3), AtomRole::Water);
        assert!(view.is_water(3));
    }

    #[test]
    fn atom_label_includes_chain_residue_and_name() {
        let system = small_system();
        let view = IndexedStructure::new(&system);
        assert_eq!(view.atom_label(2), "A:SER 5:OG");
        assert_eq!(view.atom_label(3), "W:HOH 1:O");
    }
}
