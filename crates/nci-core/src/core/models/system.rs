use super::atom::{Atom, AtomRole};
use super::chain::{Chain, ChainType};
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::Residue;
use super::topology::{Bond, BondOrder};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashMap;

/// Represents a complete molecular system with atoms, residues, chains, and bonds.
///
/// This struct is the owned, editable representation of a structure. Contact
/// detection does not read it directly; it goes through the dense
/// [`IndexedStructure`](crate::core::structure::IndexedStructure) view built on top of it.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues using a slot map for efficient ID management.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains using a slot map for efficient ID management.
    chains: SlotMap<ChainId, Chain>,
    /// Chains in insertion order.
    chain_order: Vec<ChainId>,
    /// List of all bonds in the system.
    bonds: Vec<Bond>,
    /// Lookup map for finding residues by chain ID and residue number.
    residue_id_map: HashMap<(ChainId, isize), ResidueId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
    /// Cached adjacency list for bond connectivity, indexed by atom ID.
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
    /// Bond order keyed by the ordered atom pair.
    bond_orders: HashMap<(AtomId, AtomId), BondOrder>,
}

fn bond_key(a: AtomId, b: AtomId) -> (AtomId, AtomId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The atom ID to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Atom)` if the atom exists, otherwise `None`.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Retrieves an immutable reference to a residue by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The residue ID to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Residue)` if the residue exists, otherwise `None`.
    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    /// Retrieves an immutable reference to a chain by its ID.
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Returns an iterator over all chains in insertion order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(ChainId, &Chain)` pairs.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(|&id| self.chains.get(id).map(|chain| (id, chain)))
    }

    /// Returns a slice of all bonds in the system.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Finds a chain ID by its single-character identifier.
    ///
    /// # Arguments
    ///
    /// * `id` - The character identifier of the chain.
    ///
    /// # Return
    ///
    /// Returns `Some(ChainId)` if the chain exists, otherwise `None`.
    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue ID by its chain ID and residue number.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The ID of the chain containing the residue.
    /// * `residue_number` - The sequence number of the residue.
    ///
    /// # Return
    ///
    /// Returns `Some(ResidueId)` if the residue exists, otherwise `None`.
    pub fn find_residue_by_id(
        &self,
        chain_id: ChainId,
        residue_number: isize,
    ) -> Option<ResidueId> {
        self.residue_id_map
            .get(&(chain_id, residue_number))
            .copied()
    }

    /// Adds a new chain to the system or returns the existing one.
    ///
    /// This method is idempotent; if a chain with the given ID already exists,
    /// it returns the existing chain ID without creating a duplicate.
    ///
    /// # Arguments
    ///
    /// * `id` - The single-character identifier for the chain.
    /// * `chain_type` - The type of the chain.
    ///
    /// # Return
    ///
    /// The ID of the chain (new or existing).
    pub fn add_chain(&mut self, id: char, chain_type: ChainType) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id, chain_type));
        self.chain_id_map.insert(id, chain_id);
        self.chain_order.push(chain_id);
        chain_id
    }

    /// Adds a new residue to the system or returns the existing one.
    ///
    /// This method is idempotent; if a residue with the given chain ID and
    /// residue number already exists, it returns the existing residue ID.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The ID of the chain to add the residue to.
    /// * `residue_number` - The sequence number of the residue.
    /// * `name` - The name of the residue.
    ///
    /// # Return
    ///
    /// Returns `Some(ResidueId)` if successful, otherwise `None` (e.g., if chain doesn't exist).
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        residue_number: isize,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, residue_number);

        let residue_id = *self.residue_id_map.entry(key).or_insert_with(|| {
            let residue = Residue::new(residue_number, name, chain_id);
            self.residues.insert(residue)
        });

        if !chain.residues.contains(&residue_id) {
            chain.residues.push(residue_id);
        }

        Some(residue_id)
    }

    /// Adds an atom to a specific residue.
    ///
    /// # Arguments
    ///
    /// * `residue_id` - The ID of the residue to add the atom to.
    /// * `atom` - The atom to add.
    ///
    /// # Return
    ///
    /// Returns `Some(AtomId)` if successful, otherwise `None` (e.g., if residue doesn't exist).
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }

        let name = atom.name.clone();
        let atom_id = self.atoms.insert(Atom { residue_id, ..atom });
        self.bond_adjacency.insert(atom_id, Vec::new());
        self.residues.get_mut(residue_id)?.add_atom(&name, atom_id);

        Some(atom_id)
    }

    /// Adds a bond between two atoms.
    ///
    /// This method is idempotent; adding an existing bond succeeds without
    /// creating duplicates. Self-bonds are rejected.
    ///
    /// # Arguments
    ///
    /// * `atom1_id` - ID of the first atom.
    /// * `atom2_id` - ID of the second atom.
    /// * `order` - The order of the bond.
    ///
    /// # Return
    ///
    /// Returns `Some(())` if successful, otherwise `None` (e.g., if atoms don't exist).
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId, order: BondOrder) -> Option<()> {
        if atom1_id == atom2_id
            || !self.atoms.contains_key(atom1_id)
            || !self.atoms.contains_key(atom2_id)
        {
            return None;
        }

        let key = bond_key(atom1_id, atom2_id);
        if self.bond_orders.contains_key(&key) {
            return Some(());
        }

        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        self.bond_orders.insert(key, order);
        self.bond_adjacency.get_mut(atom1_id)?.push(atom2_id);
        self.bond_adjacency.get_mut(atom2_id)?.push(atom1_id);
        Some(())
    }

    /// Retrieves the bonded neighbors of an atom.
    ///
    /// # Return
    ///
    /// Returns `Some(&[AtomId])` if the atom exists, otherwise `None`.
    pub fn get_bonded_neighbors(&self, atom_id: AtomId) -> Option<&[AtomId]> {
        self.bond_adjacency.get(atom_id).map(|v| v.as_slice())
    }

    /// Returns the order of the bond between two atoms, if they are bonded.
    pub fn bond_order(&self, atom1_id: AtomId, atom2_id: AtomId) -> Option<BondOrder> {
        self.bond_orders
            .get(&bond_key(atom1_id, atom2_id))
            .copied()
    }

    /// Returns an iterator over atoms with a specific role.
    pub fn atoms_by_role(&self, role: AtomRole) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter().filter(move |(_, atom)| atom.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use nalgebra::Point3;

    fn water_dimer() -> (MolecularSystem, [AtomId; 4]) {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('W', ChainType::Water);
        let r1 = system.add_residue(chain_id, 1, "HOH").unwrap();
        let r2 = system.add_residue(chain_id, 2, "HOH").unwrap();
        let o1 = system
            .add_atom_to_residue(r1, Atom::new("O", r1, Point3::origin()))
            .unwrap();
        let h1 = system
            .add_atom_to_residue(r1, Atom::new("H1", r1, Point3::new(0.96, 0.0, 0.0)))
            .unwrap();
        let o2 = system
            .add_atom_to_residue(r2, Atom::new("O", r2, Point3::new(2.9, 0.0, 0.0)))
            .unwrap();
        let h2 = system
            .add_atom_to_residue(r2, Atom::new("H1", r2, Point3::new(3.2, 0.9, 0.0)))
            .unwrap();
        system.add_bond(o1, h1, BondOrder::Single).unwrap();
        system.add_bond(o2, h2, BondOrder::Single).unwrap();
        (system, [o1, h1, o2, h2])
    }

    #[test]
    fn system_creation_and_access() {
        let (system, [o1, h1, o2, _]) = water_dimer();
        assert_eq!(system.atom_count(), 4);
        assert_eq!(system.residue_count(), 2);
        assert_eq!(system.bonds().len(), 2);
        assert_eq!(system.atom(o1).unwrap().element, Element::O);
        assert_eq!(system.get_bonded_neighbors(o1).unwrap(), &[h1]);
        assert!(system.get_bonded_neighbors(o2).unwrap().len() == 1);
    }

    #[test]
    fn add_atom_overrides_residue_id_with_target() {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A', ChainType::Protein);
        let residue_id = system.add_residue(chain_id, 1, "ALA").unwrap();
        let atom = Atom::new("CA", ResidueId::default(), Point3::origin());
        let atom_id = system.add_atom_to_residue(residue_id, atom).unwrap();
        assert_eq!(system.atom(atom_id).unwrap().residue_id, residue_id);
    }

    #[test]
    fn add_residue_and_chain_are_idempotent() {
        let mut system = MolecularSystem::new();
        let a = system.add_chain('A', ChainType::Protein);
        assert_eq!(system.add_chain('A', ChainType::Other), a);
        let r = system.add_residue(a, 7, "GLY").unwrap();
        assert_eq!(system.add_residue(a, 7, "GLY"), Some(r));
        assert_eq!(system.chain(a).unwrap().residues(), &[r]);
        assert_eq!(system.find_residue_by_id(a, 7), Some(r));
        assert_eq!(system.find_chain_by_id('A'), Some(a));
    }

    #[test]
    fn add_residue_fails_for_unknown_chain() {
        let mut system = MolecularSystem::new();
        assert!(system.add_residue(ChainId::default(), 1, "ALA").is_none());
    }

    #[test]
    fn idempotent_add_bond_does_not_create_duplicates() {
        let (mut system, [o1, h1, _, _]) = water_dimer();
        system.add_bond(h1, o1, BondOrder::Double).unwrap();
        assert_eq!(system.bonds().len(), 2);
        assert_eq!(system.bond_order(h1, o1), Some(BondOrder::Single));
        assert_eq!(system.get_bonded_neighbors(h1).unwrap(), &[o1]);
    }

    #[test]
    fn add_bond_rejects_self_bonds() {
        let (mut system, [o1, ..]) = water_dimer();
        assert!(system.add_bond(o1, o1, BondOrder::Single).is_none());
    }

    #[test]
    fn chains_iter_preserves_insertion_order() {
        let mut system = MolecularSystem::new();
        system.add_chain('C', ChainType::Protein);
        system.add_chain('A', ChainType::Protein);
        system.add_chain('B', ChainType::Ligand);
        let ids: Vec<char> = system.chains_iter().map(|(_, c)| c.id).collect();
        assert_eq!(ids, vec!['C', 'A', 'B']);
    }

    #[test]
    fn atoms_by_role_filters_atoms() {
        let (mut system, [o1, ..]) = water_dimer();
        system.atom_mut(o1).unwrap().role = AtomRole::Water;
        let water: Vec<AtomId> = system.atoms_by_role(AtomRole::Water).map(|(id, _)| id).collect();
        assert_eq!(water, vec![o1]);
    }
}
