use super::features::Features;
use crate::core::collections::{AdjacencyList, BitSet, SpatialIndex};
use crate::core::structure::Structure;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ContactType {
    Unknown = 0,
    IonicInteraction = 1,
    CationPi = 2,
    PiStacking = 3,
    HydrogenBond = 4,
    HalogenBond = 5,
    Hydrophobic = 6,
    MetalCoordination = 7,
    WeakHydrogenBond = 8,
    WaterHydrogenBond = 9,
    BackboneHydrogenBond = 10,
}

impl ContactType {
    pub const ALL: [ContactType; 10] = [
        ContactType::IonicInteraction,
        ContactType::CationPi,
        ContactType::PiStacking,
        ContactType::HydrogenBond,
        ContactType::HalogenBond,
        ContactType::Hydrophobic,
        ContactType::MetalCoordination,
        ContactType::WeakHydrogenBond,
        ContactType::WaterHydrogenBond,
        ContactType::BackboneHydrogenBond,
    ];

    /// Human readable name; all hydrogen bond flavors except weak ones share one name.
    pub fn name(self) -> &'static str {
        match self {
            ContactType::HydrogenBond
            | ContactType::WaterHydrogenBond
            | ContactType::BackboneHydrogenBond => "hydrogen bond",
            ContactType::Hydrophobic => "hydrophobic contact",
            ContactType::HalogenBond => "halogen bond",
            ContactType::IonicInteraction => "ionic interaction",
            ContactType::MetalCoordination => "metal coordination",
            ContactType::CationPi => "cation-pi interaction",
            ContactType::PiStacking => "pi-pi stacking",
            ContactType::WeakHydrogenBond => "weak hydrogen bond",
            ContactType::Unknown => "unknown contact",
        }
    }

    /// Stable identifier used in reports and CLI flags.
    pub fn key(self) -> &'static str {
        match self {
            ContactType::Unknown => "unknown",
            ContactType::IonicInteraction => "ionic",
            ContactType::CationPi => "cation-pi",
            ContactType::PiStacking => "pi-stacking",
            ContactType::HydrogenBond => "hbond",
            ContactType::HalogenBond => "halogen",
            ContactType::Hydrophobic => "hydrophobic",
            ContactType::MetalCoordination => "metal",
            ContactType::WeakHydrogenBond => "weak-hbond",
            ContactType::WaterHydrogenBond => "water-hbond",
            ContactType::BackboneHydrogenBond => "backbone-hbond",
        }
    }

    pub fn is_hydrogen_bond(self) -> bool {
        matches!(
            self,
            ContactType::HydrogenBond
                | ContactType::WeakHydrogenBond
                | ContactType::WaterHydrogenBond
                | ContactType::BackboneHydrogenBond
        )
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Append-only columnar store of contact records between two features.
#[derive(Debug, Clone, Default)]
pub struct ContactStore {
    index1: Vec<usize>,
    index2: Vec<usize>,
    types: Vec<ContactType>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its contact id.
    pub fn add_contact(&mut self, index1: usize, index2: usize, contact_type: ContactType) -> usize {
        self.index1.push(index1);
        self.index2.push(index2);
        self.types.push(contact_type);
        self.types.len() - 1
    }

    pub fn count(&self) -> usize {
        self.types.len()
    }

    pub fn index1(&self, contact: usize) -> usize {
        self.index1[contact]
    }

    pub fn index2(&self, contact: usize) -> usize {
        self.index2[contact]
    }

    pub fn contact_type(&self, contact: usize) -> ContactType {
        self.types[contact]
    }

    /// Feature at the other end of `contact` from `feature`.
    pub fn partner(&self, contact: usize, feature: usize) -> usize {
        if self.index1[contact] == feature {
            self.index2[contact]
        } else {
            self.index1[contact]
        }
    }

    pub fn adjacency(&self, feature_count: usize) -> AdjacencyList {
        AdjacencyList::new(&self.index1, &self.index2, self.count(), feature_count)
    }
}

/// Mutable per-call detection context.
#[derive(Debug)]
pub struct Contacts {
    pub features: Features,
    pub spatial_index: SpatialIndex,
    pub store: ContactStore,
    /// Features taking part in at least one accepted contact.
    pub feature_set: BitSet,
}

impl Contacts {
    /// Creates an empty context over `features`, indexing their centers with `cell_size`.
    pub fn new(features: Features, cell_size: f64) -> Self {
        let spatial_index = features.spatial_index(cell_size);
        let feature_set = BitSet::new(features.len(), false);
        Self {
            features,
            spatial_index,
            store: ContactStore::new(),
            feature_set,
        }
    }

    /// Records an accepted contact between features `i` and `j`.
    pub fn accept(&mut self, i: usize, j: usize, contact_type: ContactType) -> usize {
        self.feature_set.set_pair(i, j);
        self.store.add_contact(i, j, contact_type)
    }

    /// Builds the adjacency list and an all-active contact set.
    pub fn freeze(self) -> FrozenContacts {
        let adjacency = self.store.adjacency(self.features.len());
        let contact_set = BitSet::new(self.store.count(), true);
        FrozenContacts {
            features: self.features,
            spatial_index: self.spatial_index,
            store: self.store,
            feature_set: self.feature_set,
            contact_set,
            adjacency,
        }
    }
}

/// Result of contact detection: the final store plus the set of active contacts.
#[derive(Debug)]
pub struct FrozenContacts {
    pub features: Features,
    pub spatial_index: SpatialIndex,
    pub store: ContactStore,
    pub feature_set: BitSet,
    /// One bit per stored contact; cleared bits are rejected contacts.
    pub contact_set: BitSet,
    pub adjacency: AdjacencyList,
}

impl FrozenContacts {
    /// Splits into a read-only view and the clear-only active set.
    pub fn split(&mut self) -> (ContactView<'_>, ActiveSet<'_>) {
        (
            ContactView {
                features: &self.features,
                store: &self.store,
                adjacency: &self.adjacency,
            },
            ActiveSet {
                bits: &mut self.contact_set,
            },
        )
    }

    pub fn active_count(&self) -> usize {
        self.contact_set.count()
    }

    /// Ids of active contacts, ascending.
    pub fn active_contacts(&self) -> impl Iterator<Item = usize> + '_ {
        self.contact_set.iter()
    }

    pub fn distance(&self, contact: usize) -> f64 {
        let a = self.features.center(self.store.index1(contact));
        let b = self.features.center(self.store.index2(contact));
        (a - b).norm()
    }
}

/// Read-only view of frozen contacts used by refinement passes.
#[derive(Debug, Clone, Copy)]
pub struct ContactView<'a> {
    pub features: &'a Features,
    pub store: &'a ContactStore,
    pub adjacency: &'a AdjacencyList,
}

impl ContactView<'_> {
    pub fn distance(&self, contact: usize) -> f64 {
        let a = self.features.center(self.store.index1(contact));
        let b = self.features.center(self.store.index2(contact));
        (a - b).norm()
    }

    pub fn contact_type(&self, contact: usize) -> ContactType {
        self.store.contact_type(contact)
    }

    pub fn partner(&self, contact: usize, feature: usize) -> usize {
        self.store.partner(contact, feature)
    }

    pub fn contacts_of(&self, feature: usize) -> &[usize] {
        self.adjacency.edges_of(feature)
    }
}

/// Active contact bits that refinement may only clear.
#[derive(Debug)]
pub struct ActiveSet<'a> {
    bits: &'a mut BitSet,
}

impl ActiveSet<'_> {
    pub fn is_active(&self, contact: usize) -> bool {
        self.bits.is_set(contact)
    }

    /// Deactivates a contact; returns whether it was active.
    pub fn reject(&mut self, contact: usize) -> bool {
        let was_active = self.bits.is_set(contact);
        self.bits.clear(contact);
        was_active
    }

    pub fn count(&self) -> usize {
        self.bits.count()
    }

    pub fn active(&self) -> Vec<usize> {
        self.bits.iter().collect()
    }
}

/// Whether two atoms must not form a contact.
///
/// When exactly one of them belongs to the master model the pair is always
/// allowed. Otherwise pairs from different models, from the same residue, or
/// from different alternate locations are rejected.
pub fn invalid_atom_contact(
    structure: &dyn Structure,
    atom1: usize,
    atom2: usize,
    master_model: Option<usize>,
) -> bool {
    let model1 = structure.model_index(atom1);
    let model2 = structure.model_index(atom2);
    let master_contact = master_model
        .is_some_and(|master| (model1 == master) != (model2 == master));
    if master_contact {
        return false;
    }
    model1 != model2
        || structure.residue_index(atom1) == structure.residue_index(atom2)
        || matches!(
            (structure.altloc(atom1), structure.altloc(atom2)),
            (Some(a), Some(b)) if a != b
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::ChainType;
    use crate::core::models::system::MolecularSystem;
    use crate::core::structure::IndexedStructure;
    use crate::engine::interactions::features::{FeatureGroup, FeatureType};
    use nalgebra::Point3;

    fn features(count: usize) -> Features {
        let mut features = Features::new();
        for i in 0..count {
            features.add(
                FeatureType::Hydrophobic,
                FeatureGroup::None,
                vec![i],
                Point3::new(i as f64, 0.0, 0.0),
            );
        }
        features
    }

    #[test]
    fn store_appends_records_in_order() {
        let mut store = ContactStore::new();
        assert_eq!(store.add_contact(0, 2, ContactType::Hydrophobic), 0);
        assert_eq!(store.add_contact(1, 2, ContactType::HydrogenBond), 1);
        assert_eq!(store.count(), 2);
        assert_eq!(store.index1(1), 1);
        assert_eq!(store.index2(1), 2);
        assert_eq!(store.contact_type(1), ContactType::HydrogenBond);
        assert_eq!(store.partner(0, 2), 0);
        assert_eq!(store.partner(0, 0), 2);
    }

    #[test]
    fn freeze_activates_every_contact_and_builds_adjacency() {
        let mut contacts = Contacts::new(features(4), 2.0);
        contacts.accept(0, 1, ContactType::Hydrophobic);
        contacts.accept(1, 3, ContactType::Hydrophobic);
        assert_eq!(contacts.feature_set.iter().collect::<Vec<_>>(), vec![0, 1, 3]);

        let mut frozen = contacts.freeze();
        assert_eq!(frozen.active_count(), 2);
        assert_eq!(frozen.adjacency.edges_of(1), &[0, 1]);
        assert_eq!(frozen.distance(1), 2.0);

        let (view, mut active) = frozen.split();
        assert_eq!(view.contacts_of(3), &[1]);
        assert!(active.reject(0));
        assert!(!active.reject(0));
        assert_eq!(active.count(), 1);
        assert_eq!(frozen.active_contacts().collect::<Vec<_>>(), vec![1]);
        assert!(frozen.feature_set.is_set(0));
    }

    #[test]
    fn contact_type_names_group_hydrogen_bonds() {
        assert_eq!(ContactType::WaterHydrogenBond.name(), "hydrogen bond");
        assert_eq!(ContactType::WeakHydrogenBond.name(), "weak hydrogen bond");
        assert_eq!(ContactType::PiStacking.to_string(), "pi-pi stacking");
        assert!(ContactType::BackboneHydrogenBond.is_hydrogen_bond());
        assert!(!ContactType::IonicInteraction.is_hydrogen_bond());
        assert_eq!(ContactType::BackboneHydrogenBond as u8, 10);
    }

    fn model_system() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let chain = system.add_chain('A', ChainType::Protein);
        let r1 = system.add_residue(chain, 1, "SER").unwrap();
        let r2 = system.add_residue(chain, 2, "SER").unwrap();
        let r3 = system.add_residue(chain, 3, "SER").unwrap();
        let atoms = [
            (r1, "OG", 0, None),
            (r1, "CB", 0, None),
            (r2, "OG", 0, Some('A')),
            (r3, "OG", 0, Some('B')),
            (r3, "CB", 1, None),
        ];
        for (residue, name, model, altloc) in atoms {
            let mut atom = Atom::new(name, residue, Point3::origin()).with_model_index(model);
            if let Some(altloc) = altloc {
                atom = atom.with_altloc(altloc);
            }
            system.add_atom_to_residue(residue, atom).unwrap();
        }
        system
    }

    #[test]
    fn invalid_atom_contact_rules() {
        let system = model_system();
        let view = IndexedStructure::new(&system);
        // Same residue.
        assert!(invalid_atom_contact(&view, 0, 1, None));
        // Different residues, one altloc unset.
        assert!(!invalid_atom_contact(&view, 0, 2, None));
        // Mismatched altlocs.
        assert!(invalid_atom_contact(&view, 2, 3, None));
        // Different models without a master model.
        assert!(invalid_atom_contact(&view, 0, 4, None));
        // Exactly one side in the master model.
        assert!(!invalid_atom_contact(&view, 0, 4, Some(1)));
        assert!(!invalid_atom_contact(&view, 3, 4, Some(0)));
        // Both sides in the master model fall back to the normal rules.
        assert!(invalid_atom_contact(&view, 0, 1, Some(0)));
    }
}
