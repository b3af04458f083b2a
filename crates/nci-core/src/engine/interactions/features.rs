use crate::core::collections::SpatialIndex;
use crate::core::structure::Structure;
use crate::core::utils::geometry;
use nalgebra::{Point3, Unit, Vector3};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureType {
    Unknown,
    PositiveCharge,
    NegativeCharge,
    AromaticRing,
    HydrogenDonor,
    HydrogenAcceptor,
    HalogenDonor,
    HalogenAcceptor,
    Hydrophobic,
    WeakHydrogenDonor,
    IonicTypePartner,
    DativeBondPartner,
    TransitionMetal,
    IonicTypeMetal,
}

impl FeatureType {
    pub fn is_charge(self) -> bool {
        matches!(self, Self::PositiveCharge | Self::NegativeCharge)
    }

    pub fn is_metal(self) -> bool {
        matches!(self, Self::TransitionMetal | Self::IonicTypeMetal)
    }

    pub fn is_metal_partner(self) -> bool {
        matches!(self, Self::IonicTypePartner | Self::DativeBondPartner)
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::PositiveCharge => "positive charge",
            Self::NegativeCharge => "negative charge",
            Self::AromaticRing => "aromatic ring",
            Self::HydrogenDonor => "hydrogen donor",
            Self::HydrogenAcceptor => "hydrogen acceptor",
            Self::HalogenDonor => "halogen donor",
            Self::HalogenAcceptor => "halogen acceptor",
            Self::Hydrophobic => "hydrophobic",
            Self::WeakHydrogenDonor => "weak hydrogen donor",
            Self::IonicTypePartner => "ionic type partner",
            Self::DativeBondPartner => "dative bond partner",
            Self::TransitionMetal => "transition metal",
            Self::IonicTypeMetal => "ionic type metal",
        };
        f.write_str(name)
    }
}

/// Chemical group a multi-atom feature was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeatureGroup {
    #[default]
    None,
    QuaternaryAmine,
    Phosphate,
    Sulfate,
    Sulfonium,
    Carboxylate,
    Guanidine,
    Acetamidine,
}

/// Typed chemical features of one structure, stored as parallel arrays.
///
/// A feature is identified by its index. Each one has a type, a group, the atoms
/// it is made of and a center (the atom position, or the centroid for multi-atom
/// features). The same atom set is never added twice with the same type.
#[derive(Debug, Clone, Default)]
pub struct Features {
    types: Vec<FeatureType>,
    groups: Vec<FeatureGroup>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    atom_sets: Vec<Vec<usize>>,
    seen: HashSet<(FeatureType, Vec<usize>)>,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a feature and returns its index.
    ///
    /// Returns `None` without adding anything when `atoms` is empty or the same
    /// atom set already has a feature of this type. Atom order is kept, so ring
    /// atoms stay in bonding order.
    pub fn add(
        &mut self,
        feature_type: FeatureType,
        group: FeatureGroup,
        atoms: Vec<usize>,
        center: Point3<f64>,
    ) -> Option<usize> {
        if atoms.is_empty() {
            return None;
        }
        let mut key = atoms.clone();
        key.sort_unstable();
        if !self.seen.insert((feature_type, key)) {
            return None;
        }
        let index = self.types.len();
        self.types.push(feature_type);
        self.groups.push(group);
        self.x.push(center.x);
        self.y.push(center.y);
        self.z.push(center.z);
        self.atom_sets.push(atoms);
        Some(index)
    }

    /// Adds a single-atom feature centered on the atom.
    pub fn add_atom(
        &mut self,
        structure: &dyn Structure,
        feature_type: FeatureType,
        atom: usize,
    ) -> Option<usize> {
        self.add(
            feature_type,
            FeatureGroup::None,
            vec![atom],
            structure.position(atom),
        )
    }

    /// Adds a multi-atom feature centered on the centroid of its atoms.
    pub fn add_group(
        &mut self,
        structure: &dyn Structure,
        feature_type: FeatureType,
        group: FeatureGroup,
        atoms: Vec<usize>,
    ) -> Option<usize> {
        let positions: Vec<Point3<f64>> = atoms.iter().map(|&a| structure.position(a)).collect();
        let center = geometry::centroid(&positions)?;
        self.add(feature_type, group, atoms, center)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn feature_type(&self, index: usize) -> FeatureType {
        self.types[index]
    }

    pub fn group(&self, index: usize) -> FeatureGroup {
        self.groups[index]
    }

    pub fn atoms(&self, index: usize) -> &[usize] {
        &self.atom_sets[index]
    }

    /// First atom of a feature, used for residue, model and altloc checks.
    pub fn anchor_atom(&self, index: usize) -> usize {
        self.atom_sets[index][0]
    }

    pub fn center(&self, index: usize) -> Point3<f64> {
        Point3::new(self.x[index], self.y[index], self.z[index])
    }

    pub fn types(&self) -> &[FeatureType] {
        &self.types
    }

    /// Ring plane normal computed from the current atom positions.
    pub fn normal(&self, structure: &dyn Structure, index: usize) -> Option<Unit<Vector3<f64>>> {
        let positions: Vec<Point3<f64>> = self.atom_sets[index]
            .iter()
            .map(|&a| structure.position(a))
            .collect();
        geometry::plane_normal(&positions)
    }

    pub fn count_of(&self, feature_type: FeatureType) -> usize {
        self.types.iter().filter(|&&t| t == feature_type).count()
    }

    /// Indexes the feature centers for radius queries.
    pub fn spatial_index(&self, cell_size: f64) -> SpatialIndex {
        SpatialIndex::from_coords(&self.x, &self.y, &self.z, cell_size)
    }
}

/// Adds the features of one chemical role to a feature collection.
pub trait FeatureProvider {
    fn name(&self) -> &'static str;
    fn add_features(&self, structure: &dyn Structure, features: &mut Features);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_duplicate_atom_sets_of_the_same_type() {
        let mut features = Features::new();
        let center = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(
            features.add(FeatureType::HydrogenDonor, FeatureGroup::None, vec![4], center),
            Some(0)
        );
        assert_eq!(
            features.add(FeatureType::HydrogenDonor, FeatureGroup::None, vec![4], center),
            None
        );
        assert_eq!(
            features.add(FeatureType::HydrogenAcceptor, FeatureGroup::None, vec![4], center),
            Some(1)
        );
        assert_eq!(features.len(), 2);
        assert_eq!(features.center(1), center);
    }

    #[test]
    fn atom_order_is_kept_but_permutations_are_duplicates() {
        let mut features = Features::new();
        let center = Point3::origin();
        let ring = vec![5, 3, 4, 2, 1, 0];
        assert_eq!(
            features.add(FeatureType::AromaticRing, FeatureGroup::None, ring.clone(), center),
            Some(0)
        );
        assert_eq!(features.atoms(0), ring.as_slice());
        assert_eq!(features.anchor_atom(0), 5);
        assert_eq!(
            features.add(
                FeatureType::AromaticRing,
                FeatureGroup::None,
                vec![0, 1, 2, 3, 4, 5],
                center
            ),
            None
        );
    }

    #[test]
    fn empty_atom_sets_are_ignored() {
        let mut features = Features::new();
        assert_eq!(
            features.add(FeatureType::Hydrophobic, FeatureGroup::None, vec![], Point3::origin()),
            None
        );
        assert!(features.is_empty());
    }

    #[test]
    fn spatial_index_covers_every_center() {
        let mut features = Features::new();
        for i in 0..5 {
            features.add(
                FeatureType::Hydrophobic,
                FeatureGroup::None,
                vec![i],
                Point3::new(i as f64 * 2.0, 0.0, 0.0),
            );
        }
        let index = features.spatial_index(3.0);
        assert_eq!(index.len(), 5);
        assert_eq!(index.within(&Point3::new(4.0, 0.0, 0.0), 2.0), vec![1, 2, 3]);
        assert_eq!(features.count_of(FeatureType::Hydrophobic), 5);
    }
}
