use super::contacts::{ContactType, Contacts};
use super::features::{FeatureProvider, FeatureType, Features};
use super::{Accepted, ContactDetector, oriented, scan_pairs};
use crate::core::chemistry::residues;
use crate::core::models::element::Element;
use crate::core::structure::Structure;
use crate::engine::config::ContactParams;
use tracing::{debug, info, instrument};

fn is_ionic_partner(structure: &dyn Structure, atom: usize) -> bool {
    let element = structure.element(atom);
    let residue_name = structure.atom_residue_name(atom);
    let carboxylate_oxygen = element == Element::O
        && residues::negative_sidechain_atoms(residue_name)
            .is_some_and(|names| names.contains(&structure.atom_name(atom).trim()));
    let halide_ion = element.is_halogen() && structure.bonded_neighbors(atom).is_empty();
    carboxylate_oxygen || halide_ion || structure.formal_charge(atom) < 0
}

fn is_dative_partner(structure: &dyn Structure, atom: usize) -> bool {
    let element = structure.element(atom);
    if !matches!(element, Element::N | Element::O | Element::S) {
        return false;
    }
    let residue_name = structure.atom_residue_name(atom);
    let atom_name = structure.atom_name(atom).trim();
    if residues::dative_sidechain_atoms(residue_name).contains(&atom_name) {
        return true;
    }
    let backbone_carbonyl = structure.is_backbone(atom) && atom_name == "O";
    if element == Element::O && (structure.is_water(atom) || backbone_carbonyl) {
        return true;
    }
    !residues::is_polymer(residue_name) && !structure.is_water(atom)
}

/// Atoms able to coordinate a metal.
///
/// Acidic oxygens, anions and free halide ions bind ionically; lone-pair donors
/// (histidine nitrogens, thiols and thioethers, carbonyl and hydroxyl oxygens,
/// water and ligand heteroatoms) bind datively. An atom gets at most one of the
/// two partner types, ionic first.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetalBindingPartners;

impl FeatureProvider for MetalBindingPartners {
    fn name(&self) -> &'static str {
        "metal binding partners"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        for atom in 0..structure.atom_count() {
            if is_ionic_partner(structure, atom) {
                features.add_atom(structure, FeatureType::IonicTypePartner, atom);
            } else if is_dative_partner(structure, atom) {
                features.add_atom(structure, FeatureType::DativeBondPartner, atom);
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Metals;

impl FeatureProvider for Metals {
    fn name(&self) -> &'static str {
        "metals"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        for atom in 0..structure.atom_count() {
            let element = structure.element(atom);
            if element.is_transition_metal() {
                features.add_atom(structure, FeatureType::TransitionMetal, atom);
            } else if element.is_ionic_type_metal() {
                features.add_atom(structure, FeatureType::IonicTypeMetal, atom);
            }
        }
    }
}

/// Metal coordination. Ionic-type metals bind only ionic partners; transition
/// metals bind either partner type.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetalCoordinationDetector;

impl MetalCoordinationDetector {
    fn classify(
        features: &Features,
        i: usize,
        j: usize,
        dist_sq: f64,
        params: &ContactParams,
    ) -> Option<Accepted> {
        if dist_sq > params.max_metal_dist * params.max_metal_dist {
            return None;
        }
        let (metal, partner) = oriented(features, i, j, FeatureType::is_metal);
        let compatible = match (features.feature_type(metal), features.feature_type(partner)) {
            (FeatureType::IonicTypeMetal, FeatureType::IonicTypePartner) => true,
            (FeatureType::TransitionMetal, partner_type) => partner_type.is_metal_partner(),
            _ => false,
        };
        compatible.then_some((metal, partner, ContactType::MetalCoordination))
    }
}

impl ContactDetector for MetalCoordinationDetector {
    fn name(&self) -> &'static str {
        "metal coordination"
    }

    fn max_distance(&self, params: &ContactParams) -> f64 {
        params.max_metal_dist
    }

    #[instrument(skip_all, name = "metal_coordination_detector")]
    fn detect(&self, structure: &dyn Structure, contacts: &mut Contacts, params: &ContactParams) {
        let accepted = scan_pairs(
            structure,
            contacts,
            self.max_distance(params),
            params.master_model_index,
            |t| t.is_metal() || t.is_metal_partner(),
            |features, i, j, dist_sq| Self::classify(features, i, j, dist_sq, params),
        );
        debug!(
            transition = contacts.features.count_of(FeatureType::TransitionMetal),
            ionic = contacts.features.count_of(FeatureType::IonicTypeMetal),
            "Metal features scanned."
        );
        info!(accepted, "Metal coordination detection complete.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::BondOrder;
    use crate::core::structure::IndexedStructure;
    use crate::engine::interactions::test_support::SystemSketch;

    fn detect(sketch: &SystemSketch) -> Contacts {
        let view = IndexedStructure::new(&sketch.system);
        let mut features = Features::new();
        MetalBindingPartners.add_features(&view, &mut features);
        Metals.add_features(&view, &mut features);
        let params = ContactParams::default();
        let mut contacts = Contacts::new(features, MetalCoordinationDetector.max_distance(&params));
        MetalCoordinationDetector.detect(&view, &mut contacts, &params);
        contacts
    }

    #[test]
    fn partner_types_follow_residue_chemistry() {
        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "ASP");
        sketch.atom("OD1", Element::O, [0.0, 0.0, 0.0]);
        sketch.residue('A', 2, "HIS");
        sketch.atom("NE2", Element::N, [5.0, 0.0, 0.0]);
        sketch.atom("CB", Element::C, [6.0, 0.0, 0.0]);
        sketch.residue('A', 3, "GLY");
        sketch.atom("O", Element::O, [10.0, 0.0, 0.0]);
        sketch.atom("N", Element::N, [11.0, 0.0, 0.0]);
        sketch.residue('W', 4, "HOH");
        sketch.atom("O", Element::O, [15.0, 0.0, 0.0]);
        sketch.residue('I', 5, "CL");
        sketch.atom("CL", Element::CL, [20.0, 0.0, 0.0]);

        let view = IndexedStructure::new(&sketch.system);
        let mut features = Features::new();
        MetalBindingPartners.add_features(&view, &mut features);
        let typed: Vec<(usize, FeatureType)> = (0..features.len())
            .map(|f| (features.anchor_atom(f), features.feature_type(f)))
            .collect();
        assert_eq!(
            typed,
            vec![
                (0, FeatureType::IonicTypePartner),
                (1, FeatureType::DativeBondPartner),
                (3, FeatureType::DativeBondPartner),
                (5, FeatureType::DativeBondPartner),
                (6, FeatureType::IonicTypePartner),
            ]
        );
    }

    #[test]
    fn zinc_binds_histidine_and_sodium_only_binds_carboxylate() {
        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "HIS");
        let ne2 = sketch.atom("NE2", Element::N, [0.0, 0.0, 0.0]);
        let ce1 = sketch.atom("CE1", Element::C, [-0.7, 1.1, 0.0]);
        sketch.bond(ne2, ce1, BondOrder::Aromatic);
        sketch.residue('M', 2, "ZN");
        sketch.atom("ZN", Element::ZN, [2.1, 0.0, 0.0]);

        let contacts = detect(&sketch);
        assert_eq!(contacts.store.count(), 1);
        let metal = contacts.store.index1(0);
        assert_eq!(
            contacts.features.feature_type(metal),
            FeatureType::TransitionMetal
        );
        assert_eq!(
            contacts.store.contact_type(0),
            ContactType::MetalCoordination
        );

        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "SER");
        sketch.atom("OG", Element::O, [0.0, 0.0, 0.0]);
        sketch.residue('A', 2, "GLU");
        sketch.atom("OE1", Element::O, [0.0, 4.8, 0.0]);
        sketch.residue('M', 3, "NA");
        sketch.atom("NA", Element::NA, [0.0, 2.4, 0.0]);

        let contacts = detect(&sketch);
        assert_eq!(contacts.store.count(), 1);
        let partner = contacts.store.index2(0);
        assert_eq!(contacts.features.anchor_atom(partner), 1);
    }

    #[test]
    fn distant_ligand_is_not_coordinated() {
        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "CYS");
        sketch.atom("SG", Element::S, [0.0, 0.0, 0.0]);
        sketch.residue('M', 2, "FE");
        sketch.atom("FE", Element::FE, [3.4, 0.0, 0.0]);

        let contacts = detect(&sketch);
        assert_eq!(contacts.features.len(), 2);
        assert_eq!(contacts.store.count(), 0);
    }
}
