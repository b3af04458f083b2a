use super::contacts::{ContactType, Contacts};
use super::features::{FeatureProvider, FeatureType, Features};
use super::{ContactDetector, scan_pairs};
use crate::core::models::element::Element;
use crate::core::structure::Structure;
use crate::engine::config::ContactParams;
use tracing::{info, instrument};

fn is_hydrophobic(structure: &dyn Structure, atom: usize) -> bool {
    let only_bonded_to = |allowed: &[Element]| {
        structure
            .bonded_neighbors(atom)
            .iter()
            .all(|&n| allowed.contains(&structure.element(n)))
    };
    match structure.element(atom) {
        Element::C => only_bonded_to(&[Element::C, Element::H]),
        Element::S => only_bonded_to(&[Element::C, Element::S, Element::H]),
        Element::F => true,
        _ => false,
    }
}

/// Carbon bonded only to C/H, sulfur bonded only to C/S/H, and fluorine.
#[derive(Debug, Default, Clone, Copy)]
pub struct HydrophobicAtoms;

impl FeatureProvider for HydrophobicAtoms {
    fn name(&self) -> &'static str {
        "hydrophobic atoms"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        for atom in 0..structure.atom_count() {
            if is_hydrophobic(structure, atom) {
                features.add_atom(structure, FeatureType::Hydrophobic, atom);
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HydrophobicDetector;

impl ContactDetector for HydrophobicDetector {
    fn name(&self) -> &'static str {
        "hydrophobic"
    }

    fn max_distance(&self, params: &ContactParams) -> f64 {
        params.max_hydrophobic_dist
    }

    #[instrument(skip_all, name = "hydrophobic_detector")]
    fn detect(&self, structure: &dyn Structure, contacts: &mut Contacts, params: &ContactParams) {
        let accepted = scan_pairs(
            structure,
            contacts,
            self.max_distance(params),
            params.master_model_index,
            |t| t == FeatureType::Hydrophobic,
            |features, i, j, _| {
                let bonded =
                    structure.is_bonded(features.anchor_atom(i), features.anchor_atom(j));
                (!bonded).then_some((i, j, ContactType::Hydrophobic))
            },
        );
        info!(accepted, "Hydrophobic contact detection complete.");
    }
}
