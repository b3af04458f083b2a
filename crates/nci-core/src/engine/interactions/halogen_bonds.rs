use super::contacts::{ContactType, Contacts};
use super::features::{FeatureProvider, FeatureType, Features};
use super::{Accepted, ContactDetector, oriented, scan_pairs};
use crate::core::models::element::Element;
use crate::core::structure::Structure;
use crate::core::utils::geometry;
use crate::engine::config::ContactParams;
use tracing::{info, instrument};

/// Optimal C-X...Y angle at the halogen.
const OPTIMAL_HALOGEN_ANGLE: f64 = 165.0;
/// Optimal R-Y...X angle at the acceptor.
const OPTIMAL_ACCEPTOR_ANGLE: f64 = 120.0;

/// Cl, Br, I and At bonded to exactly one carbon. Fluorine is excluded.
#[derive(Debug, Default, Clone, Copy)]
pub struct HalogenDonors;

impl FeatureProvider for HalogenDonors {
    fn name(&self) -> &'static str {
        "halogen bond donors"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        for atom in 0..structure.atom_count() {
            if structure.element(atom).is_halogen_donor_element()
                && structure.bonded_element_count(atom, Element::C) == 1
            {
                features.add_atom(structure, FeatureType::HalogenDonor, atom);
            }
        }
    }
}

/// N, O and S bonded to at least one C, N, P or S.
#[derive(Debug, Default, Clone, Copy)]
pub struct HalogenAcceptors;

impl FeatureProvider for HalogenAcceptors {
    fn name(&self) -> &'static str {
        "halogen bond acceptors"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        for atom in 0..structure.atom_count() {
            if !matches!(structure.element(atom), Element::N | Element::O | Element::S) {
                continue;
            }
            let anchored = structure.bonded_neighbors(atom).iter().any(|&n| {
                matches!(
                    structure.element(n),
                    Element::C | Element::N | Element::P | Element::S
                )
            });
            if anchored {
                features.add_atom(structure, FeatureType::HalogenAcceptor, atom);
            }
        }
    }
}

/// Angles `neighbor-vertex...target` for every bonded neighbor of `vertex`.
fn angles_at(structure: &dyn Structure, vertex: usize, target: usize) -> Option<Vec<f64>> {
    let vertex_pos = structure.position(vertex);
    let target_pos = structure.position(target);
    structure
        .bonded_neighbors(vertex)
        .iter()
        .map(|&n| geometry::angle(&structure.position(n), &vertex_pos, &target_pos))
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HalogenBondDetector;

impl HalogenBondDetector {
    fn classify(
        structure: &dyn Structure,
        features: &Features,
        i: usize,
        j: usize,
        params: &ContactParams,
    ) -> Option<Accepted> {
        let pair = (features.feature_type(i), features.feature_type(j));
        if !matches!(
            pair,
            (FeatureType::HalogenDonor, FeatureType::HalogenAcceptor)
                | (FeatureType::HalogenAcceptor, FeatureType::HalogenDonor)
        ) {
            return None;
        }
        let (donor, acceptor) = oriented(features, i, j, |t| t == FeatureType::HalogenDonor);
        let halogen = features.anchor_atom(donor);
        let acceptor_atom = features.anchor_atom(acceptor);
        let tolerance = params.max_halogen_bond_angle;

        let halogen_angles = angles_at(structure, halogen, acceptor_atom)?;
        let [halogen_angle] = halogen_angles.as_slice() else {
            return None;
        };
        if OPTIMAL_HALOGEN_ANGLE - halogen_angle > tolerance {
            return None;
        }

        let acceptor_angles = angles_at(structure, acceptor_atom, halogen)?;
        if acceptor_angles.is_empty()
            || !acceptor_angles
                .iter()
                .all(|angle| OPTIMAL_ACCEPTOR_ANGLE - angle <= tolerance)
        {
            return None;
        }
        Some((donor, acceptor, ContactType::HalogenBond))
    }
}

impl ContactDetector for HalogenBondDetector {
    fn name(&self) -> &'static str {
        "halogen bonds"
    }

    fn max_distance(&self, params: &ContactParams) -> f64 {
        params.max_halogen_bond_dist
    }

    #[instrument(skip_all, name = "halogen_bond_detector")]
    fn detect(&self, structure: &dyn Structure, contacts: &mut Contacts, params: &ContactParams) {
        let accepted = scan_pairs(
            structure,
            contacts,
            self.max_distance(params),
            params.master_model_index,
            |t| matches!(t, FeatureType::HalogenDonor | FeatureType::HalogenAcceptor),
            |features, i, j, _| Self::classify(structure, features, i, j, params),
        );
        info!(accepted, "Halogen bond detection complete.");
    }
}
