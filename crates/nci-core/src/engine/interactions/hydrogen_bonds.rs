use super::contacts::{ContactType, Contacts};
use super::features::{FeatureProvider, FeatureType, Features};
use super::{Accepted, ContactDetector, scan_pairs};
use crate::core::chemistry::valence::{self, Geometry};
use crate::core::chemistry::{residues, rings};
use crate::core::collections::BitSet;
use crate::core::models::element::Element;
use crate::core::structure::Structure;
use crate::core::utils::geometry;
use crate::engine::config::ContactParams;
use nalgebra::Point3;
use tracing::{info, instrument, trace};

/// Ideal angle assumed for atoms whose geometry gives none.
const FALLBACK_IDEAL_ANGLE: f64 = 120.0;

fn is_acceptor(structure: &dyn Structure, atom: usize) -> bool {
    let residue_name = structure.atom_residue_name(atom);
    match structure.element(atom) {
        Element::O => true,
        Element::N => {
            if residues::is_histidine_ring_nitrogen(residue_name, structure.atom_name(atom)) {
                return true;
            }
            let conjugated = structure.heavy_degree(atom) == 3
                && valence::geometry(structure, atom) == Geometry::Trigonal;
            structure.formal_charge(atom) <= 0
                && valence::total_hydrogen_count(structure, atom) == 0
                && structure.bonded_neighbors(atom).len() < 4
                && !conjugated
        }
        Element::S => {
            let residue_name = residue_name.trim();
            residue_name.eq_ignore_ascii_case("MET")
                || residue_name.eq_ignore_ascii_case("CYS")
                || structure.formal_charge(atom) < 0
        }
        _ => false,
    }
}

fn is_donor(structure: &dyn Structure, atom: usize) -> bool {
    match structure.element(atom) {
        Element::N => {
            residues::is_histidine_ring_nitrogen(
                structure.atom_residue_name(atom),
                structure.atom_name(atom),
            ) || valence::total_hydrogen_count(structure, atom) > 0
        }
        Element::O | Element::S => valence::total_hydrogen_count(structure, atom) > 0,
        _ => false,
    }
}

/// Oxygens, lone-pair nitrogens, histidine ring nitrogens and thioether or
/// thiolate sulfurs.
#[derive(Debug, Default, Clone, Copy)]
pub struct HydrogenAcceptors;

impl FeatureProvider for HydrogenAcceptors {
    fn name(&self) -> &'static str {
        "hydrogen bond acceptors"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        for atom in 0..structure.atom_count() {
            if is_acceptor(structure, atom) {
                features.add_atom(structure, FeatureType::HydrogenAcceptor, atom);
            }
        }
    }
}

/// N, O and S atoms carrying at least one hydrogen, plus histidine ring nitrogens.
#[derive(Debug, Default, Clone, Copy)]
pub struct HydrogenDonors;

impl FeatureProvider for HydrogenDonors {
    fn name(&self) -> &'static str {
        "hydrogen bond donors"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        for atom in 0..structure.atom_count() {
            if is_donor(structure, atom) {
                features.add_atom(structure, FeatureType::HydrogenDonor, atom);
            }
        }
    }
}

/// Carbons carrying hydrogens that are polarized by a bonded N or O, or by an
/// N or O in the same aromatic ring.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeakHydrogenDonors;

impl WeakHydrogenDonors {
    fn polarized_ring_carbons(structure: &dyn Structure) -> BitSet {
        let mut marked = BitSet::new(structure.atom_count(), false);
        for residue in 0..structure.residue_count() {
            for ring in rings::aromatic_rings(structure, residue) {
                let electronegative = ring
                    .iter()
                    .any(|&a| matches!(structure.element(a), Element::N | Element::O));
                if electronegative {
                    for &atom in &ring {
                        marked.set(atom);
                    }
                }
            }
        }
        marked
    }
}

impl FeatureProvider for WeakHydrogenDonors {
    fn name(&self) -> &'static str {
        "weak hydrogen bond donors"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        let ring_carbons = Self::polarized_ring_carbons(structure);
        for atom in 0..structure.atom_count() {
            if structure.element(atom) != Element::C
                || valence::total_hydrogen_count(structure, atom) == 0
            {
                continue;
            }
            let polarized = structure.bonded_element_count(atom, Element::N) > 0
                || structure.bonded_element_count(atom, Element::O) > 0
                || ring_carbons.is_set(atom);
            if polarized {
                features.add_atom(structure, FeatureType::WeakHydrogenDonor, atom);
            }
        }
    }
}

fn ideal_angle(geometry: Geometry) -> f64 {
    geometry.ideal_angle().unwrap_or(FALLBACK_IDEAL_ANGLE)
}

/// Whether `target` lies close enough to the plane of a trigonal center.
fn within_plane(
    structure: &dyn Structure,
    center: usize,
    neighbors: &[usize],
    target: &Point3<f64>,
    max_angle: f64,
) -> bool {
    let [first, second, ..] = neighbors else {
        return true;
    };
    let origin = structure.position(center);
    let Some(normal) = geometry::triangle_normal(
        &origin,
        &structure.position(*first),
        &structure.position(*second),
    ) else {
        return false;
    };
    geometry::out_of_plane_angle(&normal, &origin, target).is_some_and(|angle| angle <= max_angle)
}

fn donor_geometry_ok(
    structure: &dyn Structure,
    donor: usize,
    acceptor: usize,
    params: &ContactParams,
) -> bool {
    let donor_pos = structure.position(donor);
    let acceptor_pos = structure.position(acceptor);
    let (hydrogens, heavy): (Vec<usize>, Vec<usize>) = structure
        .bonded_neighbors(donor)
        .iter()
        .partition(|&&n| structure.element(n).is_hydrogen());

    if !hydrogens.is_empty() {
        let best = hydrogens
            .iter()
            .filter_map(|&h| geometry::angle(&donor_pos, &structure.position(h), &acceptor_pos))
            .reduce(f64::max);
        return best.is_some_and(|angle| 180.0 - angle <= params.max_hbond_don_angle);
    }

    if heavy.is_empty() {
        return structure.is_water(donor);
    }
    let donor_geometry = valence::geometry(structure, donor);
    let ideal = ideal_angle(donor_geometry);
    let angles_ok = heavy.iter().all(|&n| {
        geometry::angle(&structure.position(n), &donor_pos, &acceptor_pos)
            .is_some_and(|angle| (ideal - angle).abs() <= params.max_hbond_don_angle)
    });
    if !angles_ok {
        return false;
    }
    donor_geometry != Geometry::Trigonal
        || within_plane(
            structure,
            donor,
            &heavy,
            &acceptor_pos,
            params.max_hbond_don_plane_angle,
        )
}

fn acceptor_geometry_ok(
    structure: &dyn Structure,
    acceptor: usize,
    donor: usize,
    params: &ContactParams,
) -> bool {
    let neighbors = structure.bonded_neighbors(acceptor);
    if neighbors.is_empty() {
        return structure.is_water(acceptor);
    }
    let acceptor_pos = structure.position(acceptor);
    let donor_pos = structure.position(donor);
    let acceptor_geometry = valence::geometry(structure, acceptor);
    let ideal = ideal_angle(acceptor_geometry);
    // Wide acceptor angles are not penalized.
    let angles_ok = neighbors.iter().all(|&n| {
        geometry::angle(&structure.position(n), &acceptor_pos, &donor_pos)
            .is_some_and(|angle| ideal - angle <= params.max_hbond_acc_angle)
    });
    if !angles_ok {
        return false;
    }
    acceptor_geometry != Geometry::Trigonal
        || within_plane(
            structure,
            acceptor,
            neighbors,
            &donor_pos,
            params.max_hbond_acc_plane_angle,
        )
}

fn is_any_donor(feature_type: FeatureType) -> bool {
    matches!(
        feature_type,
        FeatureType::HydrogenDonor | FeatureType::WeakHydrogenDonor
    )
}

/// Hydrogen bonds between donor and acceptor atoms, typed as water, backbone,
/// weak or normal.
#[derive(Debug, Default, Clone, Copy)]
pub struct HydrogenBondDetector;

impl HydrogenBondDetector {
    fn classify(
        structure: &dyn Structure,
        features: &Features,
        i: usize,
        j: usize,
        dist_sq: f64,
        params: &ContactParams,
    ) -> Option<Accepted> {
        let (ti, tj) = (features.feature_type(i), features.feature_type(j));
        let (donor_feature, acceptor_feature) =
            if is_any_donor(ti) && tj == FeatureType::HydrogenAcceptor {
                (i, j)
            } else if ti == FeatureType::HydrogenAcceptor && is_any_donor(tj) {
                (j, i)
            } else {
                return None;
            };
        let donor = features.anchor_atom(donor_feature);
        let acceptor = features.anchor_atom(acceptor_feature);

        if donor == acceptor || structure.is_bonded(donor, acceptor) {
            return None;
        }
        let donor_water = structure.is_water(donor);
        let acceptor_water = structure.is_water(acceptor);
        if donor_water && acceptor_water {
            return None;
        }

        let sulfur =
            structure.element(donor) == Element::S || structure.element(acceptor) == Element::S;
        let cutoff = if sulfur {
            params.max_hbond_sulfur_dist
        } else {
            params.max_hbond_dist
        };
        if dist_sq > cutoff * cutoff {
            return None;
        }

        if !donor_geometry_ok(structure, donor, acceptor, params)
            || !acceptor_geometry_ok(structure, acceptor, donor, params)
        {
            trace!(donor, acceptor, "Hydrogen bond rejected by angle checks.");
            return None;
        }

        let contact_type = if donor_water || acceptor_water {
            ContactType::WaterHydrogenBond
        } else if structure.is_backbone(donor) && structure.is_backbone(acceptor) {
            ContactType::BackboneHydrogenBond
        } else if features.feature_type(donor_feature) == FeatureType::WeakHydrogenDonor {
            ContactType::WeakHydrogenBond
        } else {
            ContactType::HydrogenBond
        };
        Some((donor_feature, acceptor_feature, contact_type))
    }
}

impl ContactDetector for HydrogenBondDetector {
    fn name(&self) -> &'static str {
        "hydrogen bonds"
    }

    fn max_distance(&self, params: &ContactParams) -> f64 {
        params.max_hbond_dist.max(params.max_hbond_sulfur_dist)
    }

    #[instrument(skip_all, name = "hydrogen_bond_detector")]
    fn detect(&self, structure: &dyn Structure, contacts: &mut Contacts, params: &ContactParams) {
        let accepted = scan_pairs(
            structure,
            contacts,
            self.max_distance(params),
            params.master_model_index,
            |t| is_any_donor(t) || t == FeatureType::HydrogenAcceptor,
            |features, i, j, dist_sq| Self::classify(structure, features, i, j, dist_sq, params),
        );
        info!(accepted, "Hydrogen bond detection complete.");
    }
}
