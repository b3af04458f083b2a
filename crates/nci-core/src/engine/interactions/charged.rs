use super::contacts::{ContactType, Contacts};
use super::features::{FeatureGroup, FeatureProvider, FeatureType, Features};
use super::{Accepted, ContactDetector, oriented, scan_pairs};
use crate::core::chemistry::{residues, rings};
use crate::core::collections::BitSet;
use crate::core::models::element::Element;
use crate::core::models::topology::BondOrder;
use crate::core::structure::Structure;
use crate::core::utils::geometry;
use crate::engine::config::ContactParams;
use tracing::{debug, info, instrument};

/// Extra search radius around charge centers; group centers can sit up to this
/// far from the atoms that actually meet the ionic cutoff.
const IONIC_SEARCH_MARGIN: f64 = 2.0;

fn sidechain_members(structure: &dyn Structure, residue: usize, names: &[&str]) -> Vec<usize> {
    structure
        .residue_atoms(residue)
        .iter()
        .copied()
        .filter(|&a| names.contains(&structure.atom_name(a).trim()))
        .collect()
}

fn neighbors_with(structure: &dyn Structure, atom: usize, element: Element) -> Vec<usize> {
    structure
        .bonded_neighbors(atom)
        .iter()
        .copied()
        .filter(|&n| structure.element(n) == element)
        .collect()
}

/// Oxygens bonded to `atom` and to nothing else.
fn terminal_oxygens(structure: &dyn Structure, atom: usize) -> Vec<usize> {
    neighbors_with(structure, atom, Element::O)
        .into_iter()
        .filter(|&o| structure.bonded_neighbors(o).len() == 1)
        .collect()
}

fn positive_group(structure: &dyn Structure, atom: usize) -> Option<(FeatureGroup, Vec<usize>)> {
    let heavy = structure.heavy_degree(atom);
    match structure.element(atom) {
        Element::N if heavy == 4 => Some((FeatureGroup::QuaternaryAmine, vec![atom])),
        Element::S
            if heavy == 3 && structure.bonded_element_count(atom, Element::C) == 3 =>
        {
            Some((FeatureGroup::Sulfonium, vec![atom]))
        }
        Element::C if heavy == 3 => {
            let nitrogens = neighbors_with(structure, atom, Element::N);
            let aromatic = structure
                .bonded_neighbors(atom)
                .iter()
                .any(|&n| structure.bond_order(atom, n) == Some(BondOrder::Aromatic));
            if aromatic {
                return None;
            }
            let double_to_n = nitrogens
                .iter()
                .any(|&n| structure.bond_order(atom, n) == Some(BondOrder::Double));
            let mut members = vec![atom];
            members.extend(&nitrogens);
            match nitrogens.len() {
                3 => Some((FeatureGroup::Guanidine, members)),
                2 if double_to_n && structure.bonded_element_count(atom, Element::C) == 1 => {
                    Some((FeatureGroup::Acetamidine, members))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn negative_group(structure: &dyn Structure, atom: usize) -> Option<(FeatureGroup, Vec<usize>)> {
    let oxygens = terminal_oxygens(structure, atom);
    match structure.element(atom) {
        Element::C if structure.heavy_degree(atom) == 3 && oxygens.len() == 2 => {
            Some((FeatureGroup::Carboxylate, oxygens))
        }
        Element::P if oxygens.len() >= 2 => Some((FeatureGroup::Phosphate, oxygens)),
        Element::S
            if oxygens.len() >= 2 && structure.bonded_element_count(atom, Element::O) >= 3 =>
        {
            Some((FeatureGroup::Sulfate, oxygens))
        }
        _ => None,
    }
}

fn add_charge_group(
    structure: &dyn Structure,
    features: &mut Features,
    charged: &mut BitSet,
    feature_type: FeatureType,
    group: FeatureGroup,
    members: Vec<usize>,
) {
    if members.is_empty() {
        return;
    }
    for &atom in &members {
        charged.set(atom);
    }
    features.add_group(structure, feature_type, group, members);
}

/// Basic side chains, cationic ligand groups and positively charged atoms.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositiveCharges;

impl FeatureProvider for PositiveCharges {
    fn name(&self) -> &'static str {
        "positive charges"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        let mut charged = BitSet::new(structure.atom_count(), false);
        let kind = FeatureType::PositiveCharge;

        for residue in 0..structure.residue_count() {
            let name = structure.residue_name(residue);
            if let Some(names) = residues::positive_sidechain_atoms(name) {
                let group = if name.trim().eq_ignore_ascii_case("ARG") {
                    FeatureGroup::Guanidine
                } else {
                    FeatureGroup::None
                };
                let members = sidechain_members(structure, residue, names);
                add_charge_group(structure, features, &mut charged, kind, group, members);
            } else if !residues::is_polymer(name) {
                for &atom in structure.residue_atoms(residue) {
                    if charged.is_set(atom) {
                        continue;
                    }
                    if let Some((group, members)) = positive_group(structure, atom) {
                        add_charge_group(structure, features, &mut charged, kind, group, members);
                    }
                }
            }
        }

        for atom in 0..structure.atom_count() {
            if !charged.is_set(atom) && structure.formal_charge(atom) > 0 {
                features.add_atom(structure, kind, atom);
            }
        }
    }
}

/// Acidic side chains, terminal carboxylates, phosphates, anionic ligand groups
/// and negatively charged atoms.
#[derive(Debug, Default, Clone, Copy)]
pub struct NegativeCharges;

impl FeatureProvider for NegativeCharges {
    fn name(&self) -> &'static str {
        "negative charges"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        let mut charged = BitSet::new(structure.atom_count(), false);
        let kind = FeatureType::NegativeCharge;

        for residue in 0..structure.residue_count() {
            let name = structure.residue_name(residue);
            if let Some(names) = residues::negative_sidechain_atoms(name) {
                let members = sidechain_members(structure, residue, names);
                add_charge_group(
                    structure,
                    features,
                    &mut charged,
                    kind,
                    FeatureGroup::Carboxylate,
                    members,
                );
            }

            if residues::is_amino_acid(name) {
                let terminal = sidechain_members(structure, residue, &["OXT"]);
                if !terminal.is_empty() {
                    let members = sidechain_members(structure, residue, &["O", "OXT"]);
                    add_charge_group(
                        structure,
                        features,
                        &mut charged,
                        kind,
                        FeatureGroup::Carboxylate,
                        members,
                    );
                }
            } else if residues::is_nucleotide(name) {
                let members: Vec<usize> = structure
                    .residue_atoms(residue)
                    .iter()
                    .copied()
                    .filter(|&a| residues::is_phosphate_oxygen(structure.atom_name(a)))
                    .collect();
                add_charge_group(
                    structure,
                    features,
                    &mut charged,
                    kind,
                    FeatureGroup::Phosphate,
                    members,
                );
            } else {
                for &atom in structure.residue_atoms(residue) {
                    if let Some((group, members)) = negative_group(structure, atom) {
                        if members.iter().any(|&m| charged.is_set(m)) {
                            continue;
                        }
                        add_charge_group(structure, features, &mut charged, kind, group, members);
                    }
                }
            }
        }

        for atom in 0..structure.atom_count() {
            if !charged.is_set(atom) && structure.formal_charge(atom) < 0 {
                features.add_atom(structure, kind, atom);
            }
        }
    }
}

/// Aromatic five- and six-membered rings, one feature per ring.
#[derive(Debug, Default, Clone, Copy)]
pub struct AromaticRings;

impl FeatureProvider for AromaticRings {
    fn name(&self) -> &'static str {
        "aromatic rings"
    }

    fn add_features(&self, structure: &dyn Structure, features: &mut Features) {
        for residue in 0..structure.residue_count() {
            for ring in rings::aromatic_rings(structure, residue) {
                features.add_group(
                    structure,
                    FeatureType::AromaticRing,
                    FeatureGroup::None,
                    ring,
                );
            }
        }
    }
}

/// Ionic interactions, cation-pi interactions and pi-stacking.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChargedDetector;

impl ChargedDetector {
    fn ionic(
        structure: &dyn Structure,
        features: &Features,
        i: usize,
        j: usize,
        dist_sq: f64,
        params: &ContactParams,
    ) -> Option<Accepted> {
        let center_cutoff = params.max_ionic_dist + IONIC_SEARCH_MARGIN;
        if dist_sq > center_cutoff * center_cutoff {
            return None;
        }
        let cutoff_sq = params.max_ionic_dist * params.max_ionic_dist;
        let close = features.atoms(i).iter().any(|&a| {
            features.atoms(j).iter().any(|&b| {
                (structure.position(a) - structure.position(b)).norm_squared() <= cutoff_sq
            })
        });
        if !close {
            return None;
        }
        let (cation, anion) = oriented(features, i, j, |t| t == FeatureType::PositiveCharge);
        Some((cation, anion, ContactType::IonicInteraction))
    }

    fn pi_stacking(
        structure: &dyn Structure,
        features: &Features,
        i: usize,
        j: usize,
        dist_sq: f64,
        params: &ContactParams,
    ) -> Option<Accepted> {
        if dist_sq > params.max_pi_stacking_dist * params.max_pi_stacking_dist {
            return None;
        }
        let normal_i = features.normal(structure, i)?;
        let normal_j = features.normal(structure, j)?;
        let angle = geometry::vector_angle(&normal_i, &normal_j)?;
        let tolerance = params.max_pi_stacking_angle;
        let parallel = angle <= tolerance || angle >= 180.0 - tolerance;
        let t_shaped = (angle - 90.0).abs() <= tolerance;
        if !parallel && !t_shaped {
            return None;
        }

        let (center_i, center_j) = (features.center(i), features.center(j));
        let offset = geometry::lateral_offset(&center_j, &center_i, &normal_i)
            .min(geometry::lateral_offset(&center_i, &center_j, &normal_j));
        if offset > params.max_pi_stacking_offset {
            return None;
        }
        Some((i, j, ContactType::PiStacking))
    }

    fn cation_pi(
        structure: &dyn Structure,
        features: &Features,
        i: usize,
        j: usize,
        dist_sq: f64,
        params: &ContactParams,
    ) -> Option<Accepted> {
        if dist_sq > params.max_cation_pi_dist * params.max_cation_pi_dist {
            return None;
        }
        let (cation, ring) = oriented(features, i, j, |t| t == FeatureType::PositiveCharge);
        let normal = features.normal(structure, ring)?;
        let offset =
            geometry::lateral_offset(&features.center(cation), &features.center(ring), &normal);
        if offset > params.max_cation_pi_offset {
            return None;
        }
        Some((cation, ring, ContactType::CationPi))
    }
}

impl ContactDetector for ChargedDetector {
    fn name(&self) -> &'static str {
        "charged"
    }

    fn max_distance(&self, params: &ContactParams) -> f64 {
        (params.max_ionic_dist + IONIC_SEARCH_MARGIN)
            .max(params.max_pi_stacking_dist)
            .max(params.max_cation_pi_dist)
    }

    #[instrument(skip_all, name = "charged_detector")]
    fn detect(&self, structure: &dyn Structure, contacts: &mut Contacts, params: &ContactParams) {
        use FeatureType::{AromaticRing, NegativeCharge, PositiveCharge};

        let accepted = scan_pairs(
            structure,
            contacts,
            self.max_distance(params),
            params.master_model_index,
            |t| t.is_charge() || t == AromaticRing,
            |features, i, j, dist_sq| {
                match (features.feature_type(i), features.feature_type(j)) {
                    (PositiveCharge, NegativeCharge) | (NegativeCharge, PositiveCharge) => {
                        Self::ionic(structure, features, i, j, dist_sq, params)
                    }
                    (AromaticRing, AromaticRing) => {
                        Self::pi_stacking(structure, features, i, j, dist_sq, params)
                    }
                    (PositiveCharge, AromaticRing) | (AromaticRing, PositiveCharge) => {
                        Self::cation_pi(structure, features, i, j, dist_sq, params)
                    }
                    _ => None,
                }
            },
        );
        debug!(
            positive = contacts.features.count_of(PositiveCharge),
            negative = contacts.features.count_of(NegativeCharge),
            rings = contacts.features.count_of(AromaticRing),
            "Charged features scanned."
        );
        info!(accepted, "Charged contact detection complete.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::IndexedStructure;
    use crate::engine::interactions::test_support::SystemSketch;

    fn hexagon(sketch: &mut SystemSketch, center: [f64; 3], in_xz: bool) {
        let ids: Vec<_> = (0..6)
            .map(|k| {
                let t = k as f64 * std::f64::consts::PI / 3.0;
                let (u, v) = (1.39 * t.cos(), 1.39 * t.sin());
                let position = if in_xz {
                    [center[0] + u, center[1], center[2] + v]
                } else {
                    [center[0] + u, center[1] + v, center[2]]
                };
                sketch.atom(&format!("C{k}"), Element::C, position)
            })
            .collect();
        for k in 0..6 {
            sketch.bond(ids[k], ids[(k + 1) % 6], BondOrder::Aromatic);
        }
    }

    fn detect(sketch: &SystemSketch, providers: &[&dyn FeatureProvider]) -> Contacts {
        let view = IndexedStructure::new(&sketch.system);
        let mut features = Features::new();
        for provider in providers {
            provider.add_features(&view, &mut features);
        }
        let params = ContactParams::default();
        let mut contacts = Contacts::new(features, ChargedDetector.max_distance(&params));
        ChargedDetector.detect(&view, &mut contacts, &params);
        contacts
    }

    #[test]
    fn lysine_and_aspartate_form_one_ionic_interaction() {
        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "LYS");
        sketch.atom("NZ", Element::N, [0.0, 0.0, 0.0]);
        sketch.residue('A', 2, "ASP");
        sketch.atom("OD1", Element::O, [3.6, 1.1, 0.0]);
        sketch.atom("OD2", Element::O, [3.6, -1.1, 0.0]);

        let contacts = detect(&sketch, &[&PositiveCharges, &NegativeCharges]);
        assert_eq!(contacts.features.len(), 2);
        assert_eq!(contacts.features.atoms(1), &[1, 2]);
        assert_eq!(contacts.features.group(1), FeatureGroup::Carboxylate);
        assert_eq!(contacts.store.count(), 1);
        assert_eq!(contacts.store.contact_type(0), ContactType::IonicInteraction);
        assert_eq!(contacts.store.index1(0), 0);
        assert_eq!(contacts.feature_set.count(), 2);
    }

    #[test]
    fn distant_charges_do_not_interact() {
        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "LYS");
        sketch.atom("NZ", Element::N, [0.0, 0.0, 0.0]);
        sketch.residue('A', 2, "GLU");
        sketch.atom("OE1", Element::O, [6.5, 0.0, 0.0]);
        sketch.atom("OE2", Element::O, [7.5, 0.0, 0.0]);

        let contacts = detect(&sketch, &[&PositiveCharges, &NegativeCharges]);
        assert_eq!(contacts.store.count(), 0);
        assert_eq!(contacts.feature_set.count(), 0);
    }

    #[test]
    fn ligand_groups_and_formal_charges_become_features() {
        let mut sketch = SystemSketch::new();
        sketch.residue('L', 1, "LIG");
        let c = sketch.atom("C1", Element::C, [0.0, 0.0, 0.0]);
        let n1 = sketch.atom("N1", Element::N, [1.3, 0.0, 0.0]);
        let n2 = sketch.atom("N2", Element::N, [-0.65, 1.1, 0.0]);
        let n3 = sketch.atom("N3", Element::N, [-0.65, -1.1, 0.0]);
        sketch.bond(c, n1, BondOrder::Double);
        sketch.bond(c, n2, BondOrder::Single);
        sketch.bond(c, n3, BondOrder::Single);
        let cc = sketch.atom("C2", Element::C, [10.0, 0.0, 0.0]);
        let o1 = sketch.atom("O1", Element::O, [11.0, 0.8, 0.0]);
        let o2 = sketch.atom("O2", Element::O, [11.0, -0.8, 0.0]);
        let ca = sketch.atom("C3", Element::C, [8.6, 0.0, 0.0]);
        sketch.bond(cc, o1, BondOrder::Double);
        sketch.bond(cc, o2, BondOrder::Single);
        sketch.bond(cc, ca, BondOrder::Single);
        sketch.residue('L', 2, "NA");
        sketch.atom_with("NA", Element::NA, [20.0, 0.0, 0.0], |a| a.with_formal_charge(1));

        let view = IndexedStructure::new(&sketch.system);
        let mut features = Features::new();
        PositiveCharges.add_features(&view, &mut features);
        NegativeCharges.add_features(&view, &mut features);

        assert_eq!(features.len(), 3);
        assert_eq!(features.group(0), FeatureGroup::Guanidine);
        assert_eq!(features.atoms(0), &[0, 1, 2, 3]);
        assert_eq!(features.feature_type(1), FeatureType::PositiveCharge);
        assert_eq!(features.atoms(1), &[8]);
        assert_eq!(features.group(2), FeatureGroup::Carboxylate);
        assert_eq!(features.atoms(2), &[5, 6]);
    }

    #[test]
    fn parallel_rings_stack_and_tilted_rings_do_not() {
        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "PHE");
        hexagon(&mut sketch, [0.0, 0.0, 0.0], false);
        sketch.residue('A', 2, "PHE");
        hexagon(&mut sketch, [1.0, 0.0, 3.6], false);
        let contacts = detect(&sketch, &[&AromaticRings]);
        assert_eq!(contacts.features.count_of(FeatureType::AromaticRing), 2);
        assert_eq!(contacts.store.count(), 1);
        assert_eq!(contacts.store.contact_type(0), ContactType::PiStacking);

        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "PHE");
        hexagon(&mut sketch, [0.0, 0.0, 0.0], false);
        sketch.residue('A', 2, "PHE");
        // Perpendicular ring directly above the first: T-shaped.
        hexagon(&mut sketch, [0.0, 0.0, 5.0], true);
        let contacts = detect(&sketch, &[&AromaticRings]);
        assert_eq!(contacts.store.count(), 1);

        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "PHE");
        hexagon(&mut sketch, [0.0, 0.0, 0.0], false);
        sketch.residue('A', 2, "PHE");
        // Parallel but slipped far beyond the offset limit.
        hexagon(&mut sketch, [4.0, 0.0, 3.4], false);
        let contacts = detect(&sketch, &[&AromaticRings]);
        assert_eq!(contacts.store.count(), 0);
    }

    #[test]
    fn cation_over_ring_face_is_cation_pi() {
        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "TRP");
        hexagon(&mut sketch, [0.0, 0.0, 0.0], false);
        sketch.residue('A', 2, "LYS");
        sketch.atom("NZ", Element::N, [0.5, 0.3, 4.0]);
        sketch.residue('A', 3, "LYS");
        sketch.atom("NZ", Element::N, [4.5, 0.0, 1.0]);

        let contacts = detect(&sketch, &[&PositiveCharges, &AromaticRings]);
        assert_eq!(contacts.store.count(), 1);
        assert_eq!(contacts.store.contact_type(0), ContactType::CationPi);
        let cation = contacts.store.index1(0);
        assert_eq!(
            contacts.features.feature_type(cation),
            FeatureType::PositiveCharge
        );
        assert_eq!(contacts.features.atoms(cation), &[6]);
    }
}
