//! # Interactions Module
//!
//! Feature extraction, contact detection and refinement.
//!
//! ## Overview
//!
//! Detection runs in three steps. [`FeatureProvider`](features::FeatureProvider)s scan
//! a structure and append typed [`Features`](features::Features). Every
//! [`ContactDetector`] then queries the feature spatial index around each feature,
//! validates candidate pairs and appends accepted ones to the
//! [`ContactStore`](contacts::ContactStore). After freezing, every
//! [`RefinementPass`](refine::RefinementPass) clears contact bits it considers
//! redundant or implausible.
//!
//! ## Families
//!
//! - [`charged`] - Ionic interactions, cation-pi and pi-stacking
//! - [`hydrogen_bonds`] - Normal, weak, water and backbone hydrogen bonds
//! - [`halogen_bonds`] - Halogen bonds from Cl, Br, I and At donors
//! - [`hydrophobic`] - Hydrophobic contacts
//! - [`metal_binding`] - Metal coordination

pub mod charged;
pub mod contacts;
pub mod features;
pub mod halogen_bonds;
pub mod hydrogen_bonds;
pub mod hydrophobic;
pub mod metal_binding;
pub mod pipeline;
pub mod refine;

use crate::core::structure::Structure;
use crate::engine::config::ContactParams;
use contacts::{ContactType, Contacts, invalid_atom_contact};
use features::{FeatureType, Features};

/// Finds the contacts of one interaction family.
pub trait ContactDetector {
    fn name(&self) -> &'static str;

    /// Largest center-to-center distance this detector queries.
    fn max_distance(&self, params: &ContactParams) -> f64;

    fn detect(&self, structure: &dyn Structure, contacts: &mut Contacts, params: &ContactParams);
}

/// An accepted pair, ordered as it is stored: donor, cation or metal first.
pub(crate) type Accepted = (usize, usize, ContactType);

/// Visits every unordered pair of features within `radius` of each other.
///
/// Pairs are visited as `(i, j)` with `i < j`, in ascending order of `i` and then
/// `j`, so the result does not depend on the layout of the spatial index. Both
/// features must pass `relevant`, and the pair must pass the atom-level model,
/// residue and altloc check on the first atom of each feature before `classify`
/// sees it with the squared center distance. Returns the number of accepted pairs.
pub(crate) fn scan_pairs(
    structure: &dyn Structure,
    contacts: &mut Contacts,
    radius: f64,
    master_model: Option<usize>,
    relevant: impl Fn(FeatureType) -> bool,
    mut classify: impl FnMut(&Features, usize, usize, f64) -> Option<Accepted>,
) -> usize {
    let Contacts {
        features,
        spatial_index,
        store,
        feature_set,
    } = contacts;

    let mut accepted = 0;
    let mut hits = Vec::new();
    for i in 0..features.len() {
        if !relevant(features.feature_type(i)) {
            continue;
        }
        hits.clear();
        spatial_index.each_within(&features.center(i), radius, |j, dist_sq| {
            if j > i {
                hits.push((j, dist_sq));
            }
        });
        hits.sort_unstable_by_key(|&(j, _)| j);

        for &(j, dist_sq) in &hits {
            if !relevant(features.feature_type(j)) {
                continue;
            }
            if invalid_atom_contact(
                structure,
                features.anchor_atom(i),
                features.anchor_atom(j),
                master_model,
            ) {
                continue;
            }
            if let Some((first, second, contact_type)) = classify(features, i, j, dist_sq) {
                feature_set.set_pair(first, second);
                store.add_contact(first, second, contact_type);
                accepted += 1;
            }
        }
    }
    accepted
}

/// Orders a pair so the feature matching `is_first` comes first.
pub(crate) fn oriented(
    features: &Features,
    i: usize,
    j: usize,
    is_first: impl Fn(FeatureType) -> bool,
) -> (usize, usize) {
    if is_first(features.feature_type(i)) {
        (i, j)
    } else {
        (j, i)
    }
}
