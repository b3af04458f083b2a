//! Refinement passes over frozen contacts.
//!
//! Every pass reads the frozen store through a [`ContactView`] and may only clear
//! bits of the [`ActiveSet`], so the number of active contacts never grows. Passes
//! walk features in ascending order and break ties by lower id, which makes each
//! of them deterministic and idempotent.

pub mod hydrophobic;
pub mod line_of_sight;
pub mod metal;
pub mod pi_stacking;
pub mod salt_bridges;

pub use hydrophobic::HydrophobicRedundancy;
pub use line_of_sight::LineOfSight;
pub use metal::MetalCoordinationLimit;
pub use pi_stacking::PiStackingRedundancy;
pub use salt_bridges::SaltBridges;

use super::contacts::{ActiveSet, ContactView};
use crate::core::structure::Structure;
use crate::engine::config::ContactParams;
use itertools::Itertools;
use std::collections::HashSet;

pub trait RefinementPass {
    fn name(&self) -> &'static str;

    fn is_enabled(&self, _params: &ContactParams) -> bool {
        true
    }

    /// Clears rejected contacts and returns how many were cleared.
    fn refine(
        &self,
        structure: &dyn Structure,
        view: &ContactView<'_>,
        active: &mut ActiveSet<'_>,
        params: &ContactParams,
    ) -> usize;
}

/// A ranked contact: grouping key, distance, tie-break id and contact id.
pub(crate) type Ranked<G> = (G, f64, usize, usize);

/// Keeps the first `keep` contacts of every group, ranked by distance, then the
/// tie-break id, then the contact id, and clears the rest.
pub(crate) fn keep_nearest<G: Ord + Copy>(
    active: &mut ActiveSet<'_>,
    mut candidates: Vec<Ranked<G>>,
    keep: usize,
) -> usize {
    candidates.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.cmp(&b.2))
            .then(a.3.cmp(&b.3))
    });
    let mut cleared = 0;
    for (_, group) in &candidates.iter().chunk_by(|c| c.0) {
        for &(_, _, _, contact) in group.skip(keep) {
            if active.reject(contact) {
                cleared += 1;
            }
        }
    }
    cleared
}

/// Unordered atom pairs joining the atoms of two features.
pub(crate) fn atom_pairs(view: &ContactView<'_>, contact: usize) -> Vec<(usize, usize)> {
    let atoms1 = view.features.atoms(view.store.index1(contact));
    let atoms2 = view.features.atoms(view.store.index2(contact));
    atoms1
        .iter()
        .cartesian_product(atoms2)
        .map(|(&a, &b)| (a.min(b), a.max(b)))
        .collect()
}

/// Active contacts of the features accepted by `relevant`, each listed once.
///
/// Walks the adjacency slices in ascending feature order and reports a contact
/// from the lower of its two features. Results are grouped by reporting feature.
pub(crate) fn active_contacts_of(
    view: &ContactView<'_>,
    active: &ActiveSet<'_>,
    relevant: impl Fn(usize) -> bool,
) -> Vec<usize> {
    let mut found = Vec::new();
    for feature in (0..view.features.len()).filter(|&f| relevant(f)) {
        for &contact in view.contacts_of(feature) {
            let other = view.partner(contact, feature);
            if active.is_active(contact) && (other > feature || !relevant(other)) {
                found.push(contact);
            }
        }
    }
    found
}

/// Clears every active contact accepted by `filter` whose atoms share a pair with `joined`.
///
/// Only contacts of features holding an atom of `joined` are visited.
pub(crate) fn clear_joined(
    view: &ContactView<'_>,
    active: &mut ActiveSet<'_>,
    joined: &HashSet<(usize, usize)>,
    filter: impl Fn(usize) -> bool,
) -> usize {
    let joined_atoms: HashSet<usize> = joined.iter().flat_map(|&(a, b)| [a, b]).collect();
    let touches_joined =
        |feature: usize| view.features.atoms(feature).iter().any(|a| joined_atoms.contains(a));
    let mut cleared = 0;
    for contact in active_contacts_of(view, active, touches_joined) {
        if !filter(contact) {
            continue;
        }
        let duplicate = atom_pairs(view, contact)
            .iter()
            .any(|pair| joined.contains(pair));
        if duplicate && active.reject(contact) {
            cleared += 1;
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::interactions::contacts::{ContactType, Contacts};
    use crate::engine::interactions::features::{FeatureGroup, FeatureType, Features};
    use nalgebra::Point3;

    #[test]
    fn keep_nearest_keeps_closest_per_group_and_breaks_ties_by_id() {
        let mut features = Features::new();
        for i in 0..5 {
            features.add(
                FeatureType::Hydrophobic,
                FeatureGroup::None,
                vec![i],
                Point3::new(i as f64, 0.0, 0.0),
            );
        }
        let mut contacts = Contacts::new(features, 4.0);
        for j in 1..5 {
            contacts.accept(0, j, ContactType::Hydrophobic);
        }
        let mut frozen = contacts.freeze();
        let (_, mut active) = frozen.split();

        // Groups: 'a' holds contacts 0 and 1, 'b' holds 2 and 3 at equal distance.
        let candidates = vec![
            ('a', 2.0, 2, 1),
            ('a', 1.0, 1, 0),
            ('b', 3.0, 4, 3),
            ('b', 3.0, 3, 2),
        ];
        assert_eq!(keep_nearest(&mut active, candidates.clone(), 1), 2);
        assert_eq!(active.active(), vec![0, 2]);
        assert_eq!(keep_nearest(&mut active, candidates, 1), 0);
        assert_eq!(active.count(), 2);
    }

    #[test]
    fn active_contacts_of_lists_each_contact_once_from_relevant_features() {
        let mut features = Features::new();
        for i in 0..5 {
            features.add(
                FeatureType::Hydrophobic,
                FeatureGroup::None,
                vec![i],
                Point3::new(i as f64, 0.0, 0.0),
            );
        }
        let mut contacts = Contacts::new(features, 4.0);
        for j in 1..5 {
            contacts.accept(0, j, ContactType::Hydrophobic);
        }
        contacts.accept(1, 2, ContactType::Hydrophobic);
        let mut frozen = contacts.freeze();
        let (view, mut active) = frozen.split();
        active.reject(1);

        assert_eq!(active_contacts_of(&view, &active, |_| true), vec![0, 2, 3, 4]);
        // Contact 0 is reached through feature 1 only; contact 4 is not repeated by feature 2.
        assert_eq!(
            active_contacts_of(&view, &active, |f| f == 1 || f == 2),
            vec![0, 4]
        );
        assert!(active_contacts_of(&view, &active, |f| f > 4).is_empty());
    }
}
