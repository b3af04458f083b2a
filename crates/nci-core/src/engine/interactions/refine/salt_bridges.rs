use super::{RefinementPass, active_contacts_of, atom_pairs, clear_joined, keep_nearest};
use crate::core::structure::Structure;
use crate::engine::config::ContactParams;
use crate::engine::interactions::contacts::{ActiveSet, ContactType, ContactView};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Resolves salt bridges.
///
/// A charged feature keeps only its nearest ionic partner, ties going to the
/// lower partner id. Hydrogen bonds between two atoms that already take part in
/// an active ionic contact are then cleared.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaltBridges;

impl RefinementPass for SaltBridges {
    fn name(&self) -> &'static str {
        "salt bridges"
    }

    fn is_enabled(&self, params: &ContactParams) -> bool {
        params.refine_salt_bridges
    }

    #[instrument(skip_all, name = "salt_bridge_pass")]
    fn refine(
        &self,
        _structure: &dyn Structure,
        view: &ContactView<'_>,
        active: &mut ActiveSet<'_>,
        _params: &ContactParams,
    ) -> usize {
        let is_ionic = |c: usize| view.contact_type(c) == ContactType::IonicInteraction;

        let mut cleared = 0;
        for feature in 0..view.features.len() {
            if !view.features.feature_type(feature).is_charge() {
                continue;
            }
            let candidates = view
                .contacts_of(feature)
                .iter()
                .filter(|&&c| active.is_active(c) && is_ionic(c))
                .map(|&c| (feature, view.distance(c), view.partner(c, feature), c))
                .collect();
            cleared += keep_nearest(active, candidates, 1);
        }
        debug!(cleared, "Ionic partners resolved.");

        let is_charge = |f: usize| view.features.feature_type(f).is_charge();
        let joined: HashSet<(usize, usize)> = active_contacts_of(view, active, is_charge)
            .into_iter()
            .filter(|&c| is_ionic(c))
            .flat_map(|c| atom_pairs(view, c))
            .collect();
        cleared += clear_joined(view, active, &joined, |c| {
            view.contact_type(c).is_hydrogen_bond()
        });
        cleared
    }
}
