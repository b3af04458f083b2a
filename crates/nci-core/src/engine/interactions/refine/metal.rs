use super::{RefinementPass, active_contacts_of, atom_pairs, clear_joined, keep_nearest};
use crate::core::structure::Structure;
use crate::engine::config::ContactParams;
use crate::engine::interactions::contacts::{ActiveSet, ContactType, ContactView};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Limits every metal to `max_metal_coordination` partners, nearest first with
/// ties going to the lower partner id, then clears ionic contacts that repeat an
/// active coordination between the same atoms.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetalCoordinationLimit;

impl RefinementPass for MetalCoordinationLimit {
    fn name(&self) -> &'static str {
        "metal coordination"
    }

    #[instrument(skip_all, name = "metal_coordination_pass")]
    fn refine(
        &self,
        _structure: &dyn Structure,
        view: &ContactView<'_>,
        active: &mut ActiveSet<'_>,
        params: &ContactParams,
    ) -> usize {
        let is_coordination = |c: usize| view.contact_type(c) == ContactType::MetalCoordination;

        let mut cleared = 0;
        for metal in 0..view.features.len() {
            if !view.features.feature_type(metal).is_metal() {
                continue;
            }
            let candidates = view
                .contacts_of(metal)
                .iter()
                .filter(|&&c| active.is_active(c) && is_coordination(c))
                .map(|&c| (metal, view.distance(c), view.partner(c, metal), c))
                .collect();
            cleared += keep_nearest(active, candidates, params.max_metal_coordination);
        }
        debug!(cleared, "Coordination limits applied.");

        let is_metal = |f: usize| view.features.feature_type(f).is_metal();
        let coordinated: HashSet<(usize, usize)> = active_contacts_of(view, active, is_metal)
            .into_iter()
            .filter(|&c| is_coordination(c))
            .flat_map(|c| atom_pairs(view, c))
            .collect();
        cleared += clear_joined(view, active, &coordinated, |c| {
            view.contact_type(c) == ContactType::IonicInteraction
        });
        cleared
    }
}
