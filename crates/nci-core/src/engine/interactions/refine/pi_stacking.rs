use super::{RefinementPass, active_contacts_of, keep_nearest};
use crate::core::structure::Structure;
use crate::engine::config::ContactParams;
use crate::engine::interactions::contacts::{ActiveSet, ContactType, ContactView};
use crate::engine::interactions::features::FeatureType;
use tracing::instrument;

/// Keeps a single stacking contact per residue pair, so fused ring systems do
/// not report one contact per ring.
#[derive(Debug, Default, Clone, Copy)]
pub struct PiStackingRedundancy;

impl RefinementPass for PiStackingRedundancy {
    fn name(&self) -> &'static str {
        "pi-stacking redundancy"
    }

    #[instrument(skip_all, name = "pi_stacking_pass")]
    fn refine(
        &self,
        structure: &dyn Structure,
        view: &ContactView<'_>,
        active: &mut ActiveSet<'_>,
        _params: &ContactParams,
    ) -> usize {
        let residue_of =
            |feature: usize| structure.residue_index(view.features.anchor_atom(feature));
        let is_ring = |f: usize| view.features.feature_type(f) == FeatureType::AromaticRing;
        let candidates = active_contacts_of(view, active, is_ring)
            .into_iter()
            .filter(|&c| view.contact_type(c) == ContactType::PiStacking)
            .map(|c| {
                let r1 = residue_of(view.store.index1(c));
                let r2 = residue_of(view.store.index2(c));
                ((r1.min(r2), r1.max(r2)), view.distance(c), c, c)
            })
            .collect();
        keep_nearest(active, candidates, 1)
    }
}
