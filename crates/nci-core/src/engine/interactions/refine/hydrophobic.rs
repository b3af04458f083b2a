use super::{RefinementPass, keep_nearest};
use crate::core::structure::Structure;
use crate::engine::config::ContactParams;
use crate::engine::interactions::contacts::{ActiveSet, ContactType, ContactView};
use tracing::instrument;

/// Keeps one hydrophobic contact per feature and partner residue, the shortest.
#[derive(Debug, Default, Clone, Copy)]
pub struct HydrophobicRedundancy;

impl RefinementPass for HydrophobicRedundancy {
    fn name(&self) -> &'static str {
        "hydrophobic redundancy"
    }

    #[instrument(skip_all, name = "hydrophobic_pass")]
    fn refine(
        &self,
        structure: &dyn Structure,
        view: &ContactView<'_>,
        active: &mut ActiveSet<'_>,
        _params: &ContactParams,
    ) -> usize {
        let mut cleared = 0;
        for feature in 0..view.features.len() {
            let candidates = view
                .contacts_of(feature)
                .iter()
                .filter(|&&c| {
                    active.is_active(c) && view.contact_type(c) == ContactType::Hydrophobic
                })
                .map(|&c| {
                    let partner = view.partner(c, feature);
                    let residue = structure.residue_index(view.features.anchor_atom(partner));
                    (residue, view.distance(c), c, c)
                })
                .collect();
            cleared += keep_nearest(active, candidates, 1);
        }
        cleared
    }
}
