use super::{RefinementPass, active_contacts_of};
use crate::core::collections::SpatialIndex;
use crate::core::models::element::MAX_VDW_RADIUS;
use crate::core::structure::Structure;
use crate::core::utils::geometry;
use crate::engine::config::ContactParams;
use crate::engine::interactions::contacts::{ActiveSet, ContactView};
use nalgebra::{Point3, center};
use tracing::{instrument, trace};

/// Clears contacts whose center-to-center segment passes through another heavy atom.
///
/// An atom obstructs a contact when it lies within its scaled van der Waals radius
/// of the segment while being farther than that radius from both ends. Atoms of
/// the two features themselves never obstruct.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineOfSight;

impl LineOfSight {
    fn is_obstructed(
        structure: &dyn Structure,
        atoms: &SpatialIndex,
        view: &ContactView<'_>,
        contact: usize,
        factor: f64,
    ) -> bool {
        let (feature1, feature2) = (view.store.index1(contact), view.store.index2(contact));
        let start = view.features.center(feature1);
        let end = view.features.center(feature2);
        let own = |atom: usize| {
            view.features.atoms(feature1).contains(&atom)
                || view.features.atoms(feature2).contains(&atom)
        };
        let radius = (end - start).norm() / 2.0 + MAX_VDW_RADIUS * factor;

        let mut obstructed = false;
        atoms.each_within(&center(&start, &end), radius, |atom, _| {
            if obstructed || own(atom) {
                return;
            }
            let element = structure.element(atom);
            if element.is_hydrogen() {
                return;
            }
            let vdw = element.vdw_radius() * factor;
            let position = structure.position(atom);
            if (position - start).norm() > vdw
                && (position - end).norm() > vdw
                && geometry::point_segment_distance(&position, &start, &end) < vdw
            {
                trace!(contact, atom, "Line of sight blocked.");
                obstructed = true;
            }
        });
        obstructed
    }
}

impl RefinementPass for LineOfSight {
    fn name(&self) -> &'static str {
        "line of sight"
    }

    #[instrument(skip_all, name = "line_of_sight_pass")]
    fn refine(
        &self,
        structure: &dyn Structure,
        view: &ContactView<'_>,
        active: &mut ActiveSet<'_>,
        params: &ContactParams,
    ) -> usize {
        if active.count() == 0 {
            return 0;
        }
        let factor = params.line_of_sight_dist_factor;
        let positions: Vec<Point3<f64>> = (0..structure.atom_count())
            .map(|atom| structure.position(atom))
            .collect();
        let atoms = SpatialIndex::new(positions, (MAX_VDW_RADIUS * factor).max(1.0));

        let mut cleared = 0;
        for contact in active_contacts_of(view, active, |_| true) {
            let obstructed = Self::is_obstructed(structure, &atoms, view, contact, factor);
            if obstructed && active.reject(contact) {
                cleared += 1;
            }
        }
        cleared
    }
}
