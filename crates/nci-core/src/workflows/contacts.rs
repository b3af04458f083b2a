use crate::core::collections::BitSet;
use crate::core::io::report::{ContactRecord, ContactSummary};
use crate::core::models::system::MolecularSystem;
use crate::core::structure::selection::AtomSelection;
use crate::core::structure::{IndexedStructure, Structure};
use crate::engine::config::ContactParams;
use crate::engine::error::EngineError;
use crate::engine::interactions::contacts::FrozenContacts;
use crate::engine::interactions::pipeline::ContactPipeline;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Which contacts a report keeps, by the atoms of their two features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionFilter {
    #[default]
    All,
    /// At least one feature touches the selection.
    Either(AtomSelection),
    /// One feature touches the first selection and the other the second.
    Between(AtomSelection, AtomSelection),
}

impl SelectionFilter {
    /// Builds a filter from optional selection strings, as given on a command line.
    pub fn parse(selection: Option<&str>, partner: Option<&str>) -> Result<Self, EngineError> {
        Ok(match (selection, partner) {
            (None, None) => Self::All,
            (Some(s), None) | (None, Some(s)) => Self::Either(s.parse()?),
            (Some(s), Some(p)) => Self::Between(s.parse()?, p.parse()?),
        })
    }

    fn resolve(&self, structure: &dyn Structure) -> ResolvedFilter {
        match self {
            Self::All => ResolvedFilter::All,
            Self::Either(selection) => ResolvedFilter::Either(selection.resolve(structure)),
            Self::Between(first, second) => {
                ResolvedFilter::Between(first.resolve(structure), second.resolve(structure))
            }
        }
    }
}

enum ResolvedFilter {
    All,
    Either(BitSet),
    Between(BitSet, BitSet),
}

impl ResolvedFilter {
    fn keeps(&self, atoms1: &[usize], atoms2: &[usize]) -> bool {
        let touches = |set: &BitSet, atoms: &[usize]| atoms.iter().any(|&a| set.is_set(a));
        match self {
            Self::All => true,
            Self::Either(set) => touches(set, atoms1) || touches(set, atoms2),
            Self::Between(a, b) => {
                (touches(a, atoms1) && touches(b, atoms2))
                    || (touches(b, atoms1) && touches(a, atoms2))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContactReport {
    /// Reported contacts in ascending contact id.
    pub records: Vec<ContactRecord>,
    pub summary: ContactSummary,
    pub feature_count: usize,
    /// Contacts stored before refinement.
    pub stored_count: usize,
    /// Contacts still active after refinement, before type and selection filtering.
    pub active_count: usize,
}

/// Detects, refines and reports the non-covalent contacts of `system`.
///
/// Detection and refinement always cover every contact family; the enable
/// flags of `params` and `filter` only decide which active contacts are reported.
#[instrument(skip_all, name = "contacts_workflow")]
pub fn run(
    system: &MolecularSystem,
    params: &ContactParams,
    filter: &SelectionFilter,
    reporter: &ProgressReporter,
) -> Result<ContactReport, EngineError> {
    params.validate()?;

    let structure = IndexedStructure::new(system);
    let frozen = ContactPipeline::standard().run_with_progress(&structure, params, reporter);

    reporter.report(Progress::PhaseStart {
        name: "Collecting contacts",
    });
    let report = collect(&structure, &frozen, params, filter);
    reporter.report(Progress::Message(format!(
        "{} of {} active contacts reported",
        report.records.len(),
        report.active_count
    )));
    reporter.report(Progress::PhaseFinish);

    info!(
        reported = report.records.len(),
        active = report.active_count,
        stored = report.stored_count,
        "Contact workflow complete."
    );
    Ok(report)
}

fn collect(
    structure: &dyn Structure,
    frozen: &FrozenContacts,
    params: &ContactParams,
    filter: &SelectionFilter,
) -> ContactReport {
    let resolved = filter.resolve(structure);
    let features = &frozen.features;
    let records: Vec<ContactRecord> = frozen
        .active_contacts()
        .filter(|&c| params.is_enabled(frozen.store.contact_type(c)))
        .filter(|&c| {
            resolved.keeps(
                features.atoms(frozen.store.index1(c)),
                features.atoms(frozen.store.index2(c)),
            )
        })
        .map(|c| ContactRecord::from_contact(structure, frozen, c))
        .collect();
    let summary = records
        .iter()
        .map(|r| frozen.store.contact_type(r.contact_id))
        .collect();

    ContactReport {
        records,
        summary,
        feature_count: features.len(),
        stored_count: frozen.store.count(),
        active_count: frozen.active_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use crate::core::models::topology::BondOrder;
    use crate::engine::config::ConfigError;
    use crate::engine::interactions::contacts::ContactType;
    use crate::engine::interactions::test_support::SystemSketch;

    fn amide_pair() -> SystemSketch {
        let mut sketch = SystemSketch::new();
        sketch.residue('A', 1, "LIG");
        let n = sketch.atom("N1", Element::N, [0.0, 0.0, 0.0]);
        let h = sketch.atom("H1", Element::H, [0.9985, 0.0545, 0.0]);
        sketch.bond(n, h, BondOrder::Single);
        sketch.residue('B', 2, "LIG");
        let o = sketch.atom("O1", Element::O, [2.8, 0.0, 0.0]);
        let c = sketch.atom("C1", Element::C, [3.2207, 1.1558, 0.0]);
        sketch.bond(o, c, BondOrder::Double);
        sketch
    }

    fn report(params: &ContactParams, filter: &SelectionFilter) -> ContactReport {
        let sketch = amide_pair();
        run(&sketch.system, params, filter, &ProgressReporter::new()).unwrap()
    }

    #[test]
    fn reports_the_hydrogen_bond_with_summary() {
        let report = report(&ContactParams::default(), &SelectionFilter::All);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].label1, "A:LIG 1:N1");
        assert_eq!(report.records[0].label2, "B:LIG 2:O1");
        assert_eq!(report.summary.count(ContactType::HydrogenBond), 1);
        assert_eq!(report.summary.total(), 1);
        assert_eq!(report.active_count, 1);
    }

    #[test]
    fn enable_flags_only_filter_the_report() {
        let params = ContactParams {
            hydrogen_bond: false,
            ..ContactParams::default()
        };
        let report = report(&params, &SelectionFilter::All);
        assert!(report.records.is_empty());
        assert_eq!(report.active_count, 1);
    }

    #[test]
    fn selections_filter_by_feature_atoms() {
        let params = ContactParams::default();
        let either = SelectionFilter::parse(Some("chain:B"), None).unwrap();
        assert_eq!(report(&params, &either).records.len(), 1);

        let elsewhere = SelectionFilter::parse(Some("chain:C"), None).unwrap();
        assert!(report(&params, &elsewhere).records.is_empty());

        let between = SelectionFilter::parse(Some("chain:B"), Some("chain:A")).unwrap();
        assert_eq!(report(&params, &between).records.len(), 1);

        let same_side = SelectionFilter::parse(Some("chain:A"), Some("chain:A")).unwrap();
        assert!(report(&params, &same_side).records.is_empty());
    }

    #[test]
    fn malformed_selection_is_an_engine_error() {
        let err = SelectionFilter::parse(Some("colour:red"), None).unwrap_err();
        assert!(matches!(err, EngineError::Selection { .. }));
    }

    #[test]
    fn invalid_parameters_are_rejected_before_detection() {
        let params = ContactParams {
            max_metal_coordination: 0,
            ..ContactParams::default()
        };
        let sketch = amide_pair();
        let err = run(
            &sketch.system,
            &params,
            &SelectionFilter::All,
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config {
                source: ConfigError::InvalidParameter {
                    name: "max-metal-coordination",
                    ..
                }
            }
        ));
    }
}
