use super::ContactDetector;
use super::charged::{AromaticRings, ChargedDetector, NegativeCharges, PositiveCharges};
use super::contacts::{Contacts, FrozenContacts};
use super::features::{FeatureProvider, Features};
use super::halogen_bonds::{HalogenAcceptors, HalogenBondDetector, HalogenDonors};
use super::hydrogen_bonds::{
    HydrogenAcceptors, HydrogenBondDetector, HydrogenDonors, WeakHydrogenDonors,
};
use super::hydrophobic::{HydrophobicAtoms, HydrophobicDetector};
use super::metal_binding::{MetalBindingPartners, MetalCoordinationDetector, Metals};
use super::refine::{
    HydrophobicRedundancy, LineOfSight, MetalCoordinationLimit, PiStackingRedundancy,
    RefinementPass, SaltBridges,
};
use crate::core::structure::Structure;
use crate::engine::config::ContactParams;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fmt;
use tracing::{debug, info, instrument};

/// Lifecycle of one contact calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Empty,
    FeaturesBuilt,
    ContactsPopulated,
    Frozen,
    Refined,
    Done,
}

impl PipelineStage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::FeaturesBuilt => "features built",
            Self::ContactsPopulated => "contacts populated",
            Self::Frozen => "frozen",
            Self::Refined => "refined",
            Self::Done => "done",
        }
    }

    /// Progress label of the phase that ends in this stage.
    fn phase(self) -> &'static str {
        match self {
            Self::Empty => "Starting",
            Self::FeaturesBuilt => "Extracting features",
            Self::ContactsPopulated => "Detecting contacts",
            Self::Frozen => "Freezing contacts",
            Self::Refined => "Refining contacts",
            Self::Done => "Finishing",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Provider = Box<dyn FeatureProvider + Send + Sync>;
type Detector = Box<dyn ContactDetector + Send + Sync>;
type Pass = Box<dyn RefinementPass + Send + Sync>;

/// Ordered feature providers, detectors and refinement passes.
///
/// Every call to [`run`](Self::run) builds fresh features, a fresh spatial index
/// and a fresh store, and hands the frozen, refined result to the caller.
/// Providers, detectors and passes run in the order they were added.
#[derive(Default)]
pub struct ContactPipeline {
    providers: Vec<Provider>,
    detectors: Vec<Detector>,
    passes: Vec<Pass>,
}

impl ContactPipeline {
    /// An empty pipeline; add stages with the `with_*` methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// All feature providers, detectors and refinement passes in their standard order.
    pub fn standard() -> Self {
        Self::new()
            .with_provider(PositiveCharges)
            .with_provider(NegativeCharges)
            .with_provider(AromaticRings)
            .with_provider(HydrogenAcceptors)
            .with_provider(HydrogenDonors)
            .with_provider(WeakHydrogenDonors)
            .with_provider(MetalBindingPartners)
            .with_provider(Metals)
            .with_provider(HydrophobicAtoms)
            .with_provider(HalogenAcceptors)
            .with_provider(HalogenDonors)
            .with_detector(ChargedDetector)
            .with_detector(HydrogenBondDetector)
            .with_detector(MetalCoordinationDetector)
            .with_detector(HydrophobicDetector)
            .with_detector(HalogenBondDetector)
            .with_pass(LineOfSight)
            .with_pass(HydrophobicRedundancy)
            .with_pass(SaltBridges)
            .with_pass(PiStackingRedundancy)
            .with_pass(MetalCoordinationLimit)
    }

    pub fn with_provider(mut self, provider: impl FeatureProvider + Send + Sync + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn with_detector(mut self, detector: impl ContactDetector + Send + Sync + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    pub fn with_pass(mut self, pass: impl RefinementPass + Send + Sync + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Cell size of the feature spatial index: the largest cutoff any detector queries.
    pub fn cell_size(&self, params: &ContactParams) -> f64 {
        let largest = self
            .detectors
            .iter()
            .map(|d| d.max_distance(params))
            .fold(0.0, f64::max);
        if largest > 0.0 { largest } else { 1.0 }
    }

    #[instrument(skip_all, name = "feature_extraction")]
    pub fn calculate_features(&self, structure: &dyn Structure) -> Features {
        let mut features = Features::new();
        for provider in &self.providers {
            let before = features.len();
            provider.add_features(structure, &mut features);
            debug!(
                provider = provider.name(),
                added = features.len() - before,
                "Features added."
            );
        }
        info!(
            atoms = structure.atom_count(),
            features = features.len(),
            "Feature extraction complete."
        );
        features
    }

    #[instrument(skip_all, name = "contact_detection")]
    pub fn detect(
        &self,
        structure: &dyn Structure,
        features: Features,
        params: &ContactParams,
    ) -> Contacts {
        let mut contacts = Contacts::new(features, self.cell_size(params));
        for detector in &self.detectors {
            let before = contacts.store.count();
            detector.detect(structure, &mut contacts, params);
            debug!(
                detector = detector.name(),
                accepted = contacts.store.count() - before,
                "Detector finished."
            );
        }
        info!(
            contacts = contacts.store.count(),
            features_in_contact = contacts.feature_set.count(),
            "Contact detection complete."
        );
        contacts
    }

    /// Runs every enabled pass on `frozen` and returns the number of cleared contacts.
    #[instrument(skip_all, name = "contact_refinement")]
    pub fn refine(
        &self,
        structure: &dyn Structure,
        frozen: &mut FrozenContacts,
        params: &ContactParams,
    ) -> usize {
        let (view, mut active) = frozen.split();
        let mut cleared = 0;
        for pass in &self.passes {
            if !pass.is_enabled(params) {
                debug!(pass = pass.name(), "Refinement pass disabled.");
                continue;
            }
            let pass_cleared = pass.refine(structure, &view, &mut active, params);
            info!(
                pass = pass.name(),
                cleared = pass_cleared,
                remaining = active.count(),
                "Refinement pass complete."
            );
            cleared += pass_cleared;
        }
        cleared
    }

    pub fn run(&self, structure: &dyn Structure, params: &ContactParams) -> FrozenContacts {
        self.run_with_progress(structure, params, &ProgressReporter::new())
    }

    /// Runs the whole calculation, reporting one phase per stage transition.
    #[instrument(skip_all, name = "contact_pipeline")]
    pub fn run_with_progress(
        &self,
        structure: &dyn Structure,
        params: &ContactParams,
        reporter: &ProgressReporter,
    ) -> FrozenContacts {
        let mut stage = PipelineStage::Empty;
        let features = advance(reporter, &mut stage, PipelineStage::FeaturesBuilt, || {
            self.calculate_features(structure)
        });
        let contacts = advance(reporter, &mut stage, PipelineStage::ContactsPopulated, || {
            self.detect(structure, features, params)
        });
        let mut frozen = advance(reporter, &mut stage, PipelineStage::Frozen, || contacts.freeze());
        let cleared = advance(reporter, &mut stage, PipelineStage::Refined, || {
            self.refine(structure, &mut frozen, params)
        });
        stage = PipelineStage::Done;
        info!(
            %stage,
            stored = frozen.store.count(),
            cleared,
            active = frozen.active_count(),
            "Contact calculation complete."
        );
        frozen
    }
}

fn advance<T>(
    reporter: &ProgressReporter,
    stage: &mut PipelineStage,
    next: PipelineStage,
    work: impl FnOnce() -> T,
) -> T {
    reporter.report(Progress::PhaseStart { name: next.phase() });
    let output = work();
    reporter.report(Progress::PhaseFinish);
    debug!(from = %stage, to = %next, "Pipeline stage reached.");
    *stage = next;
    output
}

/// Runs the standard pipeline.
pub fn calculate_contacts(structure: &dyn Structure, params: &ContactParams) -> FrozenContacts {
    ContactPipeline::standard().run(structure, params)
}
