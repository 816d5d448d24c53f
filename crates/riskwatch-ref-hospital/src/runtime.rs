//! Wiring of the in-memory stores, the scoring model, the verifier and the
//! journal into one `RiskService`.

use std::sync::Arc;

use tracing::info;

use riskwatch_audit::InMemoryRecalcJournal;
use riskwatch_core::{RecalculationTrigger, RiskService};
use riskwatch_model::{HealthScoreModel, RiskModel};
use riskwatch_store::{InMemoryLabStore, InMemoryPatientStore};
use riskwatch_verify::SnapshotSchemaVerifier;

/// A fully wired hospital runtime.
///
/// The store and journal handles are clones of the ones the service uses,
/// so scenarios can inspect state after the service has mutated it.
pub struct HospitalRuntime {
    pub service: RiskService,
    pub patients: InMemoryPatientStore,
    pub labs: InMemoryLabStore,
    pub journal: InMemoryRecalcJournal,
}

impl HospitalRuntime {
    pub fn new(ward: &str) -> Self {
        Self::with_model(ward, RiskModel::new())
    }

    pub fn with_model(ward: &str, model: RiskModel) -> Self {
        let patients = InMemoryPatientStore::new();
        let labs = InMemoryLabStore::new();
        let journal = InMemoryRecalcJournal::new(ward);

        let patient_store = Arc::new(patients.clone());
        let lab_store = Arc::new(labs.clone());

        let trigger = RecalculationTrigger::new(
            patient_store.clone(),
            lab_store.clone(),
            Box::new(model),
            Box::new(SnapshotSchemaVerifier::new()),
            Box::new(journal.clone()),
        );

        info!(ward, "hospital runtime wired");

        Self {
            service: RiskService::new(
                patient_store,
                lab_store,
                trigger,
                Box::new(HealthScoreModel::new()),
            ),
            patients,
            labs,
            journal,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
