//! Mutation events, recalculation outcomes and journal records.
//!
//! `RiskEvent` is what a mutation path hands to the recalculation trigger.
//! `RecalcOutcome` is what the trigger returns per affected patient.
//! `RecalcRecord` is what gets appended to the recalculation journal, one per
//! persisted snapshot.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    assessment::{RiskAssessment, RiskLevel},
    patient::PatientId,
};

/// A mutation that makes one or more patients' snapshots stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RiskEvent {
    PatientCreated { patient_id: PatientId },
    PatientUpdated { patient_id: PatientId },
    LabTestCreated { patient_id: PatientId },
    /// Covers full updates and status-only patches alike.
    LabTestUpdated { patient_id: PatientId },
    LabTestDeleted { patient_id: PatientId },
    /// May repeat ids; the trigger recomputes each distinct patient once.
    LabTestsBulkDeleted { patient_ids: Vec<PatientId> },
    ManualRecalculation { patient_id: PatientId },
}

impl RiskEvent {
    /// Every patient id named by the event, duplicates included.
    pub fn patient_ids(&self) -> Vec<&PatientId> {
        match self {
            RiskEvent::PatientCreated { patient_id }
            | RiskEvent::PatientUpdated { patient_id }
            | RiskEvent::LabTestCreated { patient_id }
            | RiskEvent::LabTestUpdated { patient_id }
            | RiskEvent::LabTestDeleted { patient_id }
            | RiskEvent::ManualRecalculation { patient_id } => vec![patient_id],
            RiskEvent::LabTestsBulkDeleted { patient_ids } => patient_ids.iter().collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RiskEvent::PatientCreated { .. } => "patient-created",
            RiskEvent::PatientUpdated { .. } => "patient-updated",
            RiskEvent::LabTestCreated { .. } => "lab-test-created",
            RiskEvent::LabTestUpdated { .. } => "lab-test-updated",
            RiskEvent::LabTestDeleted { .. } => "lab-test-deleted",
            RiskEvent::LabTestsBulkDeleted { .. } => "lab-tests-bulk-deleted",
            RiskEvent::ManualRecalculation { .. } => "manual-recalculation",
        }
    }
}

impl fmt::Display for RiskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Freshness of a patient's cached snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotState {
    /// A relevant mutation has not yet been folded into the snapshot.
    Stale,
    /// The snapshot reflects the latest inputs the trigger knows about.
    Fresh,
}

/// What the trigger did for one patient.
///
/// Callers pattern-match on this:
/// - `Recomputed` → the new snapshot has been persisted
/// - `Coalesced` → a concurrent recompute already covered this mutation
/// - `Skipped` → the patient no longer exists; nothing was written
#[derive(Debug, Clone, PartialEq)]
pub enum RecalcOutcome {
    Recomputed {
        patient_id: PatientId,
        assessment: RiskAssessment,
    },
    Coalesced {
        patient_id: PatientId,
    },
    Skipped {
        patient_id: PatientId,
    },
}

impl RecalcOutcome {
    pub fn patient_id(&self) -> &PatientId {
        match self {
            RecalcOutcome::Recomputed { patient_id, .. }
            | RecalcOutcome::Coalesced { patient_id }
            | RecalcOutcome::Skipped { patient_id } => patient_id,
        }
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        match self {
            RecalcOutcome::Recomputed { assessment, .. } => Some(assessment),
            _ => None,
        }
    }
}

/// An immutable record of one persisted recompute, written to the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalcRecord {
    pub patient_id: PatientId,
    /// The `RiskEvent::kind()` that caused the recompute.
    pub event: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    /// Set when the persisted snapshot was degraded.
    pub error: Option<String>,
    /// Wall-clock time the record was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl RecalcRecord {
    pub fn new(patient_id: &PatientId, event: &RiskEvent, assessment: &RiskAssessment) -> Self {
        Self {
            patient_id: patient_id.clone(),
            event: event.kind().to_string(),
            risk_score: assessment.risk_score,
            risk_level: assessment.risk_level,
            error: assessment.error.clone(),
            timestamp: Utc::now(),
        }
    }
}
