//! Core trait definitions for the RiskWatch recalculation pipeline.
//!
//! These traits are the seams between the lifecycle controller and its
//! collaborators:
//!
//! - `PatientStore`     - owns patient documents and their embedded snapshot
//! - `LabTestStore`     - owns lab-test records
//! - `RiskEvaluator`    - the pure scoring engine
//! - `HealthScorer`     - the lifestyle-aware health score model
//! - `SnapshotVerifier` - checks a snapshot before it is persisted
//! - `RecalcJournal`    - records every persisted recompute
//!
//! The trigger wires them together in a fixed order. Store errors propagate
//! unchanged; only `PatientNotFound` is given special meaning.

use chrono::{DateTime, Utc};

use riskwatch_contracts::{
    assessment::RiskAssessment,
    error::RiskwatchResult,
    event::RecalcRecord,
    health::{HealthScore, HealthScoreInput},
    input::RiskInput,
    lab::{LabStatus, LabTest, LabTestId, LabTestUpdate, NewLabTest},
    patient::{NewPatient, Patient, PatientId, PatientUpdate},
    verify::VerificationReport,
};

/// The patient document store.
pub trait PatientStore: Send + Sync {
    /// Insert a new patient with a generated id and the initial zero snapshot.
    fn insert_patient(&self, patient: NewPatient) -> RiskwatchResult<Patient>;

    /// Fetch one patient, or `PatientNotFound`.
    fn get_patient(&self, id: &PatientId) -> RiskwatchResult<Patient>;

    /// Apply a partial update and return the updated document.
    fn update_patient(&self, id: &PatientId, update: PatientUpdate) -> RiskwatchResult<Patient>;

    /// Remove a patient together with its embedded snapshot.
    fn delete_patient(&self, id: &PatientId) -> RiskwatchResult<Patient>;

    /// Replace the embedded snapshot in one write.
    ///
    /// Returns `PatientNotFound` if the patient has been deleted; an
    /// implementation must never create a document here.
    fn put_risk_assessment(
        &self,
        id: &PatientId,
        assessment: RiskAssessment,
    ) -> RiskwatchResult<()>;

    /// Replace the current health score, moving the previous one (if any)
    /// to the end of `health_score_history`.
    ///
    /// Returns `PatientNotFound` if the patient has been deleted.
    fn put_health_score(&self, id: &PatientId, score: HealthScore) -> RiskwatchResult<()>;

    /// All patients, in registration order.
    fn list_patients(&self) -> RiskwatchResult<Vec<Patient>>;
}

/// The lab-test record store.
///
/// Every mutating method returns the affected record(s) so the caller knows
/// which patients need a recompute.
pub trait LabTestStore: Send + Sync {
    fn insert_lab_test(&self, test: NewLabTest) -> RiskwatchResult<LabTest>;

    fn get_lab_test(&self, id: &LabTestId) -> RiskwatchResult<LabTest>;

    fn update_lab_test(&self, id: &LabTestId, update: LabTestUpdate) -> RiskwatchResult<LabTest>;

    /// Status-only patch.
    fn set_status(&self, id: &LabTestId, status: LabStatus) -> RiskwatchResult<LabTest>;

    fn delete_lab_test(&self, id: &LabTestId) -> RiskwatchResult<LabTest>;

    /// Delete every listed record that exists; unknown ids are ignored.
    ///
    /// Returns the records actually removed.
    fn delete_lab_tests(&self, ids: &[LabTestId]) -> RiskwatchResult<Vec<LabTest>>;

    /// The current records of one patient, newest test date first.
    fn list_for_patient(&self, patient_id: &PatientId) -> RiskwatchResult<Vec<LabTest>>;

    /// Every record in the store, newest test date first.
    fn list_all(&self) -> RiskwatchResult<Vec<LabTest>>;
}

/// The scoring engine.
///
/// Implementations must be pure and infallible: any input problem is turned
/// into a degraded `Unknown` assessment rather than an error or a panic.
pub trait RiskEvaluator: Send + Sync {
    /// Evaluate `input` as of `now`. `now` drives both the patient's age and
    /// the snapshot's `calculated_at`.
    fn evaluate_at(&self, input: &RiskInput, now: DateTime<Utc>) -> RiskAssessment;
}

/// The health score model. Pure and infallible like `RiskEvaluator`.
pub trait HealthScorer: Send + Sync {
    fn score_at(&self, input: &HealthScoreInput, now: DateTime<Utc>) -> HealthScore;
}

/// The last gate before a snapshot is written.
pub trait SnapshotVerifier: Send + Sync {
    fn verify(&self, assessment: &RiskAssessment) -> RiskwatchResult<VerificationReport>;
}

/// Append-only record of persisted recomputes.
pub trait RecalcJournal: Send + Sync {
    /// A failed append is reported as `AuditWriteFailed`.
    fn append(&self, record: &RecalcRecord) -> RiskwatchResult<()>;
}
