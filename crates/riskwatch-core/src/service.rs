//! The mutation surface: every write path that affects a risk input goes
//! through `RiskService`, which fires the matching event once the write has
//! committed.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use riskwatch_contracts::{
    assessment::RiskAssessment,
    error::{RiskwatchError, RiskwatchResult},
    event::{RecalcOutcome, RiskEvent, SnapshotState},
    health::{HealthScore, HealthScoreInput, HealthScoreRequest},
    lab::{LabStatus, LabTest, LabTestId, LabTestUpdate, NewLabTest},
    patient::{NewPatient, Patient, PatientId, PatientUpdate},
};

use crate::{
    traits::{HealthScorer, LabTestStore, PatientStore},
    trigger::RecalculationTrigger,
};

pub struct RiskService {
    patients: Arc<dyn PatientStore>,
    labs: Arc<dyn LabTestStore>,
    trigger: RecalculationTrigger,
    health: Box<dyn HealthScorer>,
}

impl RiskService {
    /// The trigger must share `patients` and `labs` with the service.
    pub fn new(
        patients: Arc<dyn PatientStore>,
        labs: Arc<dyn LabTestStore>,
        trigger: RecalculationTrigger,
        health: Box<dyn HealthScorer>,
    ) -> Self {
        Self {
            patients,
            labs,
            trigger,
            health,
        }
    }

    pub fn patients(&self) -> &dyn PatientStore {
        self.patients.as_ref()
    }

    pub fn labs(&self) -> &dyn LabTestStore {
        self.labs.as_ref()
    }

    pub fn snapshot_state(&self, patient_id: &PatientId) -> RiskwatchResult<SnapshotState> {
        self.trigger.snapshot_state(patient_id)
    }

    // ── Patients ─────────────────────────────────────────────────────────────

    /// Register a patient and compute its first snapshot.
    ///
    /// The returned document already carries the computed snapshot.
    pub fn register_patient(&self, new: NewPatient) -> RiskwatchResult<Patient> {
        let patient = self.patients.insert_patient(new)?;
        info!(patient_id = %patient.patient_id, "patient registered");

        self.trigger.fire(&RiskEvent::PatientCreated {
            patient_id: patient.patient_id.clone(),
        })?;
        self.patients.get_patient(&patient.patient_id)
    }

    /// Apply a partial update. Recomputes only when personal or medical
    /// information changed; a status-only update leaves the snapshot alone.
    pub fn update_patient(
        &self,
        patient_id: &PatientId,
        update: PatientUpdate,
    ) -> RiskwatchResult<Patient> {
        let affects_risk = update.personal_info.is_some() || update.medical_info.is_some();
        let patient = self.patients.update_patient(patient_id, update)?;

        if !affects_risk {
            debug!(patient_id = %patient_id, "status-only update, snapshot kept");
            return Ok(patient);
        }

        self.trigger.fire(&RiskEvent::PatientUpdated {
            patient_id: patient_id.clone(),
        })?;
        self.patients.get_patient(patient_id)
    }

    /// Delete a patient and its embedded snapshot.
    ///
    /// The patient's lab-test records are left in place.
    pub fn remove_patient(&self, patient_id: &PatientId) -> RiskwatchResult<Patient> {
        let patient = self.patients.delete_patient(patient_id)?;
        self.trigger.forget(patient_id)?;
        info!(patient_id = %patient_id, "patient removed");
        Ok(patient)
    }

    /// Recompute on demand and return the resulting snapshot.
    ///
    /// # Errors
    ///
    /// `PatientNotFound` when the patient does not exist. Nothing is written.
    pub fn evaluate_risk(&self, patient_id: &PatientId) -> RiskwatchResult<RiskAssessment> {
        let outcomes = self.trigger.fire(&RiskEvent::ManualRecalculation {
            patient_id: patient_id.clone(),
        })?;

        match outcomes.into_iter().next() {
            Some(RecalcOutcome::Recomputed { assessment, .. }) => Ok(assessment),
            Some(RecalcOutcome::Coalesced { .. }) => {
                Ok(self.patients.get_patient(patient_id)?.risk_assessment)
            }
            Some(RecalcOutcome::Skipped { .. }) | None => Err(RiskwatchError::PatientNotFound {
                patient_id: patient_id.to_string(),
            }),
        }
    }

    /// Compute a new health score from the patient's record plus the
    /// supplied lifestyle and lab readings. The previous score moves to
    /// `health_score_history`. The risk snapshot is not touched.
    pub fn score_health(
        &self,
        patient_id: &PatientId,
        request: HealthScoreRequest,
    ) -> RiskwatchResult<HealthScore> {
        let patient = self.patients.get_patient(patient_id)?;
        let input = HealthScoreInput {
            date_of_birth: patient.personal_info.date_of_birth,
            chronic_conditions: patient.medical_info.chronic_conditions,
            lifestyle: request.lifestyle,
            recent_lab_results: request.lab_results,
        };

        let score = self.health.score_at(&input, Utc::now());
        self.patients.put_health_score(patient_id, score.clone())?;
        info!(
            patient_id = %patient_id,
            health_score = score.current,
            "health score updated"
        );
        Ok(score)
    }

    // ── Lab tests ────────────────────────────────────────────────────────────

    /// Record a lab test for an existing patient.
    pub fn record_lab_test(&self, new: NewLabTest) -> RiskwatchResult<LabTest> {
        self.patients.get_patient(&new.patient_id)?;

        let test = self.labs.insert_lab_test(new)?;
        debug!(lab_test_id = %test.id, patient_id = %test.patient_id, "lab test recorded");

        self.trigger.fire(&RiskEvent::LabTestCreated {
            patient_id: test.patient_id.clone(),
        })?;
        Ok(test)
    }

    pub fn revise_lab_test(
        &self,
        lab_test_id: &LabTestId,
        update: LabTestUpdate,
    ) -> RiskwatchResult<LabTest> {
        let test = self.labs.update_lab_test(lab_test_id, update)?;
        self.trigger.fire(&RiskEvent::LabTestUpdated {
            patient_id: test.patient_id.clone(),
        })?;
        Ok(test)
    }

    pub fn set_lab_status(
        &self,
        lab_test_id: &LabTestId,
        status: LabStatus,
    ) -> RiskwatchResult<LabTest> {
        let test = self.labs.set_status(lab_test_id, status)?;
        debug!(lab_test_id = %lab_test_id, status = ?status, "lab status changed");
        self.trigger.fire(&RiskEvent::LabTestUpdated {
            patient_id: test.patient_id.clone(),
        })?;
        Ok(test)
    }

    pub fn remove_lab_test(&self, lab_test_id: &LabTestId) -> RiskwatchResult<LabTest> {
        let test = self.labs.delete_lab_test(lab_test_id)?;
        self.trigger.fire(&RiskEvent::LabTestDeleted {
            patient_id: test.patient_id.clone(),
        })?;
        Ok(test)
    }

    /// Bulk delete. Each distinct owning patient is recomputed once, after
    /// every listed record is gone.
    pub fn remove_lab_tests(&self, lab_test_ids: &[LabTestId]) -> RiskwatchResult<Vec<LabTest>> {
        let removed = self.labs.delete_lab_tests(lab_test_ids)?;
        if removed.is_empty() {
            return Ok(removed);
        }

        info!(
            requested = lab_test_ids.len(),
            removed = removed.len(),
            "lab tests bulk deleted"
        );
        self.trigger.fire(&RiskEvent::LabTestsBulkDeleted {
            patient_ids: removed.iter().map(|t| t.patient_id.clone()).collect(),
        })?;
        Ok(removed)
    }
}
