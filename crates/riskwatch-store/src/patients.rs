//! In-memory implementation of `PatientStore`.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use riskwatch_contracts::{
    assessment::RiskAssessment,
    error::{RiskwatchError, RiskwatchResult},
    health::HealthScore,
    patient::{NewPatient, Patient, PatientId, PatientStatus, PatientUpdate},
};
use riskwatch_core::traits::PatientStore;

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct PatientState {
    /// Registration order.
    pub(crate) patients: Vec<Patient>,
    /// Sequence number of the last issued `PatientId`.
    pub(crate) last_sequence: u64,
}

impl PatientState {
    fn position(&self, id: &PatientId) -> RiskwatchResult<usize> {
        self.patients
            .iter()
            .position(|p| &p.patient_id == id)
            .ok_or_else(|| RiskwatchError::PatientNotFound {
                patient_id: id.to_string(),
            })
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

/// A patient store holding documents in memory. Clones share state.
#[derive(Clone)]
pub struct InMemoryPatientStore {
    pub(crate) state: Arc<Mutex<PatientState>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PatientState {
                patients: Vec::new(),
                last_sequence: 0,
            })),
        }
    }

    fn lock(&self) -> RiskwatchResult<MutexGuard<'_, PatientState>> {
        self.state.lock().map_err(|e| RiskwatchError::StoreFailure {
            reason: format!("patient store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryPatientStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── PatientStore impl ─────────────────────────────────────────────────────────

impl PatientStore for InMemoryPatientStore {
    /// Issues the next `PAT` id and attaches the initial zero snapshot.
    fn insert_patient(&self, new: NewPatient) -> RiskwatchResult<Patient> {
        let mut state = self.lock()?;
        state.last_sequence += 1;

        let now = Utc::now();
        let patient = Patient {
            patient_id: PatientId::from_sequence(state.last_sequence),
            personal_info: new.personal_info,
            medical_info: new.medical_info,
            risk_assessment: RiskAssessment::initial(now),
            risk_history: Vec::new(),
            health_score: None,
            health_score_history: Vec::new(),
            status: PatientStatus::Active,
            registration_date: now,
            last_updated: now,
        };
        state.patients.push(patient.clone());

        debug!(patient_id = %patient.patient_id, "patient inserted");
        Ok(patient)
    }

    fn get_patient(&self, id: &PatientId) -> RiskwatchResult<Patient> {
        let state = self.lock()?;
        let idx = state.position(id)?;
        Ok(state.patients[idx].clone())
    }

    fn update_patient(&self, id: &PatientId, update: PatientUpdate) -> RiskwatchResult<Patient> {
        let mut state = self.lock()?;
        let idx = state.position(id)?;
        let patient = &mut state.patients[idx];

        if let Some(personal_info) = update.personal_info {
            patient.personal_info = personal_info;
        }
        if let Some(medical_info) = update.medical_info {
            patient.medical_info = medical_info;
        }
        if let Some(status) = update.status {
            patient.status = status;
        }
        patient.last_updated = Utc::now();

        Ok(patient.clone())
    }

    fn delete_patient(&self, id: &PatientId) -> RiskwatchResult<Patient> {
        let mut state = self.lock()?;
        let idx = state.position(id)?;
        Ok(state.patients.remove(idx))
    }

    /// Superseded snapshots other than the initial one go to `risk_history`.
    fn put_risk_assessment(&self, id: &PatientId, assessment: RiskAssessment) -> RiskwatchResult<()> {
        let mut state = self.lock()?;
        let idx = state.position(id)?;
        let patient = &mut state.patients[idx];

        let previous = std::mem::replace(&mut patient.risk_assessment, assessment);
        if !previous.is_initial() {
            patient.risk_history.push(previous.to_history_entry());
        }
        patient.last_updated = Utc::now();
        Ok(())
    }

    fn put_health_score(&self, id: &PatientId, score: HealthScore) -> RiskwatchResult<()> {
        let mut state = self.lock()?;
        let idx = state.position(id)?;
        let patient = &mut state.patients[idx];

        if let Some(previous) = patient.health_score.replace(score) {
            patient.health_score_history.push(previous.to_history_entry());
        }
        patient.last_updated = Utc::now();
        Ok(())
    }

    fn list_patients(&self) -> RiskwatchResult<Vec<Patient>> {
        Ok(self.lock()?.patients.clone())
    }
}
