//! In-memory implementation of `LabTestStore`.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use riskwatch_contracts::{
    error::{RiskwatchError, RiskwatchResult},
    lab::{LabStatus, LabTest, LabTestId, LabTestUpdate, NewLabTest},
    patient::PatientId,
};
use riskwatch_core::traits::LabTestStore;

pub(crate) struct LabState {
    /// Insertion order.
    pub(crate) tests: Vec<LabTest>,
}

impl LabState {
    fn position(&self, id: &LabTestId) -> RiskwatchResult<usize> {
        self.tests
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| RiskwatchError::LabTestNotFound {
                lab_test_id: id.to_string(),
            })
    }
}

/// A lab-test store holding records in memory. Clones share state.
#[derive(Clone)]
pub struct InMemoryLabStore {
    pub(crate) state: Arc<Mutex<LabState>>,
}

impl InMemoryLabStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LabState { tests: Vec::new() })),
        }
    }

    fn lock(&self) -> RiskwatchResult<MutexGuard<'_, LabState>> {
        self.state.lock().map_err(|e| RiskwatchError::StoreFailure {
            reason: format!("lab store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryLabStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(mut tests: Vec<LabTest>) -> Vec<LabTest> {
    tests.sort_by(|a, b| b.test_date.cmp(&a.test_date));
    tests
}

impl LabTestStore for InMemoryLabStore {
    fn insert_lab_test(&self, new: NewLabTest) -> RiskwatchResult<LabTest> {
        let now = Utc::now();
        let test = LabTest {
            id: LabTestId::new(),
            patient_id: new.patient_id,
            test_type: new.test_type,
            test_category: new.test_category,
            test_date: new.test_date.unwrap_or(now),
            status: new.status,
            results: new.results,
            key_results: new.key_results,
            numeric_values: new.numeric_values,
            doctor_notes: new.doctor_notes,
            created_at: now,
            updated_at: now,
        };

        self.lock()?.tests.push(test.clone());
        debug!(lab_test_id = %test.id, patient_id = %test.patient_id, "lab test inserted");
        Ok(test)
    }

    fn get_lab_test(&self, id: &LabTestId) -> RiskwatchResult<LabTest> {
        let state = self.lock()?;
        let idx = state.position(id)?;
        Ok(state.tests[idx].clone())
    }

    fn update_lab_test(&self, id: &LabTestId, update: LabTestUpdate) -> RiskwatchResult<LabTest> {
        let mut state = self.lock()?;
        let idx = state.position(id)?;
        let test = &mut state.tests[idx];

        if let Some(test_type) = update.test_type {
            test.test_type = test_type;
        }
        if let Some(category) = update.test_category {
            test.test_category = category;
        }
        if let Some(status) = update.status {
            test.status = status;
        }
        if update.results.is_some() {
            test.results = update.results;
        }
        if update.key_results.is_some() {
            test.key_results = update.key_results;
        }
        if update.doctor_notes.is_some() {
            test.doctor_notes = update.doctor_notes;
        }
        test.updated_at = Utc::now();

        Ok(test.clone())
    }

    fn set_status(&self, id: &LabTestId, status: LabStatus) -> RiskwatchResult<LabTest> {
        self.update_lab_test(id, LabTestUpdate::status(status))
    }

    fn delete_lab_test(&self, id: &LabTestId) -> RiskwatchResult<LabTest> {
        let mut state = self.lock()?;
        let idx = state.position(id)?;
        Ok(state.tests.remove(idx))
    }

    fn delete_lab_tests(&self, ids: &[LabTestId]) -> RiskwatchResult<Vec<LabTest>> {
        let mut state = self.lock()?;
        let (removed, kept): (Vec<LabTest>, Vec<LabTest>) =
            state.tests.drain(..).partition(|t| ids.contains(&t.id));
        state.tests = kept;

        debug!(requested = ids.len(), removed = removed.len(), "lab tests deleted");
        Ok(removed)
    }

    fn list_for_patient(&self, patient_id: &PatientId) -> RiskwatchResult<Vec<LabTest>> {
        let tests = self
            .lock()?
            .tests
            .iter()
            .filter(|t| &t.patient_id == patient_id)
            .cloned()
            .collect();
        Ok(newest_first(tests))
    }

    fn list_all(&self) -> RiskwatchResult<Vec<LabTest>> {
        Ok(newest_first(self.lock()?.tests.clone()))
    }
}
