//! The recalculation trigger: keeps every cached snapshot consistent with the
//! latest committed patient and lab-test data.
//!
//! Per affected patient the trigger runs:
//!
//!   Ticket → Lock → Aggregate → Evaluate → Verify → Persist → Journal
//!
//! Recomputes for the same patient are serialized by a per-patient lock.
//! Every trigger takes a ticket *after* its mutation has committed. A recompute
//! records the newest ticket it has seen before it reads the stores; any
//! waiter whose ticket is not newer than a completed recompute skips its own
//! run, because that recompute already read its mutation. Overlapping triggers
//! therefore coalesce instead of racing each other's writes.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};

use riskwatch_contracts::{
    error::{RiskwatchError, RiskwatchResult},
    event::{RecalcOutcome, RecalcRecord, RiskEvent, SnapshotState},
    patient::PatientId,
};

use crate::{
    aggregator::gather_input,
    traits::{LabTestStore, PatientStore, RecalcJournal, RiskEvaluator, SnapshotVerifier},
};

/// Per-patient recompute bookkeeping.
#[derive(Default)]
struct PatientSlot {
    /// Tickets issued so far.
    requested: AtomicU64,
    /// Newest ticket folded into the persisted snapshot.
    completed: AtomicU64,
    /// Held for the whole read-evaluate-write sequence.
    gate: Mutex<()>,
}

impl PatientSlot {
    fn state(&self) -> SnapshotState {
        if self.requested.load(Ordering::SeqCst) > self.completed.load(Ordering::SeqCst) {
            SnapshotState::Stale
        } else {
            SnapshotState::Fresh
        }
    }
}

/// The lifecycle controller that recomputes snapshots on mutation events.
///
/// One trigger serves every patient. It owns the trusted pipeline pieces
/// (evaluator, verifier, journal) and shares the stores with the service
/// layer that performs the mutations.
pub struct RecalculationTrigger {
    patients: Arc<dyn PatientStore>,
    labs: Arc<dyn LabTestStore>,
    evaluator: Box<dyn RiskEvaluator>,
    verifier: Box<dyn SnapshotVerifier>,
    journal: Box<dyn RecalcJournal>,
    slots: Mutex<HashMap<PatientId, Arc<PatientSlot>>>,
}

impl RecalculationTrigger {
    pub fn new(
        patients: Arc<dyn PatientStore>,
        labs: Arc<dyn LabTestStore>,
        evaluator: Box<dyn RiskEvaluator>,
        verifier: Box<dyn SnapshotVerifier>,
        journal: Box<dyn RecalcJournal>,
    ) -> Self {
        Self {
            patients,
            labs,
            evaluator,
            verifier,
            journal,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Recompute every distinct patient named by `event`, in first-seen order.
    ///
    /// # Errors
    ///
    /// Store failures, verification failures and journal failures are
    /// returned as-is. A failing patient does not stop the others: every
    /// target is processed first and the first error is returned afterwards.
    /// A vanished patient is NOT an error; it yields `RecalcOutcome::Skipped`.
    pub fn fire(&self, event: &RiskEvent) -> RiskwatchResult<Vec<RecalcOutcome>> {
        let mut seen = HashSet::new();
        let targets: Vec<&PatientId> = event
            .patient_ids()
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        debug!(event = %event, patients = targets.len(), "recalculation triggered");

        let mut outcomes = Vec::with_capacity(targets.len());
        let mut first_error = None;
        for patient_id in targets {
            match self.recompute(patient_id, event) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!(
                        patient_id = %patient_id,
                        event = %event,
                        error = %e,
                        "recalculation failed"
                    );
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(outcomes),
        }
    }

    /// Freshness of a patient's snapshot. Unknown patients are `Stale`.
    pub fn snapshot_state(&self, patient_id: &PatientId) -> RiskwatchResult<SnapshotState> {
        let slots = self.slots.lock().map_err(|e| RiskwatchError::StateMachineError {
            reason: format!("recalculation slots lock poisoned: {}", e),
        })?;
        Ok(slots
            .get(patient_id)
            .map(|slot| slot.state())
            .unwrap_or(SnapshotState::Stale))
    }

    /// Drop the bookkeeping of a deleted patient.
    pub fn forget(&self, patient_id: &PatientId) -> RiskwatchResult<()> {
        let mut slots = self.slots.lock().map_err(|e| RiskwatchError::StateMachineError {
            reason: format!("recalculation slots lock poisoned: {}", e),
        })?;
        slots.remove(patient_id);
        Ok(())
    }

    fn slot(&self, patient_id: &PatientId) -> RiskwatchResult<Arc<PatientSlot>> {
        let mut slots = self.slots.lock().map_err(|e| RiskwatchError::StateMachineError {
            reason: format!("recalculation slots lock poisoned: {}", e),
        })?;
        Ok(Arc::clone(slots.entry(patient_id.clone()).or_default()))
    }

    fn recompute(&self, patient_id: &PatientId, event: &RiskEvent) -> RiskwatchResult<RecalcOutcome> {
        let slot = self.slot(patient_id)?;
        let ticket = slot.requested.fetch_add(1, Ordering::SeqCst) + 1;

        let _gate = slot.gate.lock().map_err(|e| RiskwatchError::StateMachineError {
            reason: format!("recalculation gate for '{}' poisoned: {}", patient_id, e),
        })?;

        if slot.completed.load(Ordering::SeqCst) >= ticket {
            debug!(
                patient_id = %patient_id,
                event = %event,
                ticket,
                "mutation already folded into a newer recompute"
            );
            return Ok(RecalcOutcome::Coalesced {
                patient_id: patient_id.clone(),
            });
        }

        // Everything issued up to here is visible to the reads below.
        let generation = slot.requested.load(Ordering::SeqCst);

        // ── Aggregate ────────────────────────────────────────────────────────
        let input = match gather_input(self.patients.as_ref(), self.labs.as_ref(), patient_id) {
            Ok(input) => input,
            Err(RiskwatchError::PatientNotFound { .. }) => {
                return self.skip(patient_id, event);
            }
            Err(e) => return Err(e),
        };

        // ── Evaluate ─────────────────────────────────────────────────────────
        let assessment = self.evaluator.evaluate_at(&input, Utc::now());

        // ── Verify ───────────────────────────────────────────────────────────
        let report = self.verifier.verify(&assessment)?;
        if !report.passed {
            let reason = report.summary();
            warn!(patient_id = %patient_id, failures = %reason, "snapshot verification failed");
            return Err(RiskwatchError::VerificationFailed { reason });
        }

        // ── Persist ──────────────────────────────────────────────────────────
        match self.patients.put_risk_assessment(patient_id, assessment.clone()) {
            Ok(()) => {}
            Err(RiskwatchError::PatientNotFound { .. }) => {
                return self.skip(patient_id, event);
            }
            Err(e) => return Err(e),
        }
        slot.completed.store(generation, Ordering::SeqCst);

        // ── Journal ──────────────────────────────────────────────────────────
        self.journal
            .append(&RecalcRecord::new(patient_id, event, &assessment))?;

        info!(
            patient_id = %patient_id,
            event = %event,
            risk_score = assessment.risk_score,
            risk_level = %assessment.risk_level,
            "risk snapshot recomputed"
        );

        Ok(RecalcOutcome::Recomputed {
            patient_id: patient_id.clone(),
            assessment,
        })
    }

    fn skip(&self, patient_id: &PatientId, event: &RiskEvent) -> RiskwatchResult<RecalcOutcome> {
        debug!(
            patient_id = %patient_id,
            event = %event,
            "patient no longer exists, recalculation skipped"
        );
        self.forget(patient_id)?;
        Ok(RecalcOutcome::Skipped {
            patient_id: patient_id.clone(),
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;

    use chrono::{DateTime, Utc};

    use riskwatch_contracts::{
        assessment::{RiskAssessment, RiskLevel},
        error::{RiskwatchError, RiskwatchResult},
        event::{RecalcOutcome, RecalcRecord, RiskEvent, SnapshotState},
        health::HealthScore,
        input::RiskInput,
        lab::{LabStatus, LabTest, LabTestId, LabTestUpdate, NewLabTest, TestCategory},
        patient::{
            Gender, MedicalInfo, NewPatient, Patient, PatientId, PatientStatus, PatientUpdate,
            PersonalInfo,
        },
        verify::{VerificationFailure, VerificationReport},
    };

    use crate::traits::{
        LabTestStore, PatientStore, RecalcJournal, RiskEvaluator, SnapshotVerifier,
    };

    use super::RecalculationTrigger;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    fn make_patient(id: &PatientId) -> Patient {
        let now = Utc::now();
        Patient {
            patient_id: id.clone(),
            personal_info: PersonalInfo {
                first_name: "Test".to_string(),
                last_name: "Patient".to_string(),
                date_of_birth: "1960-01-01".to_string(),
                gender: Gender::Other,
                phone_number: "555-0000".to_string(),
                email: None,
            },
            medical_info: MedicalInfo::default(),
            risk_assessment: RiskAssessment::initial(now),
            risk_history: vec![],
            health_score: None,
            health_score_history: vec![],
            status: PatientStatus::Active,
            registration_date: now,
            last_updated: now,
        }
    }

    fn make_lab(patient_id: &PatientId, test_type: &str, status: LabStatus) -> LabTest {
        let now = Utc::now();
        LabTest {
            id: LabTestId::new(),
            patient_id: patient_id.clone(),
            test_type: test_type.to_string(),
            test_category: TestCategory::Other,
            test_date: now,
            status,
            results: None,
            key_results: None,
            numeric_values: vec![],
            doctor_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A patient store that keeps documents in a map and records snapshot writes.
    #[derive(Default)]
    struct MockPatients {
        patients: Mutex<HashMap<PatientId, Patient>>,
        writes: Mutex<Vec<PatientId>>,
    }

    impl MockPatients {
        fn with(ids: &[&PatientId]) -> Self {
            let store = Self::default();
            for id in ids {
                store
                    .patients
                    .lock()
                    .unwrap()
                    .insert((*id).clone(), make_patient(id));
            }
            store
        }
    }

    impl PatientStore for MockPatients {
        fn insert_patient(&self, _patient: NewPatient) -> RiskwatchResult<Patient> {
            unimplemented!("not used by trigger tests")
        }

        fn get_patient(&self, id: &PatientId) -> RiskwatchResult<Patient> {
            self.patients
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| RiskwatchError::PatientNotFound {
                    patient_id: id.to_string(),
                })
        }

        fn update_patient(&self, _id: &PatientId, _update: PatientUpdate) -> RiskwatchResult<Patient> {
            unimplemented!("not used by trigger tests")
        }

        fn delete_patient(&self, id: &PatientId) -> RiskwatchResult<Patient> {
            self.patients
                .lock()
                .unwrap()
                .remove(id)
                .ok_or_else(|| RiskwatchError::PatientNotFound {
                    patient_id: id.to_string(),
                })
        }

        fn put_risk_assessment(
            &self,
            id: &PatientId,
            assessment: RiskAssessment,
        ) -> RiskwatchResult<()> {
            let mut patients = self.patients.lock().unwrap();
            let patient = patients
                .get_mut(id)
                .ok_or_else(|| RiskwatchError::PatientNotFound {
                    patient_id: id.to_string(),
                })?;
            patient.risk_assessment = assessment;
            self.writes.lock().unwrap().push(id.clone());
            Ok(())
        }

        fn put_health_score(&self, _id: &PatientId, _score: HealthScore) -> RiskwatchResult<()> {
            unimplemented!("not used by trigger tests")
        }

        fn list_patients(&self) -> RiskwatchResult<Vec<Patient>> {
            Ok(self.patients.lock().unwrap().values().cloned().collect())
        }
    }

    /// A lab store holding a flat list; can be switched into a failing mode.
    #[derive(Default)]
    struct MockLabs {
        tests: Mutex<Vec<LabTest>>,
        fail: AtomicBool,
    }

    impl LabTestStore for MockLabs {
        fn insert_lab_test(&self, _test: NewLabTest) -> RiskwatchResult<LabTest> {
            unimplemented!("not used by trigger tests")
        }

        fn get_lab_test(&self, _id: &LabTestId) -> RiskwatchResult<LabTest> {
            unimplemented!("not used by trigger tests")
        }

        fn update_lab_test(&self, _id: &LabTestId, _update: LabTestUpdate) -> RiskwatchResult<LabTest> {
            unimplemented!("not used by trigger tests")
        }

        fn set_status(&self, _id: &LabTestId, _status: LabStatus) -> RiskwatchResult<LabTest> {
            unimplemented!("not used by trigger tests")
        }

        fn delete_lab_test(&self, _id: &LabTestId) -> RiskwatchResult<LabTest> {
            unimplemented!("not used by trigger tests")
        }

        fn delete_lab_tests(&self, ids: &[LabTestId]) -> RiskwatchResult<Vec<LabTest>> {
            let mut tests = self.tests.lock().unwrap();
            let (removed, kept): (Vec<_>, Vec<_>) =
                tests.drain(..).partition(|t| ids.contains(&t.id));
            *tests = kept;
            Ok(removed)
        }

        fn list_for_patient(&self, patient_id: &PatientId) -> RiskwatchResult<Vec<LabTest>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(RiskwatchError::StoreFailure {
                    reason: "lab store offline".to_string(),
                });
            }
            Ok(self
                .tests
                .lock()
                .unwrap()
                .iter()
                .filter(|t| &t.patient_id == patient_id)
                .cloned()
                .collect())
        }

        fn list_all(&self) -> RiskwatchResult<Vec<LabTest>> {
            Ok(self.tests.lock().unwrap().clone())
        }
    }

    /// An evaluator that records every input it sees.
    ///
    /// When `hold` is set, the first call blocks until `release` flips.
    #[derive(Default)]
    struct RecordingEvaluator {
        inputs: Arc<Mutex<Vec<RiskInput>>>,
        entered: Arc<AtomicUsize>,
        hold: bool,
        release: Arc<AtomicBool>,
    }

    impl RiskEvaluator for RecordingEvaluator {
        fn evaluate_at(&self, input: &RiskInput, now: DateTime<Utc>) -> RiskAssessment {
            let call = self.entered.fetch_add(1, Ordering::SeqCst);
            if self.hold && call == 0 {
                while !self.release.load(Ordering::SeqCst) {
                    thread::yield_now();
                }
            }
            self.inputs.lock().unwrap().push(input.clone());
            let score = (input.lab_tests.len() * 10) as u8;
            RiskAssessment {
                risk_score: score,
                risk_level: RiskLevel::from_score(score),
                detail: None,
                error: None,
                calculated_at: now,
            }
        }
    }

    /// Rejects every snapshot, or only those with `reject_score` when set.
    struct MockVerifier {
        pass: bool,
        reject_score: Option<u8>,
    }

    impl SnapshotVerifier for MockVerifier {
        fn verify(&self, assessment: &RiskAssessment) -> RiskwatchResult<VerificationReport> {
            let rejected = match self.reject_score {
                Some(score) => assessment.risk_score == score,
                None => !self.pass,
            };
            if !rejected {
                Ok(VerificationReport::from_failures(vec![]))
            } else {
                Ok(VerificationReport::from_failures(vec![VerificationFailure {
                    rule_id: "score-range".to_string(),
                    message: "riskScore above 100".to_string(),
                }]))
            }
        }
    }

    #[derive(Default)]
    struct MockJournal {
        records: Arc<Mutex<Vec<RecalcRecord>>>,
    }

    impl RecalcJournal for MockJournal {
        fn append(&self, record: &RecalcRecord) -> RiskwatchResult<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct Harness {
        trigger: RecalculationTrigger,
        patients: Arc<MockPatients>,
        labs: Arc<MockLabs>,
        inputs: Arc<Mutex<Vec<RiskInput>>>,
        journal: Arc<Mutex<Vec<RecalcRecord>>>,
    }

    fn harness(ids: &[&PatientId], verifier_passes: bool) -> Harness {
        harness_with(ids, verifier_passes, RecordingEvaluator::default())
    }

    fn harness_with(
        ids: &[&PatientId],
        verifier_passes: bool,
        evaluator: RecordingEvaluator,
    ) -> Harness {
        harness_with_verifier(
            ids,
            evaluator,
            MockVerifier {
                pass: verifier_passes,
                reject_score: None,
            },
        )
    }

    fn harness_with_verifier(
        ids: &[&PatientId],
        evaluator: RecordingEvaluator,
        verifier: MockVerifier,
    ) -> Harness {
        let patients = Arc::new(MockPatients::with(ids));
        let labs = Arc::new(MockLabs::default());
        let inputs = Arc::clone(&evaluator.inputs);
        let journal = MockJournal::default();
        let journal_records = Arc::clone(&journal.records);

        let trigger = RecalculationTrigger::new(
            patients.clone(),
            labs.clone(),
            Box::new(evaluator),
            Box::new(verifier),
            Box::new(journal),
        );

        Harness {
            trigger,
            patients,
            labs,
            inputs,
            journal: journal_records,
        }
    }

    // ── Test cases ───────────────────────────────────────────────────────────

    /// Five deleted records across two patients yield exactly two recomputes,
    /// each reading the post-deletion lab list.
    #[test]
    fn test_bulk_delete_recomputes_each_patient_once() {
        let a = PatientId::from_sequence(1);
        let b = PatientId::from_sequence(2);
        let h = harness(&[&a, &b], true);

        {
            let mut tests = h.labs.tests.lock().unwrap();
            for _ in 0..3 {
                tests.push(make_lab(&a, "Glucose", LabStatus::Abnormal));
            }
            tests.push(make_lab(&a, "CBC", LabStatus::Normal));
            for _ in 0..2 {
                tests.push(make_lab(&b, "Lipid Panel", LabStatus::Critical));
            }
            tests.push(make_lab(&b, "ALT", LabStatus::Normal));
        }

        let doomed: Vec<LabTestId> = {
            let tests = h.labs.tests.lock().unwrap();
            tests
                .iter()
                .filter(|t| t.status != LabStatus::Normal)
                .map(|t| t.id)
                .collect()
        };
        assert_eq!(doomed.len(), 5);

        let removed = h.labs.delete_lab_tests(&doomed).unwrap();
        let event = RiskEvent::LabTestsBulkDeleted {
            patient_ids: removed.iter().map(|t| t.patient_id.clone()).collect(),
        };

        let outcomes = h.trigger.fire(&event).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, RecalcOutcome::Recomputed { .. })));

        let inputs = h.inputs.lock().unwrap();
        assert_eq!(inputs.len(), 2, "one evaluation per distinct patient");
        for input in inputs.iter() {
            assert_eq!(input.lab_tests.len(), 1, "only the surviving record is read");
            assert_eq!(input.lab_tests[0].status, LabStatus::Normal);
        }

        assert_eq!(h.patients.writes.lock().unwrap().len(), 2);
        assert_eq!(h.journal.lock().unwrap().len(), 2);
    }

    /// One patient's failed recompute does not leave the others stale.
    #[test]
    fn test_bulk_delete_failure_does_not_starve_other_patients() {
        let a = PatientId::from_sequence(1);
        let b = PatientId::from_sequence(2);
        // Patient A keeps one lab, so its snapshot scores 10 and is rejected.
        let h = harness_with_verifier(
            &[&a, &b],
            RecordingEvaluator::default(),
            MockVerifier {
                pass: true,
                reject_score: Some(10),
            },
        );

        {
            let mut tests = h.labs.tests.lock().unwrap();
            tests.push(make_lab(&a, "Glucose", LabStatus::Critical));
            tests.push(make_lab(&a, "CBC", LabStatus::Normal));
            tests.push(make_lab(&b, "Glucose", LabStatus::Critical));
        }
        let doomed: Vec<LabTestId> = h
            .labs
            .tests
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.status == LabStatus::Critical)
            .map(|t| t.id)
            .collect();

        let removed = h.labs.delete_lab_tests(&doomed).unwrap();
        let event = RiskEvent::LabTestsBulkDeleted {
            patient_ids: removed.iter().map(|t| t.patient_id.clone()).collect(),
        };

        let result = h.trigger.fire(&event);

        assert!(matches!(result, Err(RiskwatchError::VerificationFailed { .. })));
        assert_eq!(h.inputs.lock().unwrap().len(), 2, "both patients evaluated");
        assert_eq!(*h.patients.writes.lock().unwrap(), vec![b.clone()]);
        assert_eq!(h.trigger.snapshot_state(&a).unwrap(), SnapshotState::Stale);
        assert_eq!(h.trigger.snapshot_state(&b).unwrap(), SnapshotState::Fresh);
        assert_eq!(h.patients.get_patient(&b).unwrap().risk_assessment.risk_score, 0);
    }

    /// A patient that vanished before recompute is skipped without a write.
    #[test]
    fn test_missing_patient_is_skipped_not_resurrected() {
        let ghost = PatientId::from_sequence(99);
        let h = harness(&[], true);

        let outcomes = h
            .trigger
            .fire(&RiskEvent::LabTestDeleted {
                patient_id: ghost.clone(),
            })
            .unwrap();

        assert_eq!(
            outcomes,
            vec![RecalcOutcome::Skipped {
                patient_id: ghost.clone()
            }]
        );
        assert!(h.inputs.lock().unwrap().is_empty(), "nothing to evaluate");
        assert!(h.patients.writes.lock().unwrap().is_empty());
        assert!(h.patients.get_patient(&ghost).is_err(), "no document created");
        assert!(h.journal.lock().unwrap().is_empty());
    }

    /// A failing verifier blocks the write and surfaces VerificationFailed.
    #[test]
    fn test_verification_failure_blocks_persist() {
        let a = PatientId::from_sequence(1);
        let h = harness(&[&a], false);

        let result = h.trigger.fire(&RiskEvent::PatientUpdated {
            patient_id: a.clone(),
        });

        match result {
            Err(RiskwatchError::VerificationFailed { reason }) => {
                assert!(reason.contains("score-range"), "reason: {reason}");
            }
            other => panic!("expected VerificationFailed, got {:?}", other),
        }
        assert!(h.patients.writes.lock().unwrap().is_empty());
        assert_eq!(h.trigger.snapshot_state(&a).unwrap(), SnapshotState::Stale);
    }

    /// Store failures propagate unchanged to the caller.
    #[test]
    fn test_store_failure_propagates() {
        let a = PatientId::from_sequence(1);
        let h = harness(&[&a], true);
        h.labs.fail.store(true, Ordering::SeqCst);

        let result = h.trigger.fire(&RiskEvent::LabTestCreated {
            patient_id: a.clone(),
        });

        match result {
            Err(RiskwatchError::StoreFailure { reason }) => {
                assert_eq!(reason, "lab store offline");
            }
            other => panic!("expected StoreFailure, got {:?}", other),
        }
    }

    /// Snapshot state goes Stale → Fresh across a successful recompute.
    #[test]
    fn test_snapshot_state_transitions() {
        let a = PatientId::from_sequence(1);
        let h = harness(&[&a], true);

        assert_eq!(h.trigger.snapshot_state(&a).unwrap(), SnapshotState::Stale);

        h.trigger
            .fire(&RiskEvent::PatientCreated {
                patient_id: a.clone(),
            })
            .unwrap();
        assert_eq!(h.trigger.snapshot_state(&a).unwrap(), SnapshotState::Fresh);

        h.patients.delete_patient(&a).unwrap();
        let outcomes = h
            .trigger
            .fire(&RiskEvent::ManualRecalculation {
                patient_id: a.clone(),
            })
            .unwrap();
        assert!(matches!(outcomes[0], RecalcOutcome::Skipped { .. }));
        assert_eq!(h.trigger.snapshot_state(&a).unwrap(), SnapshotState::Stale);
    }

    /// Sequential events each produce their own recompute.
    #[test]
    fn test_sequential_events_each_recompute() {
        let a = PatientId::from_sequence(1);
        let h = harness(&[&a], true);

        for _ in 0..3 {
            let outcomes = h
                .trigger
                .fire(&RiskEvent::LabTestUpdated {
                    patient_id: a.clone(),
                })
                .unwrap();
            assert!(matches!(outcomes[0], RecalcOutcome::Recomputed { .. }));
        }
        assert_eq!(h.inputs.lock().unwrap().len(), 3);
    }

    /// Two triggers queued behind an in-flight recompute fold into one run.
    #[test]
    fn test_overlapping_triggers_coalesce() {
        let a = PatientId::from_sequence(1);
        let evaluator = RecordingEvaluator {
            hold: true,
            ..RecordingEvaluator::default()
        };
        let entered = Arc::clone(&evaluator.entered);
        let release = Arc::clone(&evaluator.release);
        let h = Arc::new(harness_with(&[&a], true, evaluator));

        let fire = |h: &Arc<Harness>, id: &PatientId| {
            let h = Arc::clone(h);
            let id = id.clone();
            thread::spawn(move || {
                h.trigger
                    .fire(&RiskEvent::LabTestUpdated { patient_id: id })
                    .unwrap()
                    .remove(0)
            })
        };

        let first = fire(&h, &a);
        while entered.load(Ordering::SeqCst) == 0 {
            thread::yield_now();
        }

        let second = fire(&h, &a);
        let third = fire(&h, &a);
        loop {
            let requested = {
                let slots = h.trigger.slots.lock().unwrap();
                slots[&a].requested.load(Ordering::SeqCst)
            };
            if requested == 3 {
                break;
            }
            thread::yield_now();
        }
        release.store(true, Ordering::SeqCst);

        let outcomes = [
            first.join().unwrap(),
            second.join().unwrap(),
            third.join().unwrap(),
        ];

        assert!(matches!(outcomes[0], RecalcOutcome::Recomputed { .. }));
        let coalesced = outcomes
            .iter()
            .filter(|o| matches!(o, RecalcOutcome::Coalesced { .. }))
            .count();
        assert_eq!(coalesced, 1, "one queued trigger must be absorbed");
        assert_eq!(h.inputs.lock().unwrap().len(), 2);
        assert_eq!(h.trigger.snapshot_state(&a).unwrap(), SnapshotState::Fresh);
    }
}
