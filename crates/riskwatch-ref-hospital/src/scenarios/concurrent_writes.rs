//! Scenario 4: Concurrent Lab Writes
//!
//! Several writers record lab reports for the same patient at once. Each
//! write fires its own recompute; the per-patient gate serializes them and
//! folds redundant ones into a newer recompute. Once every writer has
//! returned, the persisted snapshot must equal a fresh evaluation of the
//! final lab set.

use std::{sync::Arc, thread};

use chrono::Utc;

use riskwatch_contracts::{
    error::{RiskwatchError, RiskwatchResult},
    event::SnapshotState,
    lab::{LabStatus, NewLabTest},
    patient::PatientId,
};
use riskwatch_core::{aggregator::gather_input, traits::RiskEvaluator};
use riskwatch_model::RiskModel;

use crate::{mock_data::margaret_ellis, runtime::HospitalRuntime, scenarios::describe};

pub const WRITERS: usize = 8;

#[derive(Debug)]
pub struct ConcurrentOutcome {
    pub patient_id: PatientId,
    /// Whether the persisted snapshot equals a fresh evaluation of the
    /// final inputs at the same timestamp.
    pub consistent: bool,
    pub state: SnapshotState,
    pub lab_count: usize,
}

fn writer_lab(patient_id: &PatientId, n: usize) -> NewLabTest {
    let (test_type, status) = match n % 4 {
        0 => ("Glucose", LabStatus::Critical),
        1 => ("HbA1c", LabStatus::Abnormal),
        2 => ("CBC", LabStatus::Normal),
        _ => ("Creatinine", LabStatus::Abnormal),
    };
    NewLabTest::new(patient_id.clone(), test_type, status)
}

pub fn execute(runtime: Arc<HospitalRuntime>) -> RiskwatchResult<ConcurrentOutcome> {
    let patient = runtime.service.register_patient(margaret_ellis(Utc::now()))?;
    let id = patient.patient_id.clone();
    println!("  Registered {} ({})", patient.full_name(), id);

    let handles: Vec<_> = (0..WRITERS)
        .map(|n| {
            let runtime = Arc::clone(&runtime);
            let id = id.clone();
            thread::spawn(move || runtime.service.record_lab_test(writer_lab(&id, n)))
        })
        .collect();

    for handle in handles {
        handle.join().map_err(|_| RiskwatchError::StateMachineError {
            reason: "lab writer thread panicked".to_string(),
        })??;
    }

    let service = &runtime.service;
    let snapshot = service.patients().get_patient(&id)?.risk_assessment;
    let input = gather_input(service.patients(), service.labs(), &id)?;
    let expected = RiskModel::new().evaluate_at(&input, snapshot.calculated_at);
    let state = service.snapshot_state(&id)?;

    println!("  {} writers finished", WRITERS);
    println!("  Final snapshot: {}", describe(&snapshot));
    println!("  Snapshot state: {:?}", state);

    Ok(ConcurrentOutcome {
        patient_id: id,
        consistent: snapshot == expected,
        state,
        lab_count: input.lab_tests.len(),
    })
}

pub fn run_scenario() -> RiskwatchResult<()> {
    println!("=== Scenario 4: Concurrent Lab Writes ===");
    println!();

    let runtime = Arc::new(HospitalRuntime::new("ward-concurrent"));
    let outcome = execute(Arc::clone(&runtime))?;

    let recomputes = runtime.journal.records_for(&outcome.patient_id)?.len();
    println!(
        "  Journal: {} recompute(s) for {} lab writes + registration",
        recomputes, WRITERS
    );
    println!(
        "  Matches fresh evaluation: {}",
        if outcome.consistent { "yes" } else { "NO" }
    );
    println!(
        "  Journal integrity: {}",
        if runtime.journal.verify_integrity()? { "VALID" } else { "BROKEN" }
    );

    println!();
    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
