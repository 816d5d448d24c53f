//! Scenario 3: Bulk Lab Deletion Fan-out
//!
//! Five flagged lab reports spread over two patients are deleted in one
//! request, together with an id that does not exist. The trigger must
//! recompute each affected patient exactly once, after all five records are
//! gone.

use riskwatch_contracts::{
    error::RiskwatchResult,
    lab::{LabStatus, LabTestId, NewLabTest},
    patient::PatientId,
};

use crate::{
    mock_data::{john_doe, normal_cbc, sarah_johnson},
    runtime::HospitalRuntime,
    scenarios::describe,
};

#[derive(Debug)]
pub struct BulkDeleteOutcome {
    pub patients: [PatientId; 2],
    pub removed: usize,
    /// Journal entries appended by the bulk delete alone.
    pub recomputes: usize,
}

pub fn execute(runtime: &HospitalRuntime) -> RiskwatchResult<BulkDeleteOutcome> {
    let service = &runtime.service;

    let john = service.register_patient(john_doe())?.patient_id;
    let sarah = service.register_patient(sarah_johnson())?.patient_id;

    let flagged = [
        (&john, "HbA1c", LabStatus::Abnormal),
        (&john, "ALT", LabStatus::Critical),
        (&john, "Lipid Panel", LabStatus::Abnormal),
        (&sarah, "Glucose", LabStatus::Critical),
        (&sarah, "Creatinine", LabStatus::Abnormal),
    ];

    let mut doomed: Vec<LabTestId> = Vec::new();
    for (owner, test_type, status) in flagged {
        doomed.push(service.record_lab_test(NewLabTest::new(owner.clone(), test_type, status))?.id);
    }
    service.record_lab_test(normal_cbc(&john))?;
    service.record_lab_test(normal_cbc(&sarah))?;

    for id in [&john, &sarah] {
        let patient = service.patients().get_patient(id)?;
        println!("  {} before: {}", patient.full_name(), describe(&patient.risk_assessment));
    }

    doomed.push(LabTestId::new());
    let journal_before = runtime.journal.len()?;
    let removed = service.remove_lab_tests(&doomed)?;
    let recomputes = runtime.journal.len()? - journal_before;

    println!();
    println!(
        "  Bulk delete: {} ids requested, {} removed, {} recompute(s)",
        doomed.len(),
        removed.len(),
        recomputes
    );
    for id in [&john, &sarah] {
        let patient = service.patients().get_patient(id)?;
        println!("  {} after:  {}", patient.full_name(), describe(&patient.risk_assessment));
    }

    Ok(BulkDeleteOutcome {
        patients: [john, sarah],
        removed: removed.len(),
        recomputes,
    })
}

pub fn run_scenario() -> RiskwatchResult<()> {
    println!("=== Scenario 3: Bulk Lab Deletion Fan-out ===");
    println!();

    let runtime = HospitalRuntime::new("ward-bulk-delete");
    execute(&runtime)?;

    println!();
    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
