//! Scenario 2: Lab Report Lifecycle
//!
//! Every lab-report write path recomputes the owning patient's snapshot:
//!
//!   1. Record an abnormal creatinine      → score rises
//!   2. Patch its status to Critical       → score rises again
//!   3. Revise it back to Normal           → score returns to baseline
//!   4. Delete it                          → still baseline
//!   5. Delete the patient, patch the lab  → recompute skipped, no resurrection

use riskwatch_contracts::{
    error::{RiskwatchError, RiskwatchResult},
    lab::{LabStatus, LabTestUpdate},
    patient::PatientId,
};

use crate::{
    mock_data::{abnormal_creatinine, john_doe},
    runtime::HospitalRuntime,
    scenarios::describe,
};

/// Scores observed along the lifecycle.
#[derive(Debug)]
pub struct LifecycleScores {
    pub patient_id: PatientId,
    pub baseline: u8,
    pub abnormal: u8,
    pub critical: u8,
    pub revised_normal: u8,
    pub after_delete: u8,
}

pub fn execute(runtime: &HospitalRuntime) -> RiskwatchResult<LifecycleScores> {
    let service = &runtime.service;
    let score_of = |id: &PatientId| -> RiskwatchResult<u8> {
        let assessment = service.patients().get_patient(id)?.risk_assessment;
        println!("    snapshot: {}", describe(&assessment));
        Ok(assessment.risk_score)
    };

    let patient = service.register_patient(john_doe())?;
    let id = patient.patient_id.clone();
    println!("  Registered {} ({})", patient.full_name(), id);
    let baseline = score_of(&id)?;

    let lab = service.record_lab_test(abnormal_creatinine(&id))?;
    println!("  Recorded Creatinine [Abnormal]");
    let abnormal = score_of(&id)?;

    service.set_lab_status(&lab.id, LabStatus::Critical)?;
    println!("  Status patch → Critical");
    let critical = score_of(&id)?;

    service.revise_lab_test(
        &lab.id,
        LabTestUpdate {
            status: Some(LabStatus::Normal),
            doctor_notes: Some("Repeat sample within range.".to_string()),
            ..LabTestUpdate::default()
        },
    )?;
    println!("  Revised → Normal");
    let revised_normal = score_of(&id)?;

    service.remove_lab_test(&lab.id)?;
    println!("  Deleted lab report");
    let after_delete = score_of(&id)?;

    Ok(LifecycleScores {
        patient_id: id,
        baseline,
        abnormal,
        critical,
        revised_normal,
        after_delete,
    })
}

pub fn run_scenario() -> RiskwatchResult<()> {
    println!("=== Scenario 2: Lab Report Lifecycle ===");
    println!();

    let runtime = HospitalRuntime::new("ward-lab-lifecycle");
    let scores = execute(&runtime)?;
    println!();

    // A lab report that outlives its patient must not bring the patient back.
    let service = &runtime.service;
    let orphan = service.record_lab_test(abnormal_creatinine(&scores.patient_id))?;
    service.remove_patient(&scores.patient_id)?;
    service.set_lab_status(&orphan.id, LabStatus::Critical)?;

    let resurrected = service.patients().get_patient(&scores.patient_id).is_ok();
    println!("  Patient deleted, orphan lab patched");
    println!(
        "  Snapshot resurrected:   {}",
        if resurrected { "YES (unexpected)" } else { "no" }
    );

    match service.evaluate_risk(&scores.patient_id) {
        Err(RiskwatchError::PatientNotFound { .. }) => {
            println!("  evaluate_risk:          PatientNotFound (as expected)");
        }
        other => println!("  evaluate_risk:          unexpected {:?}", other),
    }

    println!();
    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
