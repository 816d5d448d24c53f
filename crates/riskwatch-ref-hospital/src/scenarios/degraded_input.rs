//! Scenario 5: Degraded Input
//!
//! A patient whose date of birth was captured as free text cannot be scored.
//! The model yields an `Unknown` assessment carrying the error, the verifier
//! accepts its degraded shape, and it is persisted and journaled like any
//! other snapshot. Correcting the date of birth recovers a full assessment.

use riskwatch_contracts::{
    assessment::{RiskAssessment, RiskLevel},
    error::RiskwatchResult,
    patient::{PatientId, PatientUpdate},
};

use crate::{mock_data::unparsed_birth_date_patient, runtime::HospitalRuntime, scenarios::describe};

#[derive(Debug)]
pub struct DegradedOutcome {
    pub patient_id: PatientId,
    pub degraded: RiskAssessment,
    pub recovered: RiskAssessment,
}

pub fn execute(runtime: &HospitalRuntime) -> RiskwatchResult<DegradedOutcome> {
    let service = &runtime.service;

    let patient = service.register_patient(unparsed_birth_date_patient())?;
    let id = patient.patient_id.clone();
    println!(
        "  Registered {} with date of birth '{}'",
        patient.full_name(),
        patient.personal_info.date_of_birth
    );
    println!("  Snapshot: {}", describe(&patient.risk_assessment));
    if let Some(error) = &patient.risk_assessment.error {
        println!("  Error:    {}", error);
    }
    let degraded = patient.risk_assessment;

    let mut personal = patient.personal_info;
    personal.date_of_birth = "1960-05-04".to_string();
    let corrected = service.update_patient(
        &id,
        PatientUpdate {
            personal_info: Some(personal),
            ..PatientUpdate::default()
        },
    )?;
    println!();
    println!("  Corrected date of birth → {}", describe(&corrected.risk_assessment));

    Ok(DegradedOutcome {
        patient_id: id,
        degraded,
        recovered: corrected.risk_assessment,
    })
}

pub fn run_scenario() -> RiskwatchResult<()> {
    println!("=== Scenario 5: Degraded Input ===");
    println!();

    let runtime = HospitalRuntime::new("ward-degraded");
    let outcome = execute(&runtime)?;

    let records = runtime.journal.records_for(&outcome.patient_id)?;
    println!();
    for record in &records {
        println!(
            "  journal: {:<16} {:>3} {:<8} {}",
            record.event,
            record.risk_score,
            record.risk_level,
            record.error.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("  Scenario 5 complete.");
    println!();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
