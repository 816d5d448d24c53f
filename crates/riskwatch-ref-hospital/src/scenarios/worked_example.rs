//! Scenario 1: Worked Example
//!
//! A 70-year-old patient with Diabetes and Hypertension, a peanut allergy,
//! one critical glucose result and one normal CBC. The final snapshot must
//! score 42 (Medium) with breakdown {40, 72, 26, 15, 30}.
//!
//!   1. Register the patient → initial recompute (no labs yet)
//!   2. Record the critical glucose → recompute
//!   3. Record the normal CBC → recompute
//!   4. Inspect snapshot, history and journal

use chrono::Utc;

use riskwatch_contracts::{
    error::RiskwatchResult,
    patient::Patient,
};

use crate::{
    mock_data::{critical_glucose, margaret_ellis, normal_cbc},
    runtime::HospitalRuntime,
    scenarios::describe,
};

/// Drive `runtime` through the worked example and return the final patient.
pub fn execute(runtime: &HospitalRuntime) -> RiskwatchResult<Patient> {
    let service = &runtime.service;

    let patient = service.register_patient(margaret_ellis(Utc::now()))?;
    let id = patient.patient_id.clone();
    println!("  Registered {} ({})", patient.full_name(), id);
    println!("    snapshot: {}", describe(&patient.risk_assessment));

    service.record_lab_test(critical_glucose(&id))?;
    println!("  Recorded Glucose [Critical]");
    println!(
        "    snapshot: {}",
        describe(&service.patients().get_patient(&id)?.risk_assessment)
    );

    service.record_lab_test(normal_cbc(&id))?;
    println!("  Recorded CBC [Normal]");

    service.patients().get_patient(&id)
}

pub fn run_scenario() -> RiskwatchResult<()> {
    println!("=== Scenario 1: Worked Example ===");
    println!();

    let runtime = HospitalRuntime::new("ward-worked-example");
    let patient = execute(&runtime)?;
    let assessment = &patient.risk_assessment;

    println!("    snapshot: {}", describe(assessment));
    println!();
    println!("  Risk factors:");
    for factor in assessment.risk_factors() {
        println!("    - {} ({:?}): {}", factor.factor, factor.severity, factor.description);
    }
    println!("  Recommendations:");
    for rec in assessment.recommendations() {
        println!("    - [{:?}] {}: {}", rec.priority, rec.action, rec.description);
    }
    println!();
    println!("  History entries:        {}", patient.risk_history.len());
    println!(
        "  Journal integrity:      {} ({} entries)",
        if runtime.journal.verify_integrity()? { "VERIFIED" } else { "FAILED" },
        runtime.journal.len()?
    );
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
