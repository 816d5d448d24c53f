//! Hospital reference scenarios.
//!
//! Each scenario wires a fresh `HospitalRuntime`, drives it through one
//! mutation pattern with mock data and prints what the recalculation
//! trigger did.

pub mod bulk_delete;
pub mod concurrent_writes;
pub mod degraded_input;
pub mod lab_lifecycle;
pub mod worked_example;

use riskwatch_contracts::assessment::RiskAssessment;

/// One-line rendering of a snapshot for scenario output.
pub(crate) fn describe(assessment: &RiskAssessment) -> String {
    match (assessment.breakdown(), assessment.error.as_deref()) {
        (_, Some(error)) => format!(
            "{} / {} (error: {})",
            assessment.risk_score, assessment.risk_level, error
        ),
        (Some(b), None) => format!(
            "{} / {}  [age {}, conditions {}, labs {}, allergies {}, interactions {}]",
            assessment.risk_score,
            assessment.risk_level,
            b.age,
            b.conditions,
            b.labs,
            b.allergies,
            b.interactions
        ),
        (None, None) => format!("{} / {}", assessment.risk_score, assessment.risk_level),
    }
}
