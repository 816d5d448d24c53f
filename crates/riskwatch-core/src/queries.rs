//! Read-side views over the stores.

use chrono::{DateTime, Duration, Utc};

use riskwatch_contracts::{
    error::{RiskwatchError, RiskwatchResult},
    lab::{LabStatus, LabTest},
    patient::{Patient, PatientStatus},
};

use crate::traits::{LabTestStore, PatientStore};

/// Active patients whose snapshot is High or Critical, highest score first.
pub fn high_risk_patients(patients: &dyn PatientStore) -> RiskwatchResult<Vec<Patient>> {
    let mut found: Vec<Patient> = patients
        .list_patients()?
        .into_iter()
        .filter(|p| p.status == PatientStatus::Active && p.risk_assessment.risk_level.is_high_risk())
        .collect();
    found.sort_by(|a, b| b.risk_assessment.risk_score.cmp(&a.risk_assessment.risk_score));
    Ok(found)
}

/// Abnormal and Critical lab tests dated within the last `days` days of `now`,
/// newest first.
///
/// # Errors
///
/// `InvalidInput` when `days` is negative or reaches past the representable
/// date range.
pub fn recent_flagged_lab_tests(
    labs: &dyn LabTestStore,
    days: i64,
    now: DateTime<Utc>,
) -> RiskwatchResult<Vec<LabTest>> {
    if days < 0 {
        return Err(RiskwatchError::InvalidInput {
            reason: format!("look-back window must not be negative, got {} days", days),
        });
    }
    let cutoff = Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| RiskwatchError::InvalidInput {
            reason: format!("look-back window of {} days is out of range", days),
        })?;
    let mut found: Vec<LabTest> = labs
        .list_all()?
        .into_iter()
        .filter(|t| t.status.is_flagged() && t.test_date >= cutoff)
        .collect();
    found.sort_by(|a, b| b.test_date.cmp(&a.test_date));
    Ok(found)
}

/// Every Critical lab test, newest first.
pub fn critical_lab_tests(labs: &dyn LabTestStore) -> RiskwatchResult<Vec<LabTest>> {
    let mut found: Vec<LabTest> = labs
        .list_all()?
        .into_iter()
        .filter(|t| t.status == LabStatus::Critical)
        .collect();
    found.sort_by(|a, b| b.test_date.cmp(&a.test_date));
    Ok(found)
}
