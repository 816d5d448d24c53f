//! The input aggregator: patient fields plus current lab summaries.

use tracing::debug;

use riskwatch_contracts::{error::RiskwatchResult, input::RiskInput, patient::PatientId};

use crate::traits::{LabTestStore, PatientStore};

/// Build the `RiskInput` for `patient_id` from the latest committed state.
///
/// Returns `PatientNotFound` when the patient does not exist; the lab store
/// is not queried in that case.
pub fn gather_input(
    patients: &dyn PatientStore,
    labs: &dyn LabTestStore,
    patient_id: &PatientId,
) -> RiskwatchResult<RiskInput> {
    let patient = patients.get_patient(patient_id)?;
    let lab_tests: Vec<_> = labs
        .list_for_patient(patient_id)?
        .iter()
        .map(|t| t.summary())
        .collect();

    debug!(
        patient_id = %patient_id,
        conditions = patient.medical_info.chronic_conditions.len(),
        allergies = patient.medical_info.allergies.len(),
        lab_tests = lab_tests.len(),
        "risk input gathered"
    );

    Ok(RiskInput {
        date_of_birth: patient.personal_info.date_of_birth,
        chronic_conditions: patient.medical_info.chronic_conditions,
        allergies: patient.medical_info.allergies,
        lab_tests,
    })
}
