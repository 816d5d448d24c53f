//! Fictional patients and lab reports for the reference scenarios.
//!
//! Nothing here refers to a real person.

use chrono::{DateTime, Datelike, Utc};

use riskwatch_contracts::{
    lab::{LabStatus, NewLabTest, NumericValue, TestCategory},
    patient::{Gender, MedicalInfo, NewPatient, PatientId, PersonalInfo},
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn personal(first: &str, last: &str, dob: &str, gender: Gender, phone: &str) -> PersonalInfo {
    PersonalInfo {
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: dob.to_string(),
        gender,
        phone_number: phone.to_string(),
        email: Some(format!(
            "{}.{}@example.org",
            first.to_lowercase(),
            last.to_lowercase()
        )),
    }
}

// ── Patients ──────────────────────────────────────────────────────────────────

/// 1985-06-15, Penicillin allergy, Hypertension.
pub fn john_doe() -> NewPatient {
    NewPatient {
        personal_info: personal("John", "Doe", "1985-06-15", Gender::Male, "555-0101"),
        medical_info: MedicalInfo {
            blood_group: Some("O+".to_string()),
            allergies: strings(&["Penicillin"]),
            chronic_conditions: strings(&["Hypertension"]),
        },
    }
}

/// 1992-03-22, no allergies, no chronic conditions.
pub fn sarah_johnson() -> NewPatient {
    NewPatient {
        personal_info: personal("Sarah", "Johnson", "1992-03-22", Gender::Female, "555-0201"),
        medical_info: MedicalInfo {
            blood_group: Some("A+".to_string()),
            allergies: vec![],
            chronic_conditions: vec![],
        },
    }
}

/// Born on 1 January seventy years before `now`, so exactly 70 on any day of
/// `now`'s year. Diabetes and Hypertension, allergic to peanuts.
pub fn margaret_ellis(now: DateTime<Utc>) -> NewPatient {
    let dob = format!("{}-01-01", now.year() - 70);
    NewPatient {
        personal_info: personal("Margaret", "Ellis", &dob, Gender::Female, "555-0301"),
        medical_info: MedicalInfo {
            blood_group: Some("B-".to_string()),
            allergies: strings(&["Peanuts"]),
            chronic_conditions: strings(&["Diabetes", "Hypertension"]),
        },
    }
}

/// A record whose date of birth was captured as free text.
pub fn unparsed_birth_date_patient() -> NewPatient {
    NewPatient {
        personal_info: personal("Ravi", "Menon", "sometime in 1960", Gender::Male, "555-0401"),
        medical_info: MedicalInfo {
            blood_group: None,
            allergies: vec![],
            chronic_conditions: strings(&["COPD"]),
        },
    }
}

// ── Lab reports ───────────────────────────────────────────────────────────────

pub fn critical_glucose(patient_id: &PatientId) -> NewLabTest {
    NewLabTest {
        test_category: TestCategory::BloodTest,
        key_results: Some("Fasting glucose 312 mg/dL".to_string()),
        numeric_values: vec![NumericValue {
            parameter: "Fasting glucose".to_string(),
            value: 312.0,
            unit: Some("mg/dL".to_string()),
            reference_range: Some("70-99".to_string()),
            is_abnormal: true,
        }],
        doctor_notes: Some("Repeat within 48 hours; review insulin regimen.".to_string()),
        ..NewLabTest::new(patient_id.clone(), "Glucose", LabStatus::Critical)
    }
}

pub fn normal_cbc(patient_id: &PatientId) -> NewLabTest {
    NewLabTest {
        test_category: TestCategory::BloodTest,
        key_results: Some("Hemoglobin 13.9 g/dL, WBC 6.1".to_string()),
        ..NewLabTest::new(patient_id.clone(), "CBC", LabStatus::Normal)
    }
}

pub fn pending_lipid_panel(patient_id: &PatientId) -> NewLabTest {
    NewLabTest {
        test_category: TestCategory::Metabolic,
        ..NewLabTest::new(patient_id.clone(), "Lipid Panel", LabStatus::Pending)
    }
}

pub fn abnormal_creatinine(patient_id: &PatientId) -> NewLabTest {
    NewLabTest {
        test_category: TestCategory::KidneyFunction,
        key_results: Some("Serum creatinine 1.9 mg/dL".to_string()),
        ..NewLabTest::new(patient_id.clone(), "Creatinine", LabStatus::Abnormal)
    }
}
