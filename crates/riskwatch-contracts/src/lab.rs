//! Lab-test records and the summary projection the scoring engine reads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patient::PatientId;

/// Unique identifier of a lab-test record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabTestId(pub uuid::Uuid);

impl LabTestId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for LabTestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LabTestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Interpretation status of a lab test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LabStatus {
    Normal,
    Abnormal,
    Critical,
    #[default]
    Pending,
}

impl LabStatus {
    /// Critical and Abnormal results are the ones that carry risk.
    pub fn is_flagged(self) -> bool {
        matches!(self, LabStatus::Critical | LabStatus::Abnormal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TestCategory {
    #[serde(rename = "Blood Test")]
    BloodTest,
    #[serde(rename = "Urine Test")]
    UrineTest,
    Imaging,
    Pathology,
    Cardiology,
    Metabolic,
    #[serde(rename = "Liver Function")]
    LiverFunction,
    #[serde(rename = "Kidney Function")]
    KidneyFunction,
    #[default]
    Other,
}

/// One measured parameter inside a lab report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericValue {
    pub parameter: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<String>,
    #[serde(default)]
    pub is_abnormal: bool,
}

/// A lab-test record as held by the lab-test store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub id: LabTestId,
    pub patient_id: PatientId,
    pub test_type: String,
    pub test_category: TestCategory,
    pub test_date: DateTime<Utc>,
    pub status: LabStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_results: Option<String>,
    #[serde(default)]
    pub numeric_values: Vec<NumericValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LabTest {
    /// The read projection consumed by the scoring engine.
    pub fn summary(&self) -> LabTestSummary {
        LabTestSummary {
            test_type: self.test_type.clone(),
            status: self.status,
        }
    }
}

/// `{ testType, status }`, the projection the scoring engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTestSummary {
    #[serde(default)]
    pub test_type: String,
    pub status: LabStatus,
}

impl LabTestSummary {
    pub fn new(test_type: impl Into<String>, status: LabStatus) -> Self {
        Self {
            test_type: test_type.into(),
            status,
        }
    }
}

/// Fields supplied when recording a new lab test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLabTest {
    pub patient_id: PatientId,
    pub test_type: String,
    #[serde(default)]
    pub test_category: TestCategory,
    /// Defaults to the time of insertion.
    #[serde(default)]
    pub test_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: LabStatus,
    #[serde(default)]
    pub results: Option<String>,
    #[serde(default)]
    pub key_results: Option<String>,
    #[serde(default)]
    pub numeric_values: Vec<NumericValue>,
    #[serde(default)]
    pub doctor_notes: Option<String>,
}

impl NewLabTest {
    /// A record carrying only the fields the scoring engine reads.
    pub fn new(patient_id: PatientId, test_type: impl Into<String>, status: LabStatus) -> Self {
        Self {
            patient_id,
            test_type: test_type.into(),
            test_category: TestCategory::Other,
            test_date: None,
            status,
            results: None,
            key_results: None,
            numeric_values: Vec::new(),
            doctor_notes: None,
        }
    }
}

/// A partial lab-test update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTestUpdate {
    #[serde(default)]
    pub test_type: Option<String>,
    #[serde(default)]
    pub test_category: Option<TestCategory>,
    #[serde(default)]
    pub status: Option<LabStatus>,
    #[serde(default)]
    pub results: Option<String>,
    #[serde(default)]
    pub key_results: Option<String>,
    #[serde(default)]
    pub doctor_notes: Option<String>,
}

impl LabTestUpdate {
    /// A status-only patch.
    pub fn status(status: LabStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
