//! Patient identity, demographic and medical record types.
//!
//! A `Patient` embeds its current `RiskAssessment` snapshot; the snapshot has
//! no lifetime of its own and disappears with the patient.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    assessment::{RiskAssessment, RiskHistoryEntry},
    health::{HealthScore, HealthScoreHistoryEntry},
};

/// Human-readable patient identifier, e.g. `PatientId("PAT0042")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatientId(pub String);

impl PatientId {
    /// Prefix shared by every generated identifier.
    pub const PREFIX: &'static str = "PAT";

    /// Build the identifier for the `n`th registered patient (`PAT0001`, …).
    pub fn from_sequence(n: u64) -> Self {
        Self(format!("{}{:04}", Self::PREFIX, n))
    }

    /// Parse the numeric part of a generated identifier.
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(Self::PREFIX)?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Administrative status of a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatientStatus {
    #[default]
    Active,
    Inactive,
    Discharged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    /// Stored as received from the caller (`YYYY-MM-DD` or RFC 3339).
    ///
    /// Parsing happens inside the scoring engine so that a malformed value
    /// degrades the assessment instead of rejecting the whole record.
    pub date_of_birth: String,
    pub gender: Gender,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
}

/// A patient record as held by the patient store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub patient_id: PatientId,
    pub personal_info: PersonalInfo,
    pub medical_info: MedicalInfo,
    /// The current snapshot. Replaced as a whole on every recompute.
    pub risk_assessment: RiskAssessment,
    /// Superseded snapshots, oldest first.
    #[serde(default)]
    pub risk_history: Vec<RiskHistoryEntry>,
    /// Absent until the first health score request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<HealthScore>,
    /// Superseded health scores, oldest first.
    #[serde(default)]
    pub health_score_history: Vec<HealthScoreHistoryEntry>,
    pub status: PatientStatus,
    pub registration_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.personal_info.first_name, self.personal_info.last_name
        )
    }
}

/// Fields supplied when registering a new patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub medical_info: MedicalInfo,
}

/// A partial update. `None` leaves the corresponding section untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    #[serde(default)]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default)]
    pub medical_info: Option<MedicalInfo>,
    #[serde(default)]
    pub status: Option<PatientStatus>,
}

impl PatientUpdate {
    pub fn is_empty(&self) -> bool {
        self.personal_info.is_none() && self.medical_info.is_none() && self.status.is_none()
    }
}
