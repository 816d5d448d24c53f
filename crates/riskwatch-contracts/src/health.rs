//! The lifestyle-aware health score kept alongside the risk snapshot.
//!
//! Unlike `RiskAssessment`, which the trigger recomputes on every mutation,
//! a health score is computed on request from caller-supplied lifestyle data
//! and recent lab readings. Each new score pushes the previous one onto the
//! patient's `health_score_history`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lab::LabStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseLevel {
    Low,
    Moderate,
    High,
}

/// Self-reported habits. Missing fields count as "no risk".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifestyle {
    #[serde(default)]
    pub smoking: bool,
    #[serde(default)]
    pub alcohol: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<ExerciseLevel>,
}

/// One recent lab reading, e.g. `{ "parameter": "Potassium", "status": "Critical" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabReading {
    pub parameter: String,
    pub status: LabStatus,
}

impl LabReading {
    pub fn new(parameter: impl Into<String>, status: LabStatus) -> Self {
        Self {
            parameter: parameter.into(),
            status,
        }
    }
}

/// What a caller supplies when requesting a new health score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreRequest {
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub lab_results: Vec<LabReading>,
}

/// The full input of the health score model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreInput {
    pub date_of_birth: String,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub recent_lab_results: Vec<LabReading>,
}

/// Outlook band derived from the health score (higher score, lower risk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthPrediction {
    #[serde(rename = "Low risk")]
    LowRisk,
    #[serde(rename = "Moderate risk")]
    ModerateRisk,
    #[serde(rename = "High risk")]
    HighRisk,
}

impl HealthPrediction {
    /// ≥80 Low risk, ≥50 Moderate risk, otherwise High risk.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => HealthPrediction::LowRisk,
            50..=79 => HealthPrediction::ModerateRisk,
            _ => HealthPrediction::HighRisk,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    /// 0 (worst) to 100 (best).
    pub current: u8,
    /// Distinct contributing factors in the order they were found.
    pub risk_factors: Vec<String>,
    pub prediction: HealthPrediction,
    pub calculated_at: DateTime<Utc>,
}

impl HealthScore {
    pub fn to_history_entry(&self) -> HealthScoreHistoryEntry {
        HealthScoreHistoryEntry {
            score: self.current,
            date: self.calculated_at,
            factors: self.risk_factors.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreHistoryEntry {
    pub score: u8,
    pub date: DateTime<Utc>,
    pub factors: Vec<String>,
}
