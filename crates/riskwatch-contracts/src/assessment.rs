//! The persisted risk snapshot and its parts.
//!
//! A `RiskAssessment` is either complete (it carries an `AssessmentDetail`)
//! or degraded (`risk_level == Unknown`, `error` set, no detail). The JSON
//! shape flattens the detail into the top-level object, so a degraded
//! snapshot serializes as just `{riskScore, riskLevel, error, calculatedAt}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Banding of the composite risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
    /// The score could not be computed; see `RiskAssessment::error`.
    Unknown,
}

impl RiskLevel {
    /// Map a composite score to its band: ≥75 Critical, ≥50 High, ≥30 Medium,
    /// ≥15 Low, otherwise Minimal.
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => RiskLevel::Critical,
            50..=74 => RiskLevel::High,
            30..=49 => RiskLevel::Medium,
            15..=29 => RiskLevel::Low,
            _ => RiskLevel::Minimal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Minimal => "Minimal",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
            RiskLevel::Unknown => "Unknown",
        }
    }

    pub fn is_high_risk(self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Per-factor sub-risks rescaled to 0-100.
///
/// These are the raw, unweighted magnitudes. They do not add up to
/// `risk_score` once weighted and are kept for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub age: u8,
    pub conditions: u8,
    pub labs: u8,
    pub allergies: u8,
    pub interactions: u8,
}

impl RiskBreakdown {
    pub fn values(&self) -> [u8; 5] {
        [
            self.age,
            self.conditions,
            self.labs,
            self.allergies,
            self.interactions,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub action: String,
    pub description: String,
}

/// The parts of a snapshot that only a successful evaluation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDetail {
    pub breakdown: RiskBreakdown,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<Recommendation>,
    pub model_version: String,
    pub confidence: f64,
}

/// The risk snapshot embedded on a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    #[serde(flatten)]
    pub detail: Option<AssessmentDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub calculated_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// The zero snapshot a patient carries before its first evaluation.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            risk_score: 0,
            risk_level: RiskLevel::Minimal,
            detail: None,
            error: None,
            calculated_at: now,
        }
    }

    /// The result of an evaluation that could not be completed.
    pub fn degraded(error: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            risk_score: 0,
            risk_level: RiskLevel::Unknown,
            detail: None,
            error: Some(error.into()),
            calculated_at: now,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.risk_level == RiskLevel::Unknown
    }

    /// True for the zero snapshot created with the patient.
    pub fn is_initial(&self) -> bool {
        self.risk_level == RiskLevel::Minimal
            && self.risk_score == 0
            && self.detail.is_none()
            && self.error.is_none()
    }

    pub fn breakdown(&self) -> Option<&RiskBreakdown> {
        self.detail.as_ref().map(|d| &d.breakdown)
    }

    pub fn risk_factors(&self) -> &[RiskFactor] {
        self.detail
            .as_ref()
            .map(|d| d.risk_factors.as_slice())
            .unwrap_or_default()
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        self.detail
            .as_ref()
            .map(|d| d.recommendations.as_slice())
            .unwrap_or_default()
    }

    /// The history entry recorded when this snapshot is superseded.
    pub fn to_history_entry(&self) -> RiskHistoryEntry {
        RiskHistoryEntry {
            risk_score: self.risk_score,
            risk_level: self.risk_level,
            calculated_at: self.calculated_at,
        }
    }
}

/// A superseded snapshot, reduced to what trend views need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskHistoryEntry {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub calculated_at: DateTime<Utc>,
}
