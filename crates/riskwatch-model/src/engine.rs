//! The v2.0.1 weighted risk model.
//!
//! Five sub-risks are computed independently, each clamped, then combined:
//!
//! 1. age           - banded by whole years
//! 2. conditions    - summed severities with multi-condition multipliers
//! 3. labs          - flagged results averaged over all tests
//! 4. allergies     - per-allergy weight plus a severe-allergy surcharge
//! 5. interactions  - high-risk conditions combined with flagged labs
//!
//! `riskScore = min(round(100 × Σ subRisk × weight), 100)` with
//! round-half-up. Any input problem yields a degraded `Unknown` assessment.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use riskwatch_contracts::{
    assessment::{AssessmentDetail, RiskAssessment, RiskBreakdown, RiskLevel},
    error::{RiskwatchError, RiskwatchResult},
    input::RiskInput,
    lab::{LabStatus, LabTestSummary},
};
use riskwatch_core::traits::RiskEvaluator;

use crate::{factors, tables::ModelTables, weights::RiskWeights};

pub const MODEL_VERSION: &str = "v2.0.1";
pub const MODEL_CONFIDENCE: f64 = 0.89;

/// A stateless scoring model over fixed weights and a lookup table.
#[derive(Debug, Clone, Default)]
pub struct RiskModel {
    tables: ModelTables,
}

impl RiskModel {
    /// The model with `ModelTables::standard()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The caller is responsible for passing validated tables; the TOML
    /// constructors on `ModelTables` validate already.
    pub fn with_tables(tables: ModelTables) -> Self {
        Self { tables }
    }

    pub fn weights(&self) -> RiskWeights {
        RiskWeights::STANDARD
    }

    pub fn tables(&self) -> &ModelTables {
        &self.tables
    }

    /// Evaluate as of the current wall-clock time.
    pub fn evaluate(&self, input: &RiskInput) -> RiskAssessment {
        self.evaluate_at(input, Utc::now())
    }

    /// Evaluate a loosely-typed JSON document (see `RiskInput::from_document`).
    ///
    /// A malformed document degrades the result instead of failing.
    pub fn evaluate_document(&self, doc: &Value, now: DateTime<Utc>) -> RiskAssessment {
        match RiskInput::from_document(doc) {
            Ok(input) => self.evaluate_at(&input, now),
            Err(e) => degrade(e, now),
        }
    }

    fn try_evaluate(&self, input: &RiskInput, now: DateTime<Utc>) -> RiskwatchResult<RiskAssessment> {
        let age = age_on(&input.date_of_birth, now)?;
        let weights = self.weights();

        let age_risk = age_risk(age);
        let conditions_risk = self.conditions_risk(&input.chronic_conditions);
        let labs_risk = lab_risk(&self.tables, &input.lab_tests);
        let allergies_risk = self.allergies_risk(&input.allergies);
        let interactions_risk = self.interactions_risk(&input.chronic_conditions, &input.lab_tests);

        let total = age_risk * weights.age
            + conditions_risk * weights.conditions
            + labs_risk * weights.labs
            + allergies_risk * weights.allergies
            + interactions_risk * weights.interactions;

        let risk_score = to_percent(total);
        let risk_level = RiskLevel::from_score(risk_score);

        debug!(
            age,
            risk_score,
            risk_level = %risk_level,
            "risk evaluated"
        );

        Ok(RiskAssessment {
            risk_score,
            risk_level,
            detail: Some(AssessmentDetail {
                breakdown: RiskBreakdown {
                    age: to_percent(age_risk),
                    conditions: to_percent(conditions_risk),
                    labs: to_percent(labs_risk),
                    allergies: to_percent(allergies_risk),
                    interactions: to_percent(interactions_risk),
                },
                risk_factors: factors::risk_factors(input, age),
                recommendations: factors::recommendations(risk_score, input),
                model_version: MODEL_VERSION.to_string(),
                confidence: MODEL_CONFIDENCE,
            }),
            error: None,
            calculated_at: now,
        })
    }

    /// Every listed condition counts toward the multipliers, matched or not.
    pub fn conditions_risk(&self, conditions: &[String]) -> f64 {
        if conditions.is_empty() {
            return 0.0;
        }

        let mut total: f64 = conditions
            .iter()
            .map(|c| self.tables.condition_severity(c))
            .fold(0.0, |acc, s| acc + s);

        if conditions.len() > 1 {
            total *= 1.1;
        }
        if conditions.len() > 3 {
            total *= 1.15;
        }
        total.min(1.0)
    }

    pub fn allergies_risk(&self, allergies: &[String]) -> f64 {
        if allergies.is_empty() {
            return 0.0;
        }

        let mut risk = allergies.len() as f64 * 0.05;
        for allergy in allergies {
            if self.tables.is_severe_allergy(allergy) {
                risk += 0.10;
            }
        }
        risk.min(0.50)
    }

    /// Each matched high-risk condition rescans the labs.
    pub fn interactions_risk(&self, conditions: &[String], labs: &[LabTestSummary]) -> f64 {
        let lowered: Vec<String> = conditions.iter().map(|c| c.to_lowercase()).collect();
        let mut risk = 0.0;

        for high_risk in &self.tables.high_risk_conditions {
            if lowered.iter().any(|c| c.contains(high_risk.as_str())) {
                risk += 0.10;
                for test in labs {
                    if test.status.is_flagged() {
                        risk += 0.05;
                    }
                }
            }
        }

        if conditions.len() > 2 {
            risk += 0.10;
        }
        f64::min(risk, 1.0)
    }
}

impl RiskEvaluator for RiskModel {
    fn evaluate_at(&self, input: &RiskInput, now: DateTime<Utc>) -> RiskAssessment {
        match self.try_evaluate(input, now) {
            Ok(assessment) => assessment,
            Err(e) => degrade(e, now),
        }
    }
}

fn degrade(error: RiskwatchError, now: DateTime<Utc>) -> RiskAssessment {
    let message = error.to_string();
    warn!(error = %message, "risk evaluation degraded");
    RiskAssessment::degraded(message, now)
}

/// Whole years between `date_of_birth` and `now`, decremented while this
/// year's birthday is still ahead. Accepts `YYYY-MM-DD` or RFC 3339.
pub fn age_on(date_of_birth: &str, now: DateTime<Utc>) -> RiskwatchResult<i32> {
    let born = parse_birth_date(date_of_birth)?;
    let today = now.date_naive();

    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    Ok(age)
}

fn parse_birth_date(s: &str) -> RiskwatchResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| RiskwatchError::InvalidInput {
            reason: format!("invalid date of birth '{}'", s),
        })
}

pub fn age_risk(age: i32) -> f64 {
    match age {
        ..=17 => 0.05,
        18..=29 => 0.10,
        30..=44 => 0.15,
        45..=59 => 0.25,
        60..=74 => 0.40,
        _ => 0.60,
    }
}

/// Flagged results weighted by status and test type, averaged over every
/// test, with multipliers for repeated flagged results.
pub fn lab_risk(tables: &ModelTables, labs: &[LabTestSummary]) -> f64 {
    if labs.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    let mut flagged = 0usize;

    for test in labs {
        let base = match test.status {
            LabStatus::Critical => 0.40,
            LabStatus::Abnormal => 0.25,
            LabStatus::Normal | LabStatus::Pending => continue,
        };
        flagged += 1;
        total += base * tables.lab_type_factor(&test.test_type);
    }

    let mut average = total / labs.len() as f64;
    if flagged > 2 {
        average *= 1.2;
    }
    if flagged > 4 {
        average *= 1.3;
    }
    average.min(1.0)
}

/// `round(100 × x)` half-up, clamped to [0, 100].
fn to_percent(x: f64) -> u8 {
    (x * 100.0 + 0.5).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::to_percent;

    #[test]
    fn test_to_percent_rounds_half_up() {
        assert_eq!(to_percent(0.415), 42);
        assert_eq!(to_percent(0.005), 1);
        assert_eq!(to_percent(0.004), 0);
        assert_eq!(to_percent(1.7), 100);
    }
}
