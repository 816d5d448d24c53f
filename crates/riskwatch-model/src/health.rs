//! The lifestyle-aware health score.
//!
//! Starts from 100 and deducts per finding:
//!
//! | finding                      | deduction |
//! |------------------------------|-----------|
//! | age over 60 / over 45        | 20 / 10   |
//! | each chronic condition       | 8         |
//! | smoking                      | 15        |
//! | alcohol                      | 10        |
//! | low exercise                 | 8         |
//! | each Critical lab reading    | 12        |
//!
//! The result is clamped to [0, 100].

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use riskwatch_contracts::{
    health::{ExerciseLevel, HealthPrediction, HealthScore, HealthScoreInput},
    lab::LabStatus,
};
use riskwatch_core::traits::HealthScorer;

use crate::engine::age_on;

/// A stateless model with fixed deductions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthScoreModel;

impl HealthScoreModel {
    pub fn new() -> Self {
        Self
    }

    /// Score as of the current wall-clock time.
    pub fn score(&self, input: &HealthScoreInput) -> HealthScore {
        self.score_at(input, Utc::now())
    }
}

impl HealthScorer for HealthScoreModel {
    /// An unparsable date of birth skips the age deduction.
    fn score_at(&self, input: &HealthScoreInput, now: DateTime<Utc>) -> HealthScore {
        let mut score: i32 = 100;
        let mut factors: Vec<String> = Vec::new();

        match age_on(&input.date_of_birth, now) {
            Ok(age) if age > 60 => {
                score -= 20;
                factors.push("Advanced age".to_string());
            }
            Ok(age) if age > 45 => score -= 10,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "health score computed without age"),
        }

        for condition in &input.chronic_conditions {
            score -= 8;
            factors.push(condition.clone());
        }

        let lifestyle = &input.lifestyle;
        if lifestyle.smoking {
            score -= 15;
            factors.push("Smoking".to_string());
        }
        if lifestyle.alcohol {
            score -= 10;
            factors.push("Alcohol consumption".to_string());
        }
        if lifestyle.exercise == Some(ExerciseLevel::Low) {
            score -= 8;
            factors.push("Low physical activity".to_string());
        }

        for reading in &input.recent_lab_results {
            if reading.status == LabStatus::Critical {
                score -= 12;
                factors.push(format!("Critical {}", reading.parameter));
            }
        }

        let current = score.clamp(0, 100) as u8;
        let prediction = HealthPrediction::from_score(current);
        debug!(health_score = current, prediction = ?prediction, "health score computed");

        HealthScore {
            current,
            risk_factors: dedup_in_order(factors),
            prediction,
            calculated_at: now,
        }
    }
}

fn dedup_in_order(factors: Vec<String>) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::with_capacity(factors.len());
    for factor in factors {
        if !distinct.contains(&factor) {
            distinct.push(factor);
        }
    }
    distinct
}
