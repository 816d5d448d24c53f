//! # riskwatch-model
//!
//! The deterministic v2.0.1 risk scoring model.
//!
//! ## Overview
//!
//! [`RiskModel`] implements the
//! [`RiskEvaluator`](riskwatch_core::traits::RiskEvaluator) trait. Weights are
//! the fixed [`RiskWeights::STANDARD`]; the condition severities, severe
//! allergy keywords, lab-type multipliers and high-risk conditions come from
//! [`ModelTables`], which can be loaded from TOML.
//!
//! [`HealthScoreModel`] is the separate lifestyle-aware health score, computed
//! on request rather than on every mutation.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use riskwatch_model::{ModelTables, RiskModel};
//!
//! let model = RiskModel::with_tables(ModelTables::from_file(Path::new("tables/standard.toml"))?);
//! let assessment = model.evaluate(&input);
//! ```

pub mod engine;
pub mod factors;
pub mod health;
pub mod tables;
pub mod weights;

pub use engine::{RiskModel, MODEL_CONFIDENCE, MODEL_VERSION};
pub use health::HealthScoreModel;
pub use tables::{LabTypeMultiplier, ModelTables};
pub use weights::RiskWeights;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    use riskwatch_contracts::{
        assessment::{Priority, RiskBreakdown, RiskLevel, Severity},
        error::RiskwatchError,
        health::{ExerciseLevel, HealthPrediction, HealthScoreInput, LabReading, Lifestyle},
        input::RiskInput,
        lab::{LabStatus, LabTestSummary},
    };
    use riskwatch_core::traits::{HealthScorer, RiskEvaluator};

    use crate::engine::{age_on, lab_risk};
    use crate::{HealthScoreModel, ModelTables, RiskModel, RiskWeights};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Age 70 on 2026-01-15, two conditions, one critical glucose among two
    /// labs, one severe allergy.
    fn worked_example() -> RiskInput {
        RiskInput {
            date_of_birth: "1955-06-01".to_string(),
            chronic_conditions: strings(&["Diabetes", "Hypertension"]),
            allergies: strings(&["Peanuts"]),
            lab_tests: vec![
                LabTestSummary::new("Glucose", LabStatus::Critical),
                LabTestSummary::new("CBC", LabStatus::Normal),
            ],
        }
    }

    // ── 1. worked example ─────────────────────────────────────────────────────

    #[test]
    fn test_worked_example_scores_42_medium() {
        let model = RiskModel::new();
        let assessment = model.evaluate_at(&worked_example(), at(2026, 1, 15));

        assert_eq!(assessment.risk_score, 42);
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
        assert_eq!(
            assessment.breakdown(),
            Some(&RiskBreakdown {
                age: 40,
                conditions: 72,
                labs: 26,
                allergies: 15,
                interactions: 30,
            })
        );

        let detail = assessment.detail.as_ref().unwrap();
        assert_eq!(detail.model_version, "v2.0.1");
        assert_eq!(detail.confidence, 0.89);
        assert_eq!(assessment.calculated_at, at(2026, 1, 15));
        assert!(assessment.error.is_none());
    }

    #[test]
    fn test_worked_example_factors_and_recommendations() {
        let assessment = RiskModel::new().evaluate_at(&worked_example(), at(2026, 1, 15));

        let factors: Vec<(&str, Severity)> = assessment
            .risk_factors()
            .iter()
            .map(|f| (f.factor.as_str(), f.severity))
            .collect();
        assert_eq!(
            factors,
            vec![
                ("Advanced Age", Severity::Medium),
                ("Chronic Condition", Severity::Medium),
                ("Critical Lab Results", Severity::High),
            ]
        );
        assert_eq!(
            assessment.risk_factors()[0].description,
            "Patient is 70 years old, increasing health risks"
        );
        assert_eq!(
            assessment.risk_factors()[1].description,
            "Diagnosed with: Diabetes, Hypertension"
        );

        let actions: Vec<(&str, Priority)> = assessment
            .recommendations()
            .iter()
            .map(|r| (r.action.as_str(), r.priority))
            .collect();
        assert_eq!(
            actions,
            vec![
                ("Routine Check-up", Priority::Low),
                ("Preventive Care", Priority::Low),
                ("Diabetes Management", Priority::Medium),
                ("Blood Pressure Monitoring", Priority::Medium),
                ("Lab Result Follow-up", Priority::High),
            ]
        );
        assert_eq!(
            assessment.recommendations()[4].description,
            "Review and address critical findings in: Glucose"
        );
    }

    // ── 2. weights and ranges ─────────────────────────────────────────────────

    #[test]
    fn test_weights_sum_to_one() {
        assert!((RiskWeights::STANDARD.sum() - 1.0).abs() < 1e-12);
        assert_eq!(RiskModel::new().weights(), RiskWeights::STANDARD);
    }

    #[test]
    fn test_extreme_input_stays_in_range() {
        let input = RiskInput {
            date_of_birth: "1930-01-01".to_string(),
            chronic_conditions: strings(&[
                "Diabetes",
                "Heart Disease",
                "Hypertension",
                "Kidney Disease",
                "Cancer",
            ]),
            allergies: strings(&["Penicillin", "Latex", "Sulfa drugs", "Shellfish", "Dust"]),
            lab_tests: (0..6)
                .map(|_| LabTestSummary::new("Fasting Glucose", LabStatus::Critical))
                .collect(),
        };

        let assessment = RiskModel::new().evaluate_at(&input, at(2026, 6, 1));
        assert!(assessment.risk_score <= 100);
        assert_eq!(assessment.risk_level, RiskLevel::Critical);

        let breakdown = assessment.breakdown().unwrap();
        assert!(breakdown.values().iter().all(|v| *v <= 100));
        assert_eq!(breakdown.conditions, 100);
        assert_eq!(breakdown.allergies, 50, "allergies clamp at 0.5");
        assert_eq!(breakdown.interactions, 100);

        assert_eq!(assessment.recommendations()[0].action, "Immediate Medical Review Required");
    }

    #[test]
    fn test_empty_record_scores_age_only() {
        let input = RiskInput {
            date_of_birth: "2000-01-01".to_string(),
            ..RiskInput::default()
        };
        let assessment = RiskModel::new().evaluate_at(&input, at(2026, 6, 1));

        // 26 years old: 0.10 × 0.20 = 0.02
        assert_eq!(assessment.risk_score, 2);
        assert_eq!(assessment.risk_level, RiskLevel::Minimal);
        assert!(assessment.risk_factors().is_empty());
        assert!(assessment.recommendations().is_empty());
    }

    // ── 3. determinism and monotonicity ───────────────────────────────────────

    #[test]
    fn test_identical_input_and_instant_is_deterministic() {
        let model = RiskModel::new();
        let now = at(2026, 3, 3);
        let first = model.evaluate_at(&worked_example(), now);
        let second = model.evaluate_at(&worked_example(), now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_labs_monotonic_in_added_critical_tests() {
        let tables = ModelTables::standard();
        let mut labs: Vec<LabTestSummary> = (0..4)
            .map(|_| LabTestSummary::new("CBC", LabStatus::Normal))
            .collect();

        let mut previous = lab_risk(&tables, &labs);
        for _ in 0..8 {
            labs.push(LabTestSummary::new("CBC", LabStatus::Critical));
            let current = lab_risk(&tables, &labs);
            assert!(current >= previous, "{current} < {previous}");
            assert!(current <= 1.0);
            previous = current;
        }
    }

    #[test]
    fn test_pending_labs_only_dilute() {
        let tables = ModelTables::standard();
        let alone = lab_risk(&tables, &[LabTestSummary::new("HbA1c", LabStatus::Abnormal)]);
        let diluted = lab_risk(
            &tables,
            &[
                LabTestSummary::new("HbA1c", LabStatus::Abnormal),
                LabTestSummary::new("HbA1c", LabStatus::Pending),
            ],
        );
        assert!((alone - 0.325).abs() < 1e-12);
        assert!((diluted - alone / 2.0).abs() < 1e-12);
        assert_eq!(lab_risk(&tables, &[]), 0.0);
    }

    #[test]
    fn test_first_lab_multiplier_wins() {
        let tables = ModelTables::standard();
        // "glucose" precedes "kidney" in the table.
        assert_eq!(tables.lab_type_factor("Kidney Glucose Panel"), 1.3);
        assert_eq!(tables.lab_type_factor("Serum Creatinine"), 1.25);
        assert_eq!(tables.lab_type_factor("ALT"), 1.2);
        assert_eq!(tables.lab_type_factor("CBC"), 1.0);
    }

    // ── 4. conditions, allergies, interactions ────────────────────────────────

    #[test]
    fn test_unmatched_conditions_count_toward_multipliers() {
        let model = RiskModel::new();
        let risk = model.conditions_risk(&strings(&["Gout", "Migraine"]));
        assert!((risk - 0.30 * 1.1).abs() < 1e-12);

        // Condition lookup is exact: "Type 2 Diabetes" is not "diabetes".
        let exact = model.conditions_risk(&strings(&["Type 2 Diabetes"]));
        assert!((exact - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_interactions_rescan_labs_per_high_risk_condition() {
        let model = RiskModel::new();
        let labs = vec![
            LabTestSummary::new("Glucose", LabStatus::Abnormal),
            LabTestSummary::new("Lipid Panel", LabStatus::Critical),
        ];
        // Substring match: "type 2 diabetes" contains "diabetes".
        let risk = model.interactions_risk(&strings(&["Type 2 Diabetes", "Hypertension"]), &labs);
        assert!((risk - 0.40).abs() < 1e-12);
    }

    #[test]
    fn test_severe_allergy_substring_match() {
        let model = RiskModel::new();
        let risk = model.allergies_risk(&strings(&["Penicillin G", "Pollen"]));
        assert!((risk - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_condition_recommendations_are_case_sensitive() {
        let input = RiskInput {
            date_of_birth: "1990-01-01".to_string(),
            chronic_conditions: strings(&["diabetes", "HYPERTENSION"]),
            ..RiskInput::default()
        };
        let assessment = RiskModel::new().evaluate_at(&input, at(2026, 1, 1));
        assert!(assessment
            .recommendations()
            .iter()
            .all(|r| r.action != "Diabetes Management" && r.action != "Blood Pressure Monitoring"));
        // The scoring itself is case-insensitive.
        assert_eq!(assessment.breakdown().unwrap().conditions, 72);
    }

    // ── 5. age ────────────────────────────────────────────────────────────────

    #[test]
    fn test_age_decrements_before_birthday() {
        assert_eq!(age_on("1956-03-14", at(2026, 3, 13)).unwrap(), 69);
        assert_eq!(age_on("1956-03-14", at(2026, 3, 14)).unwrap(), 70);
        assert_eq!(age_on("1956-03-14T08:30:00Z", at(2026, 3, 14)).unwrap(), 70);
    }

    #[test]
    fn test_non_date_birth_degrades_to_unknown() {
        let input = RiskInput {
            date_of_birth: "not-a-date".to_string(),
            ..worked_example()
        };
        let assessment = RiskModel::new().evaluate_at(&input, at(2026, 1, 15));

        assert_eq!(assessment.risk_score, 0);
        assert_eq!(assessment.risk_level, RiskLevel::Unknown);
        assert!(assessment.is_degraded());
        let error = assessment.error.as_deref().unwrap();
        assert!(error.contains("not-a-date"), "error: {error}");
        assert!(assessment.detail.is_none());
    }

    // ── 6. documents ──────────────────────────────────────────────────────────

    #[test]
    fn test_document_with_non_array_field_degrades() {
        let doc = json!({
            "dateOfBirth": "1970-01-01",
            "chronicConditions": "Diabetes"
        });
        let assessment = RiskModel::new().evaluate_document(&doc, at(2026, 1, 1));
        assert_eq!(assessment.risk_level, RiskLevel::Unknown);
        assert!(assessment.error.unwrap().contains("chronicConditions"));
    }

    #[test]
    fn test_document_matches_typed_evaluation() {
        let doc = json!({
            "dateOfBirth": "1955-06-01",
            "chronicConditions": ["Diabetes", "Hypertension"],
            "allergies": ["Peanuts"],
            "labTests": [
                { "testType": "Glucose", "status": "Critical" },
                { "testType": "CBC", "status": "Normal" }
            ]
        });
        let model = RiskModel::new();
        let now = at(2026, 1, 15);
        assert_eq!(
            model.evaluate_document(&doc, now),
            model.evaluate_at(&worked_example(), now)
        );
    }

    // ── 7. tables ─────────────────────────────────────────────────────────────

    #[test]
    fn test_standard_toml_matches_builtin_tables() {
        let parsed = ModelTables::from_toml_str(include_str!("../tables/standard.toml")).unwrap();
        assert_eq!(parsed, ModelTables::standard());
    }

    #[test]
    fn test_custom_tables_change_condition_severity() {
        let toml = r#"
default_condition_severity = 0.15
severe_allergies = []
high_risk_conditions = []
lab_type_multipliers = []

[condition_severity]
gout = 0.50
"#;
        let model = RiskModel::with_tables(ModelTables::from_toml_str(toml).unwrap());
        assert!((model.conditions_risk(&strings(&["Gout"])) - 0.50).abs() < 1e-12);
        assert!((model.conditions_risk(&strings(&["Diabetes"])) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_toml_parse_error() {
        let result = ModelTables::from_toml_str("this is not [ valid toml");
        match result {
            Err(RiskwatchError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse"), "reason: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_severity_rejected() {
        let mut tables = ModelTables::standard();
        tables.condition_severity.insert("sepsis".to_string(), 1.5);
        match tables.validate() {
            Err(RiskwatchError::ConfigError { reason }) => {
                assert!(reason.contains("sepsis"), "reason: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_uppercase_keyword_rejected() {
        let mut tables = ModelTables::standard();
        tables.severe_allergies.push("Latex".to_string());
        assert!(tables.validate().is_err());

        let mut tables = ModelTables::standard();
        tables.lab_type_multipliers[0].factor = 0.0;
        assert!(tables.validate().is_err());
    }

    // ── 8. health score ───────────────────────────────────────────────────────

    fn health_input(dob: &str, conditions: &[&str]) -> HealthScoreInput {
        HealthScoreInput {
            date_of_birth: dob.to_string(),
            chronic_conditions: strings(conditions),
            lifestyle: Lifestyle::default(),
            recent_lab_results: vec![],
        }
    }

    #[test]
    fn test_health_score_deducts_every_finding() {
        let mut input = health_input("1950-03-01", &["Diabetes", "Hypertension", "Diabetes"]);
        input.lifestyle = Lifestyle {
            smoking: true,
            alcohol: false,
            exercise: Some(ExerciseLevel::Low),
        };
        input.recent_lab_results = vec![
            LabReading::new("Potassium", LabStatus::Critical),
            LabReading::new("CBC", LabStatus::Normal),
        ];

        let score = HealthScoreModel::new().score_at(&input, at(2026, 5, 20));

        // 100 - 20 (age 76) - 3×8 - 15 - 8 - 12
        assert_eq!(score.current, 21);
        assert_eq!(score.prediction, HealthPrediction::HighRisk);
        assert_eq!(
            score.risk_factors,
            strings(&[
                "Advanced age",
                "Diabetes",
                "Hypertension",
                "Smoking",
                "Low physical activity",
                "Critical Potassium",
            ])
        );
        assert_eq!(score.calculated_at, at(2026, 5, 20));
    }

    #[test]
    fn test_health_score_age_bands() {
        let model = HealthScoreModel::new();
        let now = at(2026, 5, 20);

        let young = model.score_at(&health_input("1996-01-01", &[]), now);
        assert_eq!(young.current, 100);
        assert_eq!(young.prediction, HealthPrediction::LowRisk);
        assert!(young.risk_factors.is_empty());

        // Middle age deducts without naming a factor.
        let middle = model.score_at(&health_input("1976-01-01", &[]), now);
        assert_eq!(middle.current, 90);
        assert!(middle.risk_factors.is_empty());

        let mut drinker = health_input("1976-01-01", &["Asthma", "COPD"]);
        drinker.lifestyle.alcohol = true;
        let moderate = model.score_at(&drinker, now);
        assert_eq!(moderate.current, 64);
        assert_eq!(moderate.prediction, HealthPrediction::ModerateRisk);
    }

    #[test]
    fn test_health_score_clamps_at_zero() {
        let mut input = health_input("1940-01-01", &["Cancer", "Stroke"]);
        input.recent_lab_results = (0..10)
            .map(|i| LabReading::new(format!("Panel {i}"), LabStatus::Critical))
            .collect();

        let score = HealthScoreModel::new().score_at(&input, at(2026, 5, 20));
        assert_eq!(score.current, 0);
        assert_eq!(score.prediction, HealthPrediction::HighRisk);
    }

    #[test]
    fn test_health_score_without_parsable_birth_date_skips_age() {
        let input = health_input("sometime in 1960", &["COPD"]);
        let score = HealthScoreModel::new().score_at(&input, at(2026, 5, 20));
        assert_eq!(score.current, 92);
        assert_eq!(score.risk_factors, strings(&["COPD"]));
    }
}
