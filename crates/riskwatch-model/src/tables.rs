//! Lookup tables consumed by the scoring model.
//!
//! `ModelTables` is deserialized from TOML and validated before use. The
//! built-in table is `ModelTables::standard()`; `tables/standard.toml` holds
//! the same values in file form.
//!
//! Example:
//! ```toml
//! default_condition_severity = 0.15
//! severe_allergies = ["penicillin", "latex"]
//! high_risk_conditions = ["diabetes"]
//!
//! [condition_severity]
//! diabetes = 0.35
//! "heart disease" = 0.45
//!
//! [[lab_type_multipliers]]
//! keywords = ["glucose", "hba1c"]
//! factor = 1.3
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use riskwatch_contracts::error::{RiskwatchError, RiskwatchResult};

/// A lab-type multiplier, applied when the lowercased test type contains any
/// of `keywords`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTypeMultiplier {
    pub keywords: Vec<String>,
    pub factor: f64,
}

impl LabTypeMultiplier {
    fn new(keywords: &[&str], factor: f64) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            factor,
        }
    }

    /// `test_type` must already be lowercased.
    pub fn matches(&self, test_type: &str) -> bool {
        self.keywords.iter().any(|k| test_type.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTables {
    /// Severity of a condition absent from `condition_severity`.
    pub default_condition_severity: f64,

    /// Exact lowercased condition name → severity in [0, 1].
    pub condition_severity: BTreeMap<String, f64>,

    /// Substring keywords marking an allergy as severe.
    pub severe_allergies: Vec<String>,

    /// Checked in order; the first match wins.
    pub lab_type_multipliers: Vec<LabTypeMultiplier>,

    /// Substring keywords of the conditions that interact with flagged labs.
    pub high_risk_conditions: Vec<String>,
}

impl ModelTables {
    pub fn standard() -> Self {
        let condition_severity = [
            ("diabetes", 0.35),
            ("heart disease", 0.45),
            ("hypertension", 0.30),
            ("kidney disease", 0.40),
            ("liver disease", 0.38),
            ("cancer", 0.50),
            ("stroke", 0.45),
            ("copd", 0.35),
            ("asthma", 0.20),
            ("arthritis", 0.15),
            ("depression", 0.20),
            ("anxiety", 0.15),
        ]
        .into_iter()
        .map(|(name, severity)| (name.to_string(), severity))
        .collect();

        Self {
            default_condition_severity: 0.15,
            condition_severity,
            severe_allergies: ["penicillin", "sulfa", "latex", "shellfish", "peanuts", "bee sting"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            lab_type_multipliers: vec![
                LabTypeMultiplier::new(&["glucose", "hba1c"], 1.3),
                LabTypeMultiplier::new(&["cholesterol", "lipid"], 1.2),
                LabTypeMultiplier::new(&["kidney", "creatinine"], 1.25),
                LabTypeMultiplier::new(&["liver", "alt", "ast"], 1.2),
            ],
            high_risk_conditions: ["diabetes", "heart disease", "hypertension", "kidney disease"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `RiskwatchError::ConfigError` if the TOML is malformed, does
    /// not match the `ModelTables` schema, or fails `validate`.
    pub fn from_toml_str(s: &str) -> RiskwatchResult<Self> {
        let tables: ModelTables = toml::from_str(s).map_err(|e| RiskwatchError::ConfigError {
            reason: format!("failed to parse model tables TOML: {}", e),
        })?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn from_file(path: &Path) -> RiskwatchResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RiskwatchError::ConfigError {
            reason: format!("failed to read model tables file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Severities in [0, 1], multipliers > 0, keywords non-empty and lowercase.
    pub fn validate(&self) -> RiskwatchResult<()> {
        check_severity("default_condition_severity", self.default_condition_severity)?;

        for (name, severity) in &self.condition_severity {
            check_keyword("condition_severity", name)?;
            check_severity(&format!("condition_severity.\"{}\"", name), *severity)?;
        }

        for keyword in &self.severe_allergies {
            check_keyword("severe_allergies", keyword)?;
        }
        for keyword in &self.high_risk_conditions {
            check_keyword("high_risk_conditions", keyword)?;
        }

        for (idx, multiplier) in self.lab_type_multipliers.iter().enumerate() {
            if multiplier.keywords.is_empty() {
                return Err(RiskwatchError::ConfigError {
                    reason: format!("lab_type_multipliers[{}] has no keywords", idx),
                });
            }
            for keyword in &multiplier.keywords {
                check_keyword(&format!("lab_type_multipliers[{}]", idx), keyword)?;
            }
            if !(multiplier.factor.is_finite() && multiplier.factor > 0.0) {
                return Err(RiskwatchError::ConfigError {
                    reason: format!(
                        "lab_type_multipliers[{}].factor must be positive, got {}",
                        idx, multiplier.factor
                    ),
                });
            }
        }

        Ok(())
    }

    /// Severity of one condition; `condition` is lowercased before lookup.
    pub fn condition_severity(&self, condition: &str) -> f64 {
        self.condition_severity
            .get(&condition.to_lowercase())
            .copied()
            .unwrap_or(self.default_condition_severity)
    }

    /// `allergy` is lowercased before matching.
    pub fn is_severe_allergy(&self, allergy: &str) -> bool {
        let allergy = allergy.to_lowercase();
        self.severe_allergies
            .iter()
            .any(|severe| allergy.contains(severe.as_str()))
    }

    /// Multiplier for a lab test type, or 1.0 when none matches.
    pub fn lab_type_factor(&self, test_type: &str) -> f64 {
        let test_type = test_type.to_lowercase();
        self.lab_type_multipliers
            .iter()
            .find(|m| m.matches(&test_type))
            .map(|m| m.factor)
            .unwrap_or(1.0)
    }
}

impl Default for ModelTables {
    fn default() -> Self {
        Self::standard()
    }
}

fn check_severity(field: &str, value: f64) -> RiskwatchResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RiskwatchError::ConfigError {
            reason: format!("{} must be within [0, 1], got {}", field, value),
        })
    }
}

fn check_keyword(field: &str, keyword: &str) -> RiskwatchResult<()> {
    if keyword.trim().is_empty() {
        return Err(RiskwatchError::ConfigError {
            reason: format!("{} contains an empty keyword", field),
        });
    }
    if keyword != keyword.to_lowercase() {
        return Err(RiskwatchError::ConfigError {
            reason: format!("{} keyword '{}' must be lowercase", field, keyword),
        });
    }
    Ok(())
}
