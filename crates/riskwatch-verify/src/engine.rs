//! Snapshot verifier for the recalculation trigger.
//!
//! `SnapshotSchemaVerifier` implements `SnapshotVerifier` from
//! `riskwatch-core`. Verification runs in two phases:
//!
//! 1. **Structural** - the serialized snapshot is validated against
//!    `snapshot_schema()` with the `jsonschema` crate.
//! 2. **Semantic** - built-in consistency rules, then every registered custom
//!    rule. All failures are collected before returning.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use riskwatch_contracts::{
    assessment::{RiskAssessment, RiskLevel},
    error::{RiskwatchError, RiskwatchResult},
    verify::{VerificationFailure, VerificationReport},
};
use riskwatch_core::traits::SnapshotVerifier;

use crate::schema::snapshot_schema;

/// A caller-supplied check over the serialized snapshot.
///
/// Returns `Some(message)` on failure, `None` on success.
pub type CustomSnapshotFn = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;

pub struct SnapshotSchemaVerifier {
    schema: Value,
    /// Run in name order after the built-in rules.
    custom_rules: BTreeMap<String, CustomSnapshotFn>,
}

impl SnapshotSchemaVerifier {
    pub fn new() -> Self {
        Self {
            schema: snapshot_schema(),
            custom_rules: BTreeMap::new(),
        }
    }

    /// Register a custom rule under `name`. Registering the same name twice
    /// replaces the previous function.
    pub fn register_rule(&mut self, name: impl Into<String>, f: CustomSnapshotFn) {
        self.custom_rules.insert(name.into(), f);
    }

    // ── Built-in semantic rules ───────────────────────────────────────────────

    /// A scored snapshot's level must be the band of its score.
    fn level_matches_score(assessment: &RiskAssessment) -> Option<String> {
        if assessment.risk_level == RiskLevel::Unknown {
            return None;
        }
        let expected = RiskLevel::from_score(assessment.risk_score);
        if assessment.risk_level == expected {
            None
        } else {
            Some(format!(
                "riskLevel {} does not match riskScore {} (expected {})",
                assessment.risk_level, assessment.risk_score, expected
            ))
        }
    }

    /// Unknown ⇔ error present; Unknown snapshots score 0 and carry no detail.
    fn degraded_shape(assessment: &RiskAssessment) -> Option<String> {
        let has_error = assessment
            .error
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty());

        if assessment.is_degraded() {
            if !has_error {
                return Some("degraded snapshot must carry a non-empty error".to_string());
            }
            if assessment.risk_score != 0 {
                return Some(format!(
                    "degraded snapshot must score 0, got {}",
                    assessment.risk_score
                ));
            }
            if assessment.detail.is_some() {
                return Some("degraded snapshot must not carry breakdown detail".to_string());
            }
            None
        } else if assessment.error.is_some() {
            Some(format!(
                "scored snapshot at level {} must not carry an error",
                assessment.risk_level
            ))
        } else if assessment.detail.is_none() {
            Some("scored snapshot is missing its breakdown detail".to_string())
        } else {
            None
        }
    }
}

impl Default for SnapshotSchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotVerifier for SnapshotSchemaVerifier {
    fn verify(&self, assessment: &RiskAssessment) -> RiskwatchResult<VerificationReport> {
        let payload = serde_json::to_value(assessment).map_err(|e| {
            RiskwatchError::VerificationFailed {
                reason: format!("snapshot is not serializable: {}", e),
            }
        })?;
        let mut failures: Vec<VerificationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        match jsonschema::validator_for(&self.schema) {
            Ok(validator) => {
                for error in validator.iter_errors(&payload) {
                    let message = format!(
                        "JSON Schema violation at {}: {}",
                        error.instance_path, error
                    );
                    warn!(%message, "structural validation failure");
                    failures.push(VerificationFailure {
                        rule_id: "json-schema".to_string(),
                        message,
                    });
                }
            }
            Err(e) => {
                let message = format!("invalid JSON Schema document: {e}");
                warn!(%message, "schema compilation failure");
                failures.push(VerificationFailure {
                    rule_id: "json-schema".to_string(),
                    message,
                });
            }
        }

        // ── Phase 2: semantic rules ───────────────────────────────────────────
        let builtin: [(&str, Option<String>); 2] = [
            ("level-matches-score", Self::level_matches_score(assessment)),
            ("degraded-shape", Self::degraded_shape(assessment)),
        ];
        let custom = self
            .custom_rules
            .iter()
            .map(|(name, f)| (name.as_str(), f(&payload)));

        for (rule_id, failure) in builtin.into_iter().chain(custom) {
            if let Some(message) = failure {
                warn!(rule_id, %message, "semantic rule failed");
                failures.push(VerificationFailure {
                    rule_id: rule_id.to_string(),
                    message,
                });
            }
        }

        let report = VerificationReport::from_failures(failures);
        debug!(
            risk_score = assessment.risk_score,
            risk_level = %assessment.risk_level,
            passed = report.passed,
            failure_count = report.failures.len(),
            "snapshot verification complete"
        );

        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
