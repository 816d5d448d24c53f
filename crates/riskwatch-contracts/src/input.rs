//! The ephemeral input of one risk evaluation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{RiskwatchError, RiskwatchResult},
    lab::LabTestSummary,
};

/// Everything the scoring engine reads about a patient.
///
/// Built per evaluation by the input aggregator and never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInput {
    /// Unparsed date of birth; a malformed value degrades the evaluation.
    pub date_of_birth: String,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub lab_tests: Vec<LabTestSummary>,
}

impl RiskInput {
    /// Build an input from a loosely-typed JSON document.
    ///
    /// Missing or `null` list fields read as empty. A list field holding any
    /// other non-array value, a list element of the wrong type, or a missing
    /// or non-string `dateOfBirth` is an `InvalidInput` error.
    pub fn from_document(doc: &Value) -> RiskwatchResult<Self> {
        let date_of_birth = match doc.get("dateOfBirth") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(RiskwatchError::InvalidInput {
                    reason: format!("dateOfBirth must be a string, got {other}"),
                })
            }
            None => {
                return Err(RiskwatchError::InvalidInput {
                    reason: "dateOfBirth is missing".to_string(),
                })
            }
        };

        let chronic_conditions = string_list(doc, "chronicConditions")?;
        let allergies = string_list(doc, "allergies")?;

        let lab_tests = match list_field(doc, "labTests")? {
            None => Vec::new(),
            Some(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    serde_json::from_value::<LabTestSummary>(item.clone()).map_err(|e| {
                        RiskwatchError::InvalidInput {
                            reason: format!("labTests[{idx}] is not a lab test summary: {e}"),
                        }
                    })
                })
                .collect::<RiskwatchResult<Vec<_>>>()?,
        };

        Ok(Self {
            date_of_birth,
            chronic_conditions,
            allergies,
            lab_tests,
        })
    }
}

fn list_field<'v>(doc: &'v Value, key: &str) -> RiskwatchResult<Option<&'v Vec<Value>>> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(RiskwatchError::InvalidInput {
            reason: format!("{key} must be an array, got {other}"),
        }),
    }
}

fn string_list(doc: &Value, key: &str) -> RiskwatchResult<Vec<String>> {
    let Some(items) = list_field(doc, key)? else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(RiskwatchError::InvalidInput {
                reason: format!("{key}[{idx}] must be a string, got {other}"),
            }),
        })
        .collect()
}
