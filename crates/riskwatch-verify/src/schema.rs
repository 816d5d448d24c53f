//! The JSON Schema a persisted risk snapshot must satisfy.

use serde_json::{json, Value};

fn percent() -> Value {
    json!({ "type": "integer", "minimum": 0, "maximum": 100 })
}

/// Structural schema for the camelCase `RiskAssessment` document.
///
/// Detail fields are optional at this level; whether they must be present
/// depends on `riskLevel` and is checked by the semantic rules.
pub fn snapshot_schema() -> Value {
    json!({
        "type": "object",
        "required": ["riskScore", "riskLevel", "calculatedAt"],
        "properties": {
            "riskScore": percent(),
            "riskLevel": {
                "enum": ["Minimal", "Low", "Medium", "High", "Critical", "Unknown"]
            },
            "calculatedAt": { "type": "string", "minLength": 1 },
            "error": { "type": "string", "minLength": 1 },
            "breakdown": {
                "type": "object",
                "required": ["age", "conditions", "labs", "allergies", "interactions"],
                "properties": {
                    "age": percent(),
                    "conditions": percent(),
                    "labs": percent(),
                    "allergies": percent(),
                    "interactions": percent()
                }
            },
            "riskFactors": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["factor", "severity", "description"],
                    "properties": {
                        "factor": { "type": "string", "minLength": 1 },
                        "severity": { "enum": ["Low", "Medium", "High"] },
                        "description": { "type": "string" }
                    }
                }
            },
            "recommendations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["priority", "action", "description"],
                    "properties": {
                        "priority": { "enum": ["Low", "Medium", "High"] },
                        "action": { "type": "string", "minLength": 1 },
                        "description": { "type": "string" }
                    }
                }
            },
            "modelVersion": { "type": "string", "minLength": 1 },
            "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
        }
    })
}
