//! Risk factors and recommendations derived alongside the score.

use riskwatch_contracts::{
    assessment::{Priority, Recommendation, RiskFactor, Severity},
    input::RiskInput,
    lab::{LabStatus, LabTestSummary},
};

fn factor(name: &str, severity: Severity, description: String) -> RiskFactor {
    RiskFactor {
        factor: name.to_string(),
        severity,
        description,
    }
}

fn recommendation(priority: Priority, action: &str, description: impl Into<String>) -> Recommendation {
    Recommendation {
        priority,
        action: action.to_string(),
        description: description.into(),
    }
}

fn with_status(labs: &[LabTestSummary], status: LabStatus) -> Vec<&LabTestSummary> {
    labs.iter().filter(|t| t.status == status).collect()
}

/// Factors in fixed order: age, conditions, critical labs, abnormal labs,
/// allergies. Each is included independently of the others.
pub fn risk_factors(input: &RiskInput, age: i32) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    let conditions = &input.chronic_conditions;

    if age > 65 {
        factors.push(factor(
            "Advanced Age",
            Severity::Medium,
            format!("Patient is {} years old, increasing health risks", age),
        ));
    }

    if conditions.len() > 2 {
        factors.push(factor(
            "Multiple Chronic Conditions",
            Severity::High,
            format!(
                "Patient has {} chronic conditions: {}",
                conditions.len(),
                conditions.join(", ")
            ),
        ));
    } else if !conditions.is_empty() {
        factors.push(factor(
            "Chronic Condition",
            Severity::Medium,
            format!("Diagnosed with: {}", conditions.join(", ")),
        ));
    }

    let critical = with_status(&input.lab_tests, LabStatus::Critical).len();
    if critical > 0 {
        factors.push(factor(
            "Critical Lab Results",
            Severity::High,
            format!("{} critical lab result(s) detected", critical),
        ));
    }

    let abnormal = with_status(&input.lab_tests, LabStatus::Abnormal).len();
    if abnormal > 2 {
        factors.push(factor(
            "Multiple Abnormal Lab Results",
            Severity::Medium,
            format!("{} abnormal test results", abnormal),
        ));
    }

    if input.allergies.len() > 3 {
        factors.push(factor(
            "Multiple Allergies",
            Severity::Low,
            format!("Patient has {} known allergies", input.allergies.len()),
        ));
    }

    factors
}

/// Score-band recommendations first, then condition- and lab-specific ones.
///
/// Condition checks compare the listed names exactly and case-sensitively.
pub fn recommendations(risk_score: u8, input: &RiskInput) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    match risk_score {
        70.. => {
            recs.push(recommendation(
                Priority::High,
                "Immediate Medical Review Required",
                "Schedule urgent consultation with primary care physician",
            ));
            recs.push(recommendation(
                Priority::High,
                "Enhanced Monitoring",
                "Implement daily vital signs monitoring and weekly check-ins",
            ));
        }
        50..=69 => {
            recs.push(recommendation(
                Priority::Medium,
                "Regular Medical Follow-up",
                "Schedule appointment within 2 weeks for health assessment",
            ));
            recs.push(recommendation(
                Priority::Medium,
                "Lifestyle Modification",
                "Implement diet and exercise plan with medical supervision",
            ));
        }
        30..=49 => {
            recs.push(recommendation(
                Priority::Low,
                "Routine Check-up",
                "Schedule regular 3-month follow-up appointment",
            ));
            recs.push(recommendation(
                Priority::Low,
                "Preventive Care",
                "Maintain healthy lifestyle and monitor symptoms",
            ));
        }
        _ => {}
    }

    let has_condition = |name: &str| input.chronic_conditions.iter().any(|c| c == name);

    if has_condition("Diabetes") {
        recs.push(recommendation(
            Priority::Medium,
            "Diabetes Management",
            "Regular glucose monitoring and HbA1c testing every 3 months",
        ));
    }

    if has_condition("Hypertension") {
        recs.push(recommendation(
            Priority::Medium,
            "Blood Pressure Monitoring",
            "Daily blood pressure checks and medication compliance review",
        ));
    }

    let critical = with_status(&input.lab_tests, LabStatus::Critical);
    if !critical.is_empty() {
        let types: Vec<&str> = critical.iter().map(|t| t.test_type.as_str()).collect();
        recs.push(recommendation(
            Priority::High,
            "Lab Result Follow-up",
            format!("Review and address critical findings in: {}", types.join(", ")),
        ));
    }

    recs
}
