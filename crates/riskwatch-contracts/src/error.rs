//! Error types for the RiskWatch recalculation pipeline.
//!
//! All fallible operations in the workspace return `RiskwatchResult<T>`.
//! Variants carry enough context to produce actionable log lines.

use thiserror::Error;

/// The unified error type for RiskWatch.
#[derive(Debug, Error)]
pub enum RiskwatchError {
    /// The patient does not exist (never created, or deleted concurrently).
    ///
    /// The recalculation trigger treats this as "skip", never as a failure.
    #[error("patient '{patient_id}' not found")]
    PatientNotFound { patient_id: String },

    /// The lab-test record does not exist.
    #[error("lab test '{lab_test_id}' not found")]
    LabTestNotFound { lab_test_id: String },

    /// The risk input is malformed (bad date of birth, non-array fields).
    ///
    /// Recovered inside the scoring engine as a degraded `Unknown` result.
    #[error("invalid risk input: {reason}")]
    InvalidInput { reason: String },

    /// A patient or lab-test store read or write failed.
    ///
    /// Propagated unchanged to whoever triggered the recompute.
    #[error("store operation failed: {reason}")]
    StoreFailure { reason: String },

    /// The snapshot verifier rejected an assessment before it was persisted.
    #[error("snapshot verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// The recalculation journal could not record a persisted snapshot.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// The per-patient recalculation state is corrupt (e.g. a poisoned lock).
    #[error("state machine error: {reason}")]
    StateMachineError { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl RiskwatchError {
    /// True for the two "record vanished" variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RiskwatchError::PatientNotFound { .. } | RiskwatchError::LabTestNotFound { .. }
        )
    }
}

/// Convenience alias used throughout the RiskWatch crates.
pub type RiskwatchResult<T> = Result<T, RiskwatchError>;
