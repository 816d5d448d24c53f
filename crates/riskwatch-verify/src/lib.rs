//! # riskwatch-verify
//!
//! Risk snapshot verification for RiskWatch.
//!
//! This crate provides [`engine::SnapshotSchemaVerifier`], which implements
//! the [`riskwatch_core::traits::SnapshotVerifier`] trait. The trigger runs
//! it on every computed snapshot before the write; a failing report blocks
//! the write.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use riskwatch_verify::engine::SnapshotSchemaVerifier;
//!
//! let mut verifier = SnapshotSchemaVerifier::new();
//! verifier.register_rule("no-empty-factors", Box::new(|payload| {
//!     match payload.get("riskLevel").and_then(|v| v.as_str()) {
//!         Some("Critical") if payload["riskFactors"].as_array().is_some_and(|f| f.is_empty()) => {
//!             Some("critical snapshot lists no risk factors".to_string())
//!         }
//!         _ => None,
//!     }
//! }));
//! ```

pub mod engine;
pub mod schema;

pub use engine::SnapshotSchemaVerifier;
