//! # riskwatch-core
//!
//! The recalculation runtime for RiskWatch risk snapshots.
//!
//! This crate provides:
//! - The collaborator traits (`PatientStore`, `LabTestStore`, `RiskEvaluator`,
//!   `SnapshotVerifier`, `RecalcJournal`)
//! - The input aggregator
//! - The `RecalculationTrigger` that keeps snapshots consistent with their inputs
//! - The `RiskService` mutation surface and read-side queries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use riskwatch_core::{RecalculationTrigger, RiskService, traits::{PatientStore, LabTestStore}};
//! ```

pub mod aggregator;
pub mod queries;
pub mod service;
pub mod traits;
pub mod trigger;

pub use service::RiskService;
pub use trigger::RecalculationTrigger;
