//! # riskwatch-contracts
//!
//! Shared types for the RiskWatch patient risk assessment engine.
//!
//! Every crate in the workspace imports from here. No scoring or lifecycle
//! logic lives in this crate, only data definitions and error types.

pub mod assessment;
pub mod error;
pub mod event;
pub mod health;
pub mod input;
pub mod lab;
pub mod patient;
pub mod verify;
