//! # riskwatch-ref-hospital
//!
//! Hospital reference runtime for the RiskWatch recalculation pipeline.
//!
//! Wires the in-memory stores, the v2.0.1 risk model, the snapshot verifier
//! and the hash-chained journal into one `RiskService`, then drives it
//! through five scenarios using mock data:
//!
//! 1. **Worked Example** - the reference patient scored end to end.
//! 2. **Lab Report Lifecycle** - create, patch, revise and delete a report.
//! 3. **Bulk Lab Deletion** - one recompute per affected patient.
//! 4. **Concurrent Lab Writes** - coalesced recomputes stay consistent.
//! 5. **Degraded Input** - an unparsable birth date yields `Unknown`.
//!
//! All data is hardcoded and fictional.

pub mod mock_data;
pub mod runtime;
pub mod scenarios;
