//! # riskwatch-store
//!
//! In-memory reference implementations of the `PatientStore` and
//! `LabTestStore` traits from `riskwatch-core`.
//!
//! Both stores keep their state behind `Arc<Mutex<_>>`; clones share the
//! same data, so the service and the trigger can hold handles to one store.

pub mod labs;
pub mod patients;

pub use labs::InMemoryLabStore;
pub use patients::InMemoryPatientStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
