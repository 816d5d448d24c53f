//! In-memory implementation of `RecalcJournal`.
//!
//! Entries live in a `Vec` behind `Arc<Mutex<_>>`. Clones share the same
//! chain, so a handle kept outside the trigger observes every append.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use riskwatch_contracts::{
    error::{RiskwatchError, RiskwatchResult},
    event::RecalcRecord,
    patient::PatientId,
};
use riskwatch_core::traits::RecalcJournal;

use crate::{
    chain::{hash_entry, verify_chain},
    entry::{JournalEntry, RecalcLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    /// All entries, in append order.
    pub(crate) entries: Vec<JournalEntry>,

    /// The next sequence number to assign.
    pub(crate) sequence: u64,

    /// `this_hash` of the last entry, or `GENESIS_HASH`.
    pub(crate) last_hash: String,
}

// ── Public journal ────────────────────────────────────────────────────────────

/// An append-only recalculation journal backed by a SHA-256 hash chain.
#[derive(Clone)]
pub struct InMemoryRecalcJournal {
    journal_id: String,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRecalcJournal {
    pub fn new(journal_id: impl Into<String>) -> Self {
        let state = InMemoryState {
            entries: Vec::new(),
            sequence: 0,
            last_hash: JournalEntry::GENESIS_HASH.to_string(),
        };
        Self {
            journal_id: journal_id.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> RiskwatchResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| RiskwatchError::AuditWriteFailed {
            reason: format!("journal state lock poisoned: {}", e),
        })
    }

    pub fn len(&self) -> RiskwatchResult<usize> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> RiskwatchResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Export every entry written so far.
    pub fn export_log(&self) -> RiskwatchResult<RecalcLog> {
        let state = self.lock()?;
        let terminal_hash = state
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Ok(RecalcLog {
            journal_id: self.journal_id.clone(),
            entries: state.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    /// The records of one patient, oldest first.
    pub fn records_for(&self, patient_id: &PatientId) -> RiskwatchResult<Vec<RecalcRecord>> {
        Ok(self
            .lock()?
            .entries
            .iter()
            .filter(|e| &e.record.patient_id == patient_id)
            .map(|e| e.record.clone())
            .collect())
    }

    /// Check that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> RiskwatchResult<bool> {
        Ok(verify_chain(&self.lock()?.entries))
    }
}

// ── RecalcJournal impl ────────────────────────────────────────────────────────

impl RecalcJournal for InMemoryRecalcJournal {
    fn append(&self, record: &RecalcRecord) -> RiskwatchResult<()> {
        let mut state = self.lock()?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_entry(&self.journal_id, sequence, record, &prev_hash)?;

        state.entries.push(JournalEntry {
            sequence,
            journal_id: self.journal_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        debug!(
            journal_id = %self.journal_id,
            sequence,
            patient_id = %record.patient_id,
            event = %record.event,
            "recalculation journaled"
        );

        Ok(())
    }
}
