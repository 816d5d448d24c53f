//! # riskwatch-audit
//!
//! Append-only, SHA-256 hash-chained journal of risk recalculations.
//!
//! ## Overview
//!
//! Every snapshot the recalculation trigger persists is recorded as a
//! `RecalcRecord` wrapped in a `JournalEntry` that links to the previous
//! entry by hash. Altering any stored entry breaks the chain, which
//! `verify_chain` detects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use riskwatch_audit::InMemoryRecalcJournal;
//!
//! let journal = InMemoryRecalcJournal::new("ward-7");
//! // Hand a clone to the trigger, keep one for inspection.
//! let trigger = RecalculationTrigger::new(patients, labs, model, verifier, Box::new(journal.clone()));
//!
//! assert!(journal.verify_integrity()?);
//! let log = journal.export_log()?;
//! ```

pub mod chain;
pub mod entry;
pub mod memory;

pub use chain::{hash_entry, verify_chain};
pub use entry::{JournalEntry, RecalcLog};
pub use memory::InMemoryRecalcJournal;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use riskwatch_contracts::{
        assessment::{RiskAssessment, RiskLevel},
        event::{RecalcRecord, RiskEvent},
        patient::PatientId,
    };
    use riskwatch_core::traits::RecalcJournal;

    use super::{InMemoryRecalcJournal, JournalEntry};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_record(seq: u64, score: u8) -> RecalcRecord {
        let patient_id = PatientId::from_sequence(seq);
        let assessment = RiskAssessment {
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            detail: None,
            error: None,
            calculated_at: Utc::now(),
        };
        RecalcRecord::new(
            &patient_id,
            &RiskEvent::LabTestCreated {
                patient_id: patient_id.clone(),
            },
            &assessment,
        )
    }

    fn journal_with(records: &[RecalcRecord]) -> InMemoryRecalcJournal {
        let journal = InMemoryRecalcJournal::new("ward-test");
        for record in records {
            journal.append(record).unwrap();
        }
        journal
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_hash_chain_integrity() {
        let journal = journal_with(&[make_record(1, 10), make_record(2, 55), make_record(1, 30)]);
        assert!(journal.verify_integrity().unwrap());
        assert_eq!(journal.len().unwrap(), 3);
    }

    /// Rewriting a stored score breaks the chain.
    #[test]
    fn test_tamper_detection() {
        let journal = journal_with(&[make_record(1, 10), make_record(2, 55), make_record(3, 80)]);

        {
            let mut state = journal.state.lock().unwrap();
            state.entries[1].record.risk_score = 5;
        }

        assert!(
            !journal.verify_integrity().unwrap(),
            "chain must detect tampering with a stored entry"
        );
    }

    #[test]
    fn test_genesis_hash_and_sequence() {
        let journal = journal_with(&[make_record(1, 10), make_record(2, 20), make_record(3, 30)]);
        let log = journal.export_log().unwrap();

        assert_eq!(log.entries[0].prev_hash, JournalEntry::GENESIS_HASH);
        for (idx, entry) in log.entries.iter().enumerate() {
            assert_eq!(entry.sequence, idx as u64);
        }
        assert_eq!(log.entries[1].prev_hash, log.entries[0].this_hash);
    }

    #[test]
    fn test_export_log() {
        let journal = journal_with(&[make_record(1, 42), make_record(2, 77)]);
        let log = journal.export_log().unwrap();

        assert_eq!(log.journal_id, "ward-test");
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.terminal_hash, log.entries[1].this_hash);
        assert_eq!(log.entries[1].record.risk_level, RiskLevel::Critical);
        assert_eq!(log.entries[0].record.event, "lab-test-created");
        assert!(super::verify_chain(&log.entries));
    }

    /// Clones share one chain.
    #[test]
    fn test_clone_observes_appends() {
        let journal = InMemoryRecalcJournal::new("shared");
        let handle = journal.clone();
        journal.append(&make_record(4, 12)).unwrap();

        assert_eq!(handle.len().unwrap(), 1);
        let records = handle.records_for(&PatientId::from_sequence(4)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].risk_score, 12);
        assert!(handle
            .records_for(&PatientId::from_sequence(5))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_verify_empty() {
        let journal = InMemoryRecalcJournal::new("empty");
        assert!(journal.verify_integrity().unwrap());
        assert!(journal.is_empty().unwrap());
        assert_eq!(journal.export_log().unwrap().terminal_hash, "");
        assert!(super::verify_chain(&[]));
    }
}
