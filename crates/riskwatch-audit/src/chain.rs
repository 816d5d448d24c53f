//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. journal_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. compact JSON of the recalculation record

use sha2::{Digest, Sha256};

use riskwatch_contracts::{
    error::{RiskwatchError, RiskwatchResult},
    event::RecalcRecord,
};

use crate::entry::JournalEntry;

/// Compute the SHA-256 hash for a single journal entry.
///
/// Returns a lowercase 64-character hex string, or `AuditWriteFailed` if the
/// record cannot be serialized.
pub fn hash_entry(
    journal_id: &str,
    sequence: u64,
    record: &RecalcRecord,
    prev_hash: &str,
) -> RiskwatchResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| RiskwatchError::AuditWriteFailed {
        reason: format!("recalculation record is not serializable: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(journal_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify prev-hash linkage and hash correctness of every entry.
///
/// An empty chain is valid.
pub fn verify_chain(entries: &[JournalEntry]) -> bool {
    let mut expected_prev = JournalEntry::GENESIS_HASH.to_string();

    for entry in entries {
        if entry.prev_hash != expected_prev {
            return false;
        }

        match hash_entry(&entry.journal_id, entry.sequence, &entry.record, &entry.prev_hash) {
            Ok(recomputed) if recomputed == entry.this_hash => {}
            _ => return false,
        }

        expected_prev = entry.this_hash.clone();
    }

    true
}
