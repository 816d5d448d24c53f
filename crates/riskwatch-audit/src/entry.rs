//! Journal entry and exported log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use riskwatch_contracts::event::RecalcRecord;

/// One persisted recompute, linked to its predecessor by hash.
///
/// Modifying any field of the embedded `record` invalidates `this_hash` and
/// every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub journal_id: String,

    pub record: RecalcRecord,

    /// `this_hash` of the previous entry, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    pub this_hash: String,
}

impl JournalEntry {
    /// The `prev_hash` of the first entry in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A point-in-time export of a journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecalcLog {
    pub journal_id: String,

    /// Entries in chain order (sequence 0 first).
    pub entries: Vec<JournalEntry>,

    pub exported_at: DateTime<Utc>,

    /// The `this_hash` of the last entry. Empty if the journal is empty.
    pub terminal_hash: String,
}
