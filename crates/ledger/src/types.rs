//! Common types shared by gateway implementations and their consumers.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Key-value pair yielded by a rich-query cursor.
///
/// Contains the ledger key and the raw value stored under it.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use formledger_ledger::KeyValue;
///
/// let kv = KeyValue::new(Bytes::from("asset-1"), Bytes::from(r#"{"id":"asset-1"}"#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// The key identifying this entry.
    pub key: Bytes,

    /// The value stored at this key.
    pub value: Bytes,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }
}

/// One past revision of a ledger key, as recorded by the ledger's built-in
/// versioning.
///
/// Entries are append-only and owned entirely by the ledger; consumers only
/// read them. Ordering is whatever the gateway returns (most-recent-first
/// for [`MemoryLedger`](crate::MemoryLedger)) and is never reordered
/// downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Identifier of the transaction that produced this revision.
    pub tx_id: String,

    /// When the mutation was committed.
    pub timestamp: DateTime<Utc>,

    /// The value written by the mutation. Empty for deletions.
    pub value: Bytes,

    /// Whether this revision removed the key.
    pub is_delete: bool,
}
