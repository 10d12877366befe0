//! In-memory ledger gateway implementation.
//!
//! This module provides [`MemoryLedger`], an in-memory implementation of
//! [`LedgerGateway`] suitable for testing and development.
//!
//! # Features
//!
//! - **Thread-safe**: Uses [`parking_lot::RwLock`] for concurrent access
//! - **Ordered storage**: Keys live in a [`BTreeMap`]; key order is the gateway's stable native
//!   query order
//! - **Built-in versioning**: every `put`/`delete` appends a [`HistoryEntry`] with a synthetic
//!   transaction id
//! - **Cursor-paged rich queries**: selectors are evaluated by the reference matcher in
//!   [`selector`](crate::selector); bookmarks resume strictly after the last returned key
//!
//! # Test hooks
//!
//! The ledger counts issued rich queries ([`query_count`](MemoryLedger::query_count)) and live
//! cursors ([`open_cursors`](MemoryLedger::open_cursors)), and can be told to fail reads
//! ([`inject_read_fault`](MemoryLedger::inject_read_fault)) so callers can exercise their
//! degraded-read paths deterministically.
//!
//! # Example
//!
//! ```
//! use formledger_ledger::{LedgerGateway, MemoryLedger};
//!
//! #[tokio::main]
//! async fn main() {
//!     let ledger = MemoryLedger::new();
//!
//!     ledger.put("greeting", b"\"hello\"".to_vec()).await.unwrap();
//!     let value = ledger.get("greeting").await.unwrap();
//!
//!     assert_eq!(value.unwrap().as_ref(), b"\"hello\"");
//! }
//! ```
//!
//! # Limitations
//!
//! - Data is not persisted; all state is lost when the process exits
//! - Transaction ids are a process-local counter, not consensus-derived
//! - Revision timestamps come from the wall clock at mutation time

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;

use crate::{
    error::{GatewayError, GatewayResult},
    gateway::{HistoryCursor, LedgerGateway, QueryScan, RecordCursor},
    selector::Selector,
    types::{HistoryEntry, KeyValue},
};

/// In-memory ledger gateway backed by a [`BTreeMap`].
///
/// Primarily intended for tests, but complete enough to serve as a
/// development backend: it honors the full gateway contract including
/// bookmark-paged rich queries and per-key revision history.
///
/// # Cloning
///
/// `MemoryLedger` is cheaply cloneable via [`Arc`]. All clones share the
/// same underlying state.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    data: RwLock<BTreeMap<String, Bytes>>,
    history: RwLock<BTreeMap<String, Vec<HistoryEntry>>>,
    tx_counter: AtomicU64,
    query_count: AtomicU64,
    open_cursors: AtomicUsize,
    read_fault: RwLock<Option<String>>,
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLedger")
            .field("keys", &self.inner.data.read().len())
            .field("open_cursors", &self.open_cursors())
            .finish_non_exhaustive()
    }
}

impl MemoryLedger {
    /// Creates a new, empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rich queries issued so far.
    ///
    /// Test hook: lets pagination tests assert exactly how many cursor
    /// queries a page walk performed.
    #[must_use]
    pub fn query_count(&self) -> u64 {
        self.inner.query_count.load(Ordering::SeqCst)
    }

    /// Number of query/history cursors currently alive.
    ///
    /// Test hook: a well-behaved caller drops every cursor it opens, so this
    /// returns to zero between operations.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.inner.open_cursors.load(Ordering::SeqCst)
    }

    /// Makes every subsequent [`get`](LedgerGateway::get) fail with a
    /// connection error carrying `message`, until
    /// [`clear_read_fault`](Self::clear_read_fault) is called.
    pub fn inject_read_fault(&self, message: impl Into<String>) {
        *self.inner.read_fault.write() = Some(message.into());
    }

    /// Restores normal read behavior after
    /// [`inject_read_fault`](Self::inject_read_fault).
    pub fn clear_read_fault(&self) {
        *self.inner.read_fault.write() = None;
    }

    fn next_tx_id(&self) -> String {
        let n = self.inner.tx_counter.fetch_add(1, Ordering::SeqCst);
        format!("tx-{n:06}")
    }

    fn record_revision(&self, key: &str, value: Bytes, is_delete: bool) {
        let entry = HistoryEntry {
            tx_id: self.next_tx_id(),
            timestamp: Utc::now(),
            value,
            is_delete,
        };
        self.inner.history.write().entry(key.to_string()).or_default().push(entry);
    }

    fn open_cursor_guard(&self) -> CursorGuard {
        self.inner.open_cursors.fetch_add(1, Ordering::SeqCst);
        CursorGuard { inner: Arc::clone(&self.inner) }
    }
}

/// Decrements the live-cursor count when a cursor is dropped, on every exit
/// path of the loop that consumed it.
struct CursorGuard {
    inner: Arc<Inner>,
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.inner.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerGateway for MemoryLedger {
    async fn get(&self, key: &str) -> GatewayResult<Option<Bytes>> {
        if let Some(message) = self.inner.read_fault.read().clone() {
            return Err(GatewayError::connection(message));
        }

        let data = self.inner.data.read();
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> GatewayResult<()> {
        let value = Bytes::from(value);
        self.inner.data.write().insert(key.to_string(), value.clone());
        self.record_revision(key, value, false);
        Ok(())
    }

    async fn delete(&self, key: &str) -> GatewayResult<()> {
        self.inner.data.write().remove(key);
        self.record_revision(key, Bytes::new(), true);
        Ok(())
    }

    async fn query_with_cursor(
        &self,
        selector: &str,
        limit: u32,
        cursor: &str,
    ) -> GatewayResult<QueryScan> {
        self.inner.query_count.fetch_add(1, Ordering::SeqCst);

        if limit == 0 {
            return Err(GatewayError::query("limit must be positive"));
        }
        let selector = Selector::parse(selector)?;

        // Snapshot the matching page under the read lock; the cursor hands
        // out owned data afterwards.
        let mut page = Vec::with_capacity(limit as usize);
        let mut more_after = false;
        {
            let data = self.inner.data.read();
            let after_cursor = data
                .iter()
                .filter(|(key, _)| cursor.is_empty() || key.as_str() > cursor);
            for (key, value) in after_cursor {
                let document: serde_json::Value = match serde_json::from_slice(value) {
                    Ok(document) => document,
                    Err(e) => {
                        tracing::warn!(key = %key, "skipping undecodable ledger value: {e}");
                        continue;
                    },
                };
                if !selector.matches(&document) {
                    continue;
                }
                if page.len() == limit as usize {
                    more_after = true;
                    break;
                }
                page.push(KeyValue::new(
                    Bytes::copy_from_slice(key.as_bytes()),
                    value.clone(),
                ));
            }
        }

        let bookmark = if more_after {
            page.last().map(|kv| String::from_utf8_lossy(&kv.key).into_owned()).unwrap_or_default()
        } else {
            String::new()
        };

        Ok(QueryScan {
            records: Box::new(MemoryRecordCursor {
                items: page.into(),
                _guard: self.open_cursor_guard(),
            }),
            bookmark,
        })
    }

    async fn history_of(&self, key: &str) -> GatewayResult<Box<dyn HistoryCursor>> {
        let history = self.inner.history.read();
        // Most-recent-first, the typical native order of ledger history.
        let entries: VecDeque<HistoryEntry> =
            history.get(key).map(|entries| entries.iter().rev().cloned().collect()).unwrap_or_default();

        Ok(Box::new(MemoryHistoryCursor { entries, _guard: self.open_cursor_guard() }))
    }
}

struct MemoryRecordCursor {
    items: VecDeque<KeyValue>,
    _guard: CursorGuard,
}

impl RecordCursor for MemoryRecordCursor {
    fn next(&mut self) -> GatewayResult<Option<KeyValue>> {
        Ok(self.items.pop_front())
    }
}

struct MemoryHistoryCursor {
    entries: VecDeque<HistoryEntry>,
    _guard: CursorGuard,
}

impl HistoryCursor for MemoryHistoryCursor {
    fn next(&mut self) -> GatewayResult<Option<HistoryEntry>> {
        Ok(self.entries.pop_front())
    }
}
