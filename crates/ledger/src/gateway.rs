//! Ledger gateway trait definition.
//!
//! This module defines the [`LedgerGateway`] trait, the interface boundary
//! between the asset registry's business logic and the versioned key-value
//! ledger that handles consensus, durability, and transaction ordering.
//!
//! # Design Philosophy
//!
//! - **Keys are strings, values are bytes**: the ledger stores opaque payloads under string keys;
//!   no serialization format is assumed at this layer.
//! - **Async by default**: every operation crosses a host boundary.
//! - **Forward-only pagination**: the rich-query executor hands back an opaque continuation
//!   cursor; there is no random page seek.
//! - **Cursors are scoped resources**: query and history cursors hold ledger-side state and are
//!   released on drop, on every exit path.
//!
//! Domain logic (validation, query compilation, page walking) lives in the
//! registry layer built on top of this trait, not in gateway
//! implementations. See [`MemoryLedger`](crate::MemoryLedger) for a
//! reference implementation.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    error::GatewayResult,
    types::{HistoryEntry, KeyValue},
};

/// Cursor over the matches of one rich-query page.
///
/// Yields records until the page is exhausted. Dropping the cursor releases
/// the ledger-side resources backing it.
pub trait RecordCursor: Send {
    /// Advances the cursor, returning the next record or `None` when the
    /// page is exhausted.
    fn next(&mut self) -> GatewayResult<Option<KeyValue>>;
}

/// Cursor over the recorded revisions of a single key.
///
/// Yields entries in the gateway's native order. Dropping the cursor
/// releases the ledger-side resources backing it.
pub trait HistoryCursor: Send {
    /// Advances the cursor, returning the next revision or `None` when the
    /// history is exhausted.
    fn next(&mut self) -> GatewayResult<Option<HistoryEntry>>;
}

/// One page of rich-query results plus the continuation cursor.
pub struct QueryScan {
    /// Cursor over this page's matches.
    pub records: Box<dyn RecordCursor>,

    /// Opaque continuation token. Empty when no further matches exist after
    /// this page.
    pub bookmark: String,
}

impl std::fmt::Debug for QueryScan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryScan").field("bookmark", &self.bookmark).finish_non_exhaustive()
    }
}

/// Abstract gateway to the versioned key-value ledger.
///
/// Implementations are expected to be thread-safe (`Send + Sync`). The
/// registry core invokes a gateway synchronously, once per hosting
/// transaction; it never retries and never spawns parallel work of its own.
///
/// # Key Operations
///
/// | Method | Description |
/// |--------|-------------|
/// | [`get`](LedgerGateway::get) | Read the value stored under a key |
/// | [`put`](LedgerGateway::put) | Write a value under a key |
/// | [`delete`](LedgerGateway::delete) | Remove a key |
/// | [`query_with_cursor`](LedgerGateway::query_with_cursor) | One page of rich-query matches |
/// | [`history_of`](LedgerGateway::history_of) | Every recorded revision of a key |
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use formledger_ledger::{LedgerGateway, MemoryLedger};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let ledger = MemoryLedger::new();
///
/// ledger.put("asset-1", br#"{"id":"asset-1"}"#.to_vec()).await.unwrap();
/// let value = ledger.get("asset-1").await.unwrap();
/// assert_eq!(value, Some(Bytes::from_static(br#"{"id":"asset-1"}"#)));
/// # });
/// ```
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the key exists
    /// - `Ok(None)` if the key doesn't exist
    /// - `Err(...)` on gateway errors
    #[must_use = "gateway operations may fail and errors must be handled"]
    async fn get(&self, key: &str) -> GatewayResult<Option<Bytes>>;

    /// Writes `value` under `key`, overwriting any existing value.
    #[must_use = "gateway operations may fail and errors must be handled"]
    async fn put(&self, key: &str, value: Vec<u8>) -> GatewayResult<()>;

    /// Removes `key`. Deleting an absent key is a no-op.
    #[must_use = "gateway operations may fail and errors must be handled"]
    async fn delete(&self, key: &str) -> GatewayResult<()>;

    /// Executes one page of a rich query.
    ///
    /// Returns up to `limit` matches selected by `selector`, in the
    /// gateway's native order (stable but implementation-defined), starting
    /// after the position marked by `cursor`. An empty `cursor` starts from
    /// the first match.
    ///
    /// The returned [`QueryScan::bookmark`] is empty when no further matches
    /// exist after this page; otherwise passing it back as `cursor` resumes
    /// where this page ended.
    #[must_use = "gateway operations may fail and errors must be handled"]
    async fn query_with_cursor(
        &self,
        selector: &str,
        limit: u32,
        cursor: &str,
    ) -> GatewayResult<QueryScan>;

    /// Returns a cursor over every recorded revision of `key`, in the
    /// gateway's native order.
    #[must_use = "gateway operations may fail and errors must be handled"]
    async fn history_of(&self, key: &str) -> GatewayResult<Box<dyn HistoryCursor>>;
}
