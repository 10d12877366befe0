//! Gateway abstraction over a versioned key-value ledger.
//!
//! This crate defines [`LedgerGateway`], the interface boundary between the
//! asset registry's business logic and the external ledger that provides
//! consensus, durability, and transaction ordering. The registry core is
//! written against this trait; production deployments bind it to their
//! ledger host, tests and development bind it to [`MemoryLedger`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Registry core                  │
//! │  lifecycle │ query compiler │ page walker   │
//! ├─────────────────────────────────────────────┤
//! │              LedgerGateway                  │
//! │  get / put / delete │ rich query │ history  │
//! ├─────────────────────────────────────────────┤
//! │            Ledger host (external)           │
//! │  consensus │ durability │ tx ordering       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Cursors
//!
//! Rich queries and history reads hand back cursors over ledger-side
//! resources. Cursors release their resources on drop, so the scoped-close
//! discipline holds on every exit path, early returns and errors included.
//!
//! # Quick Start
//!
//! ```
//! use formledger_ledger::{LedgerGateway, MemoryLedger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = MemoryLedger::new();
//!
//!     ledger.put("asset-1", br#"{"id":"asset-1"}"#.to_vec()).await?;
//!
//!     let mut scan = ledger.query_with_cursor(r#"{"selector":{}}"#, 10, "").await?;
//!     assert!(scan.records.next()?.is_some());
//!     assert_eq!(scan.bookmark, "");
//!
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod gateway;
mod memory;
pub(crate) mod selector;
mod types;

/// Gateway error types and result alias.
pub use error::{BoxError, GatewayError, GatewayResult};
/// The gateway trait and its cursor types.
pub use gateway::{HistoryCursor, LedgerGateway, QueryScan, RecordCursor};
/// In-memory reference implementation.
pub use memory::MemoryLedger;
/// Shared value types.
pub use types::{HistoryEntry, KeyValue};
