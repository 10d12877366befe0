//! Business-logic layer of a ledger-backed asset registry.
//!
//! This crate validates, normalizes, stores, retrieves, patches, deletes,
//! and queries asset records keyed by an identifier, on top of an external
//! versioned key-value ledger reached through
//! [`LedgerGateway`](formledger_ledger::LedgerGateway). The ledger itself
//! handles consensus, durability, and transaction ordering; this layer owns
//! the edge-case policy.
//!
//! # Components
//!
//! - [`validate`] - space-stripping normalization and the shared validity checks
//! - [`query`] - compiles a [`Filter`] into the ledger's declarative selector
//! - [`paginate`] - materializes a numbered page out of forward-only cursor queries
//! - [`AssetService`] - the create/get/patch/delete/get-all/history lifecycle
//! - [`AssetContract`] - the JSON string surface the hosting runtime invokes
//!
//! # Quick Start
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use formledger_ledger::MemoryLedger;
//! use formledger_registry::{AssetService, CreateAssetRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = AssetService::new(MemoryLedger::new());
//!
//!     let stored = service
//!         .create(
//!             CreateAssetRequest::builder()
//!                 .id("asset-1")
//!                 .type_form("survey")
//!                 .description("first survey of the season")
//!                 .timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
//!                 .insertion_type("manual")
//!                 .hash("ab12")
//!                 .build(),
//!         )
//!         .await?;
//!
//!     assert_eq!(service.get_by_id("asset-1").await?, stored);
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod contract;
mod error;
mod filter;
/// Page-skipping pagination walker.
pub mod paginate;
/// Filter-to-selector query compiler.
pub mod query;
mod service;
mod types;
/// Validation and normalization helpers.
pub mod validate;

/// JSON string surface of the registry.
pub use contract::AssetContract;
/// Registry error types and result alias.
pub use error::{RegistryError, RegistryResult};
/// Query filter types.
pub use filter::{Filter, TimeRange, TimeRangeError};
/// Lifecycle service.
pub use service::AssetService;
/// Domain records and wire DTOs.
pub use types::{Asset, CreateAssetRequest, HistoryRecord, PatchAssetRequest};
