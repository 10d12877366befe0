//! Page-skipping pagination walker.
//!
//! The gateway only supports forward cursor advancement, while the public
//! contract is page-number addressed. The walker re-derives the target page
//! on every call: it re-queries from the first page, consuming intermediate
//! pages without decoding them, and decodes only the target page's records.
//!
//! Cost is O(page) queries and O(page·size) discarded reads per call. Each
//! page's cursor is dropped (closing the ledger-side resource) before the
//! next query is issued, on success and on error alike.
//!
//! Because every call re-walks from the first page, concurrent calls under
//! a changing dataset may observe different snapshots per page; that read
//! skew is an accepted consequence of the cursor re-derivation strategy.

use formledger_ledger::{LedgerGateway, QueryScan};

use crate::{
    error::{RegistryError, RegistryResult},
    types::Asset,
};

/// Materializes page `page` (zero-indexed, `size` records per page) of the
/// matches selected by `selector`.
///
/// A page beyond the available data yields an empty sequence, not an error.
///
/// # Errors
///
/// Gateway failures are wrapped with the step that was underway; a stored
/// value that does not decode as an [`Asset`] is a decode error.
pub async fn fetch_page<G>(
    gateway: &G,
    selector: &str,
    page: usize,
    size: usize,
) -> RegistryResult<Vec<Asset>>
where
    G: LedgerGateway + ?Sized,
{
    let limit = u32::try_from(size).map_err(|_| RegistryError::PageSizeInvalid)?;
    tracing::debug!(page, size, "walking query pages");

    let mut cursor = String::new();
    let mut collected = Vec::new();

    for current in 0..=page {
        let is_target = current == page;

        let QueryScan { mut records, bookmark } = gateway
            .query_with_cursor(selector, limit, &cursor)
            .await
            .map_err(|source| RegistryError::gateway("error querying the ledger", source))?;

        if is_target {
            loop {
                let record = records.next().map_err(|source| {
                    RegistryError::gateway("error getting an item from the iterator", source)
                })?;
                let Some(record) = record else { break };

                let asset: Asset = serde_json::from_slice(&record.value)
                    .map_err(|source| RegistryError::decode("value from the ledger", source))?;
                collected.push(asset);
            }
        }
        // Intermediate pages are consumed only to advance the cursor.
        drop(records);

        if bookmark == cursor {
            // No progress: end of data reached.
            break;
        }
        cursor = bookmark;
        if cursor.is_empty() {
            // The gateway reported no further matches after this page.
            break;
        }
    }

    Ok(collected)
}
