//! Pagination and filtered-query tests for `AssetService::get_all`.
//!
//! Exercises the page-skipping walk end to end: page boundaries, end-of-data
//! behavior, the number of underlying cursor queries, cursor release, and
//! selector narrowing by set membership and time range.

#![allow(clippy::expect_used, clippy::panic)]

use chrono::{DateTime, TimeZone, Utc};
use formledger_ledger::{LedgerGateway, MemoryLedger};
use formledger_registry::{
    AssetService, CreateAssetRequest, Filter, TimeRange,
};
use rstest::rstest;

fn ts(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).single().expect("valid timestamp")
}

fn request(id: &str, type_form: &str, hour: u32) -> CreateAssetRequest {
    CreateAssetRequest::builder()
        .id(id)
        .type_form(type_form)
        .description("seeded for pagination")
        .timestamp(ts(hour))
        .insertion_type("manual")
        .hash(format!("hash-{id}"))
        .build()
}

/// Seeds `count` assets with ids `asset-1 ..= asset-count`, alternating
/// between the `survey` and `census` form kinds.
async fn seeded(count: u32) -> (AssetService<MemoryLedger>, MemoryLedger) {
    let ledger = MemoryLedger::new();
    let service = AssetService::new(ledger.clone());
    for n in 1..=count {
        let type_form = if n % 2 == 0 { "census" } else { "survey" };
        service.create(request(&format!("asset-{n}"), type_form, n)).await.expect("seed");
    }
    (service, ledger)
}

fn ids(assets: &[formledger_registry::Asset]) -> Vec<&str> {
    assets.iter().map(|asset| asset.id.as_str()).collect()
}

// ============================================================================
// Page boundaries
// ============================================================================

#[rstest]
#[case(0, 3)]
#[case(1, 3)]
#[case(2, 1)]
#[case(3, 0)]
#[case(4, 0)]
#[tokio::test]
async fn test_seven_records_in_pages_of_three(#[case] page: usize, #[case] expected: usize) {
    let (service, _ledger) = seeded(7).await;

    let assets = service.get_all(page, 3, &Filter::default()).await.expect("get_all");
    assert_eq!(assets.len(), expected, "page {page}");
}

#[tokio::test]
async fn test_pages_cover_everything_with_no_overlap_and_no_gaps() {
    let (service, _ledger) = seeded(7).await;

    let mut seen = Vec::new();
    for page in 0..3 {
        let assets = service.get_all(page, 3, &Filter::default()).await.expect("get_all");
        seen.extend(assets.into_iter().map(|asset| asset.id));
    }

    assert_eq!(
        seen,
        ["asset-1", "asset-2", "asset-3", "asset-4", "asset-5", "asset-6", "asset-7"]
    );
}

#[tokio::test]
async fn test_dataset_smaller_than_one_page_is_returned_whole() {
    let (service, ledger) = seeded(2).await;
    let before = ledger.query_count();

    let assets = service.get_all(0, 10, &Filter::default()).await.expect("get_all");
    assert_eq!(ids(&assets), ["asset-1", "asset-2"]);

    // End of data is visible on the very first query; no second one is made.
    assert_eq!(ledger.query_count() - before, 1);
}

#[tokio::test]
async fn test_page_past_a_single_page_dataset_is_empty() {
    let (service, ledger) = seeded(2).await;
    let before = ledger.query_count();

    let assets = service.get_all(1, 10, &Filter::default()).await.expect("get_all");
    assert!(assets.is_empty());
    assert_eq!(ledger.query_count() - before, 1);
}

#[tokio::test]
async fn test_empty_dataset_yields_an_empty_page() {
    let ledger = MemoryLedger::new();
    let service = AssetService::new(ledger);

    let assets = service.get_all(0, 5, &Filter::default()).await.expect("get_all");
    assert!(assets.is_empty());
}

// ============================================================================
// Cursor discipline
// ============================================================================

#[tokio::test]
async fn test_skipping_to_page_two_issues_exactly_three_queries() {
    let (service, ledger) = seeded(7).await;
    let before = ledger.query_count();

    let assets = service.get_all(2, 1, &Filter::default()).await.expect("get_all");
    assert_eq!(ids(&assets), ["asset-3"]);

    assert_eq!(ledger.query_count() - before, 3);
    assert_eq!(ledger.open_cursors(), 0, "every cursor must be released");
}

#[tokio::test]
async fn test_gateway_skips_values_that_are_not_json() {
    let (service, ledger) = seeded(1).await;
    ledger.put("asset-0", b"{not json".to_vec()).await.expect("plant broken value");

    // The broken value cannot match any selector, so it is skipped by the
    // gateway; the walk still succeeds and releases its cursors.
    let assets = service.get_all(0, 5, &Filter::default()).await.expect("get_all");
    assert_eq!(ids(&assets), ["asset-1"]);
    assert_eq!(ledger.open_cursors(), 0);
}

#[tokio::test]
async fn test_cursors_are_released_when_decoding_fails() {
    let (service, ledger) = seeded(1).await;
    // Valid JSON, matches the empty selector, but is not an asset record.
    ledger.put("asset-0", br#"{"foo":1}"#.to_vec()).await.expect("plant foreign value");

    let err = service.get_all(0, 5, &Filter::default()).await.expect_err("foreign value");
    assert!(err.to_string().starts_with("error decoding value from the ledger"));
    assert_eq!(ledger.open_cursors(), 0, "cursor must be released on the error path");
}

#[tokio::test]
async fn test_gateway_rejection_surfaces_the_failing_step() {
    let (service, ledger) = seeded(1).await;

    let err = formledger_registry::paginate::fetch_page(service.gateway(), "not a selector", 0, 5)
        .await
        .expect_err("bad selector");
    assert!(err.to_string().starts_with("error querying the ledger"));
    assert_eq!(ledger.open_cursors(), 0);
}

// ============================================================================
// Selector narrowing
// ============================================================================

#[tokio::test]
async fn test_filter_by_type_form() {
    let (service, _ledger) = seeded(7).await;

    let filter = Filter::builder().type_forms(vec!["census".into()]).build();
    let assets = service.get_all(0, 10, &filter).await.expect("get_all");
    assert_eq!(ids(&assets), ["asset-2", "asset-4", "asset-6"]);
}

#[tokio::test]
async fn test_filter_by_ids_is_normalized_before_matching() {
    let (service, _ledger) = seeded(3).await;

    let filter = Filter::builder()
        .ids(vec![" asset - 1 ".into(), "asset-3".into()])
        .build();
    let assets = service.get_all(0, 10, &filter).await.expect("get_all");
    assert_eq!(ids(&assets), ["asset-1", "asset-3"]);
}

#[tokio::test]
async fn test_filter_by_inclusive_time_range() {
    let (service, _ledger) = seeded(5).await;

    let filter = Filter::builder().time_range(TimeRange::new(ts(2), ts(4))).build();
    let assets = service.get_all(0, 10, &filter).await.expect("get_all");

    // Both ends of the window are inclusive.
    assert_eq!(ids(&assets), ["asset-2", "asset-3", "asset-4"]);
}

#[tokio::test]
async fn test_filtered_results_paginate_too() {
    let (service, _ledger) = seeded(7).await;

    let filter = Filter::builder().type_forms(vec!["survey".into()]).build();
    let first = service.get_all(0, 2, &filter).await.expect("page 0");
    let second = service.get_all(1, 2, &filter).await.expect("page 1");

    assert_eq!(ids(&first), ["asset-1", "asset-3"]);
    assert_eq!(ids(&second), ["asset-5", "asset-7"]);
}

#[tokio::test]
async fn test_inconsistent_time_range_fails_before_any_query() {
    let (service, ledger) = seeded(2).await;
    let before = ledger.query_count();

    let filter = Filter::builder()
        .time_range(TimeRange { min: Some(ts(3)), max: None })
        .build();
    let err = service.get_all(0, 10, &filter).await.expect_err("bad range");
    assert_eq!(err.to_string(), "maximum bound missing while minimum is set");
    assert_eq!(ledger.query_count(), before);
}
