// Refresher tests.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{Refresher, SourceSelector};
use crate::config::{SourcePolicy, StoreMode};
use crate::error_handling::{FailureType, RefreshError, RefreshStats};
use crate::fetch::Fetcher;
use crate::storage::test_helpers::{create_test_store, ips};
use crate::storage::ExitNodeStore;

fn test_fetcher(timeout: Duration) -> Fetcher {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build test client");
    Fetcher::new(Arc::new(client))
}

fn test_refresher(
    server: &MockServer,
    policy: SourcePolicy,
    store: Arc<ExitNodeStore>,
    interval: Duration,
) -> (Refresher, Arc<RefreshStats>) {
    let stats = Arc::new(RefreshStats::new());
    let selector = SourceSelector::new(
        policy,
        format!("{}/exit-addresses", server.uri()),
        format!("{}/torbulkexitlist", server.uri()),
    );
    let refresher = Refresher::new(
        test_fetcher(Duration::from_secs(5)),
        store,
        selector,
        interval,
        Arc::clone(&stats),
    );
    (refresher, stats)
}

#[tokio::test]
async fn test_run_pass_persists_extracted_addresses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/torbulkexitlist"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("1.2.3.4\n# comment\n5.6.7.8\n"),
        )
        .mount(&server)
        .await;

    let (_dir, store) = create_test_store(StoreMode::Shared).await;
    let store = Arc::new(store);
    let (refresher, stats) = test_refresher(
        &server,
        SourcePolicy::BulkExitList,
        Arc::clone(&store),
        Duration::from_secs(300),
    );

    let report = refresher.run_pass().await.expect("pass should succeed");
    assert_eq!(report.extracted, 2);
    assert_eq!(report.persisted, 2);
    assert!(report.source.ends_with("/torbulkexitlist"));

    let mut keys = store.list_keys().await.unwrap();
    keys.sort();
    assert_eq!(keys, ips(&["1.2.3.4", "5.6.7.8"]));
    assert_eq!(
        store.last_seen("1.2.3.4").await.unwrap(),
        Some(report.timestamp)
    );

    assert_eq!(stats.passes_succeeded(), 1);
    assert_eq!(stats.last_success_at(), Some(report.timestamp));
}

#[tokio::test]
async fn test_failed_fetch_leaves_store_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (_dir, store) = create_test_store(StoreMode::Shared).await;
    store.upsert_all(&ips(&["8.8.8.8"]), 42).await.unwrap();
    let store = Arc::new(store);
    let (refresher, stats) = test_refresher(
        &server,
        SourcePolicy::ExitAddresses,
        Arc::clone(&store),
        Duration::from_secs(300),
    );

    let result = refresher.run_pass().await;
    assert!(matches!(result, Err(RefreshError::Fetch(_))));

    assert_eq!(store.list_keys().await.unwrap(), ips(&["8.8.8.8"]));
    assert_eq!(store.last_seen("8.8.8.8").await.unwrap(), Some(42));
    assert_eq!(stats.get_failure_count(FailureType::FetchStatus), 1);
    assert_eq!(stats.passes_succeeded(), 0);
}

#[tokio::test]
async fn test_alternate_policy_fetches_both_sources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exit-addresses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ExitNode ABC\nExitAddress 10.0.0.1 2024-05-12 10:07:05\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/torbulkexitlist"))
        .respond_with(ResponseTemplate::new(200).set_body_string("10.0.0.2\n"))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store) = create_test_store(StoreMode::Shared).await;
    let store = Arc::new(store);
    let (refresher, _stats) = test_refresher(
        &server,
        SourcePolicy::Alternate,
        Arc::clone(&store),
        Duration::from_secs(300),
    );

    let first = refresher.run_pass().await.unwrap();
    let second = refresher.run_pass().await.unwrap();
    assert!(first.source.ends_with("/exit-addresses"));
    assert!(second.source.ends_with("/torbulkexitlist"));

    let mut keys = store.list_keys().await.unwrap();
    keys.sort();
    assert_eq!(keys, ips(&["10.0.0.1", "10.0.0.2"]));
}

#[tokio::test]
async fn test_loop_survives_failures_and_stops_on_cancel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (_dir, store) = create_test_store(StoreMode::Shared).await;
    let (refresher, stats) = test_refresher(
        &server,
        SourcePolicy::BulkExitList,
        Arc::new(store),
        Duration::from_millis(50),
    );

    let cancel = CancellationToken::new();
    let handle = refresher.spawn(cancel.clone());

    tokio::time::sleep(Duration::from_millis(400)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("refresher should stop after cancellation")
        .expect("refresher task should not panic");

    assert!(
        stats.passes_started() >= 2,
        "expected repeated passes after failures, got {}",
        stats.passes_started()
    );
    assert_eq!(stats.passes_succeeded(), 0);
    // The last pass may have been interrupted before recording its failure
    let failures = stats.get_failure_count(FailureType::FetchStatus);
    assert!(failures >= stats.passes_started() - 1);
    assert!(failures <= stats.passes_started());
}

#[tokio::test]
async fn test_cancel_interrupts_in_flight_pass() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("1.2.3.4\n")
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let (_dir, store) = create_test_store(StoreMode::Shared).await;
    let (refresher, stats) = test_refresher(
        &server,
        SourcePolicy::BulkExitList,
        Arc::new(store),
        Duration::from_secs(300),
    );

    let cancel = CancellationToken::new();
    let handle = refresher.spawn(cancel.clone());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(stats.passes_started(), 1);
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("cancellation should not wait for the upstream response")
        .expect("refresher task should not panic");
}
