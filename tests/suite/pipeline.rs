//! End-to-end runs of the coordinator against a mock storage API.

use std::time::Duration;

use incinerator_client::{FetchError, TransportError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{
    INCINERATE_PATH, STORAGE_PATH, coordinator_for, incinerated_ids, mount_collection,
    mount_incinerate_ok, start_storage_mock,
};

#[tokio::test]
async fn reference_scenario_incinerates_only_a() {
    let server = start_storage_mock().await;
    mount_collection(
        &server,
        json!([
            {"item": {"id": "A", "degradation": 0}},
            {"item": {"id": "B", "degradation": 1}},
            {"item": {"degradation": 0}},
        ]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path(INCINERATE_PATH))
        .and(body_json(json!({"itemToIncinerateId": "A"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let summary = coordinator_for(&server, 8).run().await.unwrap();

    assert_eq!(summary.records, 3);
    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(incinerated_ids(&server).await, vec!["A"]);
}

#[tokio::test]
async fn fetch_http_500_aborts_without_dispatch() {
    let server = start_storage_mock().await;
    Mock::given(method("GET"))
        .and(path(STORAGE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .expect(1)
        .mount(&server)
        .await;
    mount_incinerate_ok(&server, 0, Duration::ZERO).await;

    let err = coordinator_for(&server, 8).run().await.unwrap_err();

    match err {
        FetchError::Transport(TransportError::Status { status, body, .. }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "database unavailable");
        }
        other => panic!("expected transport status error, got {other:?}"),
    }
    assert!(incinerated_ids(&server).await.is_empty());
}

#[tokio::test]
async fn malformed_collection_aborts_without_dispatch() {
    let server = start_storage_mock().await;
    Mock::given(method("GET"))
        .and(path(STORAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "not a list"})))
        .mount(&server)
        .await;
    mount_incinerate_ok(&server, 0, Duration::ZERO).await;

    let err = coordinator_for(&server, 8).run().await.unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn fifty_matches_are_all_dispatched_before_run_returns() {
    let server = start_storage_mock().await;
    let records: Vec<_> = (0..50)
        .map(|n| json!({"item": {"id": format!("item-{n:02}"), "degradation": 0}}))
        .collect();
    mount_collection(&server, json!(records)).await;
    mount_incinerate_ok(&server, 50, Duration::from_millis(30)).await;

    let summary = coordinator_for(&server, 0).run().await.unwrap();

    assert_eq!(summary.attempted, 50);
    assert_eq!(summary.succeeded, 50);
    let ids = incinerated_ids(&server).await;
    assert_eq!(ids.len(), 50);
    assert_eq!(ids.first().map(String::as_str), Some("item-00"));
    assert_eq!(ids.last().map(String::as_str), Some("item-49"));
}

#[tokio::test]
async fn rejected_dispatches_are_reported_and_siblings_complete() {
    let server = start_storage_mock().await;
    mount_collection(
        &server,
        json!([
            {"item": {"id": "keep-going", "degradation": 0}},
            {"item": {"id": "locked", "degradation": 0}},
            {"item": {"id": "also-fine", "degradation": 0}},
        ]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path(INCINERATE_PATH))
        .and(body_json(json!({"itemToIncinerateId": "locked"})))
        .respond_with(ResponseTemplate::new(403).set_body_string("item is locked"))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_incinerate_ok(&server, 2, Duration::ZERO).await;

    let summary = coordinator_for(&server, 2).run().await.unwrap();

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.id.as_str(), "locked");
    assert!(failure.reason.contains("403"), "{}", failure.reason);
    assert!(failure.reason.contains("item is locked"), "{}", failure.reason);
}

#[tokio::test]
async fn non_matching_and_heterogeneous_records_are_skipped() {
    let server = start_storage_mock().await;
    mount_collection(
        &server,
        json!([
            {"item": {"id": 12, "degradation": 0}},
            {"item": {"id": "str-degradation", "degradation": "0"}},
            {"item": null},
            {"slot": 4},
            {"item": {"id": "Z", "degradation": 0.0}},
        ]),
    )
    .await;
    mount_incinerate_ok(&server, 1, Duration::ZERO).await;

    let summary = coordinator_for(&server, 4).run().await.unwrap();

    assert_eq!(summary.records, 5);
    assert_eq!(summary.attempted, 1);
    assert_eq!(incinerated_ids(&server).await, vec!["Z"]);
}
