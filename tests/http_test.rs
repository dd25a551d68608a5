mod common;

use std::time::{Duration, Instant};

use common::stub_server::{Reply, StubServer};
use lbsky::http::{self, MAX_ATTEMPTS};
use reqwest::StatusCode;
use serde_json::json;

fn client() -> reqwest::Client {
    http::client(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_server_errors_are_retried_until_success() {
    let server = StubServer::sequence(vec![
        Reply::status(503).with_header("Retry-After", "0"),
        Reply::status(503).with_header("Retry-After", "0"),
        Reply::json(200, json!({ "ok": true })),
    ])
    .await;

    let response = http::send(client().get(format!("{}/ping", server.url)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.count(), 3);
}

#[tokio::test]
async fn test_last_response_is_returned_after_max_attempts() {
    let server =
        StubServer::sequence(vec![Reply::status(503).with_header("Retry-After", "0")]).await;

    let response = http::send(client().get(format!("{}/ping", server.url)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(server.count(), MAX_ATTEMPTS as usize);
}

#[tokio::test]
async fn test_non_retryable_status_is_returned_at_once() {
    let server = StubServer::sequence(vec![Reply::status(404)]).await;

    let response = http::send(client().get(format!("{}/missing", server.url)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.count(), 1);
}

#[tokio::test]
async fn test_retry_after_replaces_backoff() {
    // backoff alone would wait 1s + 2s
    let server = StubServer::sequence(vec![
        Reply::status(429).with_header("Retry-After", "0"),
        Reply::status(503).with_header("Retry-After", "1"),
        Reply::json(200, json!({})),
    ])
    .await;

    let started = Instant::now();
    let response = http::send(client().get(format!("{}/ping", server.url)))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.count(), 3);
    assert!(elapsed >= Duration::from_secs(1), "waited {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(3), "waited {:?}", elapsed);
}

#[tokio::test]
async fn test_excessive_retry_after_falls_back_to_backoff() {
    let server = StubServer::sequence(vec![
        Reply::status(503).with_header("Retry-After", "121"),
        Reply::json(200, json!({})),
    ])
    .await;

    let started = Instant::now();
    let response = http::send(client().get(format!("{}/ping", server.url)))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(elapsed >= Duration::from_secs(1), "waited {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10), "waited {:?}", elapsed);
}

#[tokio::test]
async fn test_timed_out_request_is_repeated() {
    let server = StubServer::start(|i, _| {
        if i == 0 {
            Reply::Hang
        } else {
            Reply::json(200, json!({}))
        }
    })
    .await;
    let client = http::client(Duration::from_millis(300)).unwrap();

    let response = http::send(client.get(format!("{}/slow", server.url)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.count(), 2);
}

#[tokio::test]
async fn test_timed_out_non_idempotent_request_is_sent_once() {
    let server = StubServer::sequence(vec![Reply::Hang]).await;
    let client = http::client(Duration::from_millis(300)).unwrap();

    let result = http::send_non_idempotent(
        client
            .post(format!("{}/create", server.url))
            .json(&json!({ "text": "hi" })),
    )
    .await;

    assert!(result.unwrap_err().is_timeout());
    assert_eq!(server.count(), 1);
}

#[tokio::test]
async fn test_non_idempotent_request_still_retries_server_errors() {
    let server = StubServer::sequence(vec![
        Reply::status(502).with_header("Retry-After", "0"),
        Reply::json(200, json!({})),
    ])
    .await;

    let response = http::send_non_idempotent(
        client()
            .post(format!("{}/create", server.url))
            .json(&json!({ "text": "hi" })),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.count(), 2);
    assert_eq!(server.requests()[1].json()["text"], "hi");
}
