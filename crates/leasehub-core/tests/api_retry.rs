//! Integration test: API client + retry driver against a local scripted server.

mod common;

use common::stub_server::{self, Scripted};
use leasehub_core::api::{ApiClient, Resource};
use leasehub_core::logger::{LogLevel, Logger, MemorySink};
use leasehub_core::retry::{classify, ErrorKind, RetryOptions};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn quick(max_retries: u32) -> RetryOptions {
    RetryOptions::new(max_retries).with_delay(Duration::from_millis(5))
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn transient_server_errors_then_success() {
    let server = stub_server::start(vec![
        Scripted::new("503 Service Unavailable", r#"{"detail": "warming up"}"#),
        Scripted::new("503 Service Unavailable", ""),
        Scripted::new("200 OK", r#"[{"lead_id": 1, "first_name": "Ada"}]"#),
    ]);
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::with_sink(LogLevel::Debug, sink.clone());

    let leads = client(&server.base_url)
        .list(Resource::Leads, &quick(5), &logger)
        .await
        .expect("leads");

    assert_eq!(server.hits(), 3);
    assert_eq!(leads, vec![json!({"leadId": 1, "firstName": "Ada"})]);
    let warns = sink
        .records()
        .iter()
        .filter(|r| r.level == LogLevel::Warn)
        .count();
    assert_eq!(warns, 2);
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let server = stub_server::start(vec![Scripted::new(
        "401 Unauthorized",
        r#"{"detail": "token expired"}"#,
    )]);
    let err = client(&server.base_url)
        .get_with_retry("/api/bots", &quick(3), &Logger::default())
        .await
        .unwrap_err();

    assert_eq!(server.hits(), 1);
    let classified = classify(&err);
    assert_eq!(classified.kind, ErrorKind::Auth);
    assert_eq!(classified.status_code, Some(401));
    let resp = err.response().expect("response");
    assert_eq!(resp.status_text, "Unauthorized");
    assert_eq!(resp.data, Some(json!({"detail": "token expired"})));
}

#[tokio::test]
async fn validation_detail_reaches_user_message() {
    let server = stub_server::start(vec![Scripted::new(
        "422 Unprocessable Entity",
        r#"{"detail": "Move-in date must be in the future"}"#,
    )]);
    let err = client(&server.base_url)
        .post("/api/leads", &json!({"move_in_date": "2001-01-01"}))
        .await
        .unwrap_err();
    let classified = classify(&err);
    assert_eq!(classified.kind, ErrorKind::Validation);
    assert_eq!(classified.user_message, "Move-in date must be in the future");
}

#[tokio::test]
async fn refused_connection_is_network_and_exhausts() {
    let url = stub_server::refused_url();
    let err = client(&url)
        .get_with_retry("/api/agents", &quick(2), &Logger::default())
        .await
        .unwrap_err();
    let classified = classify(&err);
    assert_eq!(classified.kind, ErrorKind::Network);
    assert!(classified.retryable);
    assert_eq!(classified.status_code, None);
}

#[tokio::test]
async fn slow_backend_is_timeout() {
    let server = stub_server::start(vec![
        Scripted::new("200 OK", "[]").slow(Duration::from_millis(1500))
    ]);
    let slow_client = ApiClient::new(&server.base_url, Duration::from_millis(200)).unwrap();
    let err = slow_client.get("/api/documents").await.unwrap_err();
    assert_eq!(classify(&err).kind, ErrorKind::Timeout);
}

#[tokio::test]
async fn wrapped_collection_is_unwrapped() {
    let server = stub_server::start(vec![Scripted::new(
        "200 OK",
        r#"{"items": [{"bot_name": "Leasing Assistant"}], "total": 1}"#,
    )]);
    let bots = client(&server.base_url)
        .list(Resource::Bots, &quick(1), &Logger::default())
        .await
        .unwrap();
    assert_eq!(bots, vec![json!({"botName": "Leasing Assistant"})]);
}
