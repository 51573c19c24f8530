//! Probe endpoint tests.
//!
//! Run with: cargo test --test health_check

mod common;

use annotation_service::services::providers::mock::MockAnnotationProvider;
use common::TestApp;
use std::sync::Arc;

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::spawn(Arc::new(MockAnnotationProvider::new())).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "annotation-service");
}

#[tokio::test]
async fn readiness_check_returns_ok() {
    let app = TestApp::spawn(Arc::new(MockAnnotationProvider::new())).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}
