// ABOUTME: End-to-end tests for the monitoring routes
// ABOUTME: Exercises the collector acknowledgment, the overview snapshot, and the metrics endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{mock_resources, MockBehavior, MockCompletion, MockVision};
use pawtrace_server::server::router;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn collect_acknowledges_captured_counts_and_totals() {
    let qwen = MockCompletion::replying("unused");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen, vision, gemini).await;

    let response = router(resources)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/monitor/collect")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "userProfile": {"username": "demo"},
                        "pets": [{"name": "Mocha"}, {"name": "Pixel"}],
                        "shopping": [{"item": "chew toy"}],
                        "metadata": {"page": "checkout"}
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["captured"]["userProfiles"], 1);
    assert_eq!(body["captured"]["petProfiles"], 2);
    assert_eq!(body["captured"]["purchases"], 1);
    assert_eq!(body["totals"]["petProfiles"], 2);
    assert_eq!(body["totals"]["chatLogs"], 0);
}

#[tokio::test]
async fn overview_exposes_retained_set_and_cross_referenced_counts() {
    let qwen = MockCompletion::replying("hello from the mock");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen, vision, gemini).await;

    // Drive one chat exchange so the overview has chat data to report
    let chat = router(resources.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "contactId": "c1",
                        "messages": [{"role": "user", "content": "hi"}]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(chat.status(), StatusCode::OK);

    let response = router(resources)
        .oneshot(get("/api/monitor/overview"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["summary"]["chatLogs"], 1);
    assert_eq!(body["summary"]["contactsTracked"], 1);
    // Seeded rosters come along for cross-reference
    assert_eq!(body["users"].as_array().unwrap().len(), 4);
    assert_eq!(body["pets"].as_array().unwrap().len(), 5);
    assert_eq!(body["monitoring"]["chatLogs"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["chatHistory"]["c1"].as_array().unwrap().len(),
        2
    );
}

#[tokio::test]
async fn metrics_endpoint_reports_per_route_counts() {
    let qwen = MockCompletion::replying("unused");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen, vision, gemini).await;

    for _ in 0..2 {
        let status = router(resources.clone())
            .oneshot(get("/api/status"))
            .await
            .unwrap();
        assert_eq!(status.status(), StatusCode::OK);
    }

    let response = router(resources)
        .oneshot(get("/api/monitor/metrics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert!(body["requests"].as_u64().unwrap() >= 2);
    let route = &body["routes"]["/api/status"];
    assert_eq!(route["count"], 2);
    assert_eq!(route["status"]["200"], 2);
    assert!(route["maxMs"].as_f64().unwrap() >= route["avgMs"].as_f64().unwrap());
}

#[tokio::test]
async fn collect_tolerates_malformed_sections() {
    let qwen = MockCompletion::replying("unused");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen, vision, gemini).await;

    let response = router(resources)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/monitor/collect")
                .header("content-type", "application/json")
                .body(Body::from(json!({"pets": "not a list"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["captured"]["petProfiles"], 0);
}
