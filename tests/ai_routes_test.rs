// ABOUTME: End-to-end tests for the advice, diagnosis, and prediction routes
// ABOUTME: Asserts validation before dispatch, fallback results, and local-source tagging
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

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Advice
// ============================================================================

#[tokio::test]
async fn advice_rejects_unknown_service_before_dispatch() {
    let qwen = MockCompletion::replying("advice");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("advice");
    let (resources, _guard) = mock_resources(qwen.clone(), vision, gemini).await;

    let response = router(resources)
        .oneshot(json_request(
            "/api/ai/qwen-advice",
            json!({"service": "grooming", "context": "tangles"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "service must be one of health | behavior | diet");
    assert_eq!(qwen.calls(), 0);
}

#[tokio::test]
async fn advice_missing_service_is_rejected() {
    let qwen = MockCompletion::replying("advice");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("advice");
    let (resources, _guard) = mock_resources(qwen.clone(), vision, gemini).await;

    let response = router(resources)
        .oneshot(json_request("/api/ai/qwen-advice", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(qwen.calls(), 0);
}

#[tokio::test]
async fn qwen_advice_returns_result() {
    let qwen = MockCompletion::replying("### Health Checklist\n- plenty of naps");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen.clone(), vision, gemini).await;

    let response = router(resources)
        .oneshot(json_request(
            "/api/ai/qwen-advice",
            json!({
                "service": "health",
                "context": "sleepy lately",
                "profile": {"displayName": "Mila", "mainPetName": "Luna"},
                "pets": [{"name": "Mochi", "type": "Cat"}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["result"], "### Health Checklist\n- plenty of naps");
    assert_eq!(qwen.calls(), 1);
}

#[tokio::test]
async fn qwen_advice_upstream_failure_carries_detail() {
    let qwen = MockCompletion::new("MockText", MockBehavior::Fail("quota exceeded".to_owned()));
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen, vision, gemini).await;

    let response = router(resources)
        .oneshot(json_request(
            "/api/ai/qwen-advice",
            json!({"service": "behavior"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["detail"], "quota exceeded");
}

#[tokio::test]
async fn gemini_credential_check_precedes_service_validation() {
    let qwen = MockCompletion::replying("unused");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::new(
        "MockGemini",
        MockBehavior::Misconfigured("GEMINI_API_KEY is missing on the server.".to_owned()),
    );
    let (resources, _guard) = mock_resources(qwen, vision, gemini.clone()).await;

    // Invalid service AND missing credential: the credential error wins
    let response = router(resources)
        .oneshot(json_request(
            "/api/ai/gemini-advice",
            json!({"service": "grooming"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
    assert_eq!(gemini.calls(), 0);
}

// ============================================================================
// Diagnosis
// ============================================================================

#[tokio::test]
async fn diagnosis_requires_image() {
    let qwen = MockCompletion::replying("unused");
    let vision = MockVision::new(MockBehavior::Reply("unused".to_owned()));
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen, vision.clone(), gemini).await;

    let response = router(resources)
        .oneshot(json_request(
            "/api/ai/gemini-diagnosis",
            json!({"symptoms": "itchy"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "imageBase64 is required");
    assert_eq!(vision.calls(), 0);
}

#[tokio::test]
async fn diagnosis_rejects_invalid_base64() {
    let qwen = MockCompletion::replying("unused");
    let vision = MockVision::new(MockBehavior::Reply("unused".to_owned()));
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen, vision.clone(), gemini).await;

    let response = router(resources)
        .oneshot(json_request(
            "/api/ai/gemini-diagnosis",
            json!({"imageBase64": "not!!base64"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(vision.calls(), 0);
}

#[tokio::test]
async fn diagnosis_uses_text_fallback_when_vision_fails() {
    let qwen = MockCompletion::replying("text-only analysis");
    let vision = MockVision::new(MockBehavior::Fail("model offline".to_owned()));
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen.clone(), vision.clone(), gemini).await;

    let response = router(resources)
        .oneshot(json_request(
            "/api/ai/gemini-diagnosis",
            json!({"imageBase64": "QUJDRA==", "mimeType": "image/png", "symptoms": "limping"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["result"], "text-only analysis");
    assert_eq!(vision.calls(), 1);
    assert_eq!(qwen.calls(), 1);
}

// ============================================================================
// Prediction
// ============================================================================

#[tokio::test]
async fn prediction_without_profile_signal_prompts_for_info() {
    let qwen = MockCompletion::replying("unused");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen.clone(), vision, gemini).await;

    let response = router(resources)
        .oneshot(json_request("/api/pet-prediction", json!({"profile": {}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(
        body["prediction"],
        "Share your star sign or main pet info to unlock predictions."
    );
    assert!(body.get("source").is_none());
    assert_eq!(qwen.calls(), 0);
}

#[tokio::test]
async fn prediction_remote_result_is_untagged() {
    let qwen = MockCompletion::replying("Kiko will chase leaves all week.");
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen, vision, gemini).await;

    let response = router(resources)
        .oneshot(json_request(
            "/api/pet-prediction",
            json!({"profile": {"petName": "Kiko", "starSign": "Aries"}}),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["prediction"], "Kiko will chase leaves all week.");
    assert!(body.get("source").is_none());
}

#[tokio::test]
async fn prediction_fallback_is_tagged_local() {
    let qwen = MockCompletion::new(
        "MockText",
        MockBehavior::Misconfigured("DASHSCOPE_API_KEY missing".to_owned()),
    );
    let vision = MockVision::new(MockBehavior::Empty);
    let gemini = MockCompletion::replying("unused");
    let (resources, _guard) = mock_resources(qwen, vision, gemini).await;

    let response = router(resources)
        .oneshot(json_request(
            "/api/pet-prediction",
            json!({"profile": {"petName": "Kiko", "starSign": "Aries"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["source"], "local");
    assert!(body["prediction"].as_str().unwrap().starts_with("Kiko "));
}
