// ABOUTME: AI route handlers for advice, image diagnosis, and weekly predictions
// ABOUTME: Validates caller input before any I/O and delegates to the orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! AI feature routes.
//!
//! Validation errors are rejected here, before any provider dispatch; the
//! fallback policy itself lives in the orchestrator.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{
    errors::AppError,
    llm::PredictionSource,
    models::{OwnerProfile, PetSummary, ServiceKind},
    server::ServerResources,
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body shared by the advice endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdviceRequest {
    /// Requested service kind as a raw string, validated by the handler
    pub service: Option<String>,
    /// Free-text user context
    pub context: Option<String>,
    /// Owner profile, loosely structured
    pub profile: OwnerProfile,
    /// Additional pets, loosely structured
    pub pets: Vec<PetSummary>,
}

/// Request body for the diagnosis endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosisRequest {
    /// Base64-encoded image, required
    pub image_base64: Option<String>,
    /// Image MIME type, defaults to JPEG at the provider layer
    pub mime_type: Option<String>,
    /// Reported symptoms
    pub symptoms: Option<String>,
}

/// Request body for the prediction endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredictionRequest {
    /// Owner profile, loosely structured
    pub profile: OwnerProfile,
}

/// Advice/diagnosis result payload
#[derive(Debug, Serialize)]
struct ResultResponse {
    result: String,
}

/// Prediction payload; `source` appears only for the local heuristic
#[derive(Debug, Serialize)]
struct PredictionResponse {
    prediction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<PredictionSource>,
}

// ============================================================================
// AI Routes
// ============================================================================

/// AI feature routes handler
pub struct AiRoutes;

impl AiRoutes {
    /// Create all AI feature routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/ai/qwen-advice", post(Self::qwen_advice))
            .route("/api/ai/gemini-advice", post(Self::gemini_advice))
            .route("/api/ai/gemini-diagnosis", post(Self::gemini_diagnosis))
            .route("/api/pet-prediction", post(Self::pet_prediction))
            .with_state(resources)
    }

    /// Parse and validate the service kind from a raw advice request
    fn parse_service(raw: Option<&str>) -> Result<ServiceKind, AppError> {
        raw.and_then(ServiceKind::parse)
            .ok_or_else(|| AppError::invalid_input("service must be one of health | behavior | diet"))
    }

    /// Qwen-backed advice
    async fn qwen_advice(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<AdviceRequest>,
    ) -> Result<Response, AppError> {
        let service = Self::parse_service(request.service.as_deref())?;
        let result = resources
            .orchestrator
            .qwen_advice(
                service,
                request.context.as_deref().unwrap_or_default(),
                &request.profile,
                &request.pets,
            )
            .await?;
        Ok((StatusCode::OK, Json(ResultResponse { result })).into_response())
    }

    /// Gemini-backed advice; credential failure precedes validation here
    async fn gemini_advice(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<AdviceRequest>,
    ) -> Result<Response, AppError> {
        resources.orchestrator.ensure_gemini_ready()?;
        let service = Self::parse_service(request.service.as_deref())?;
        let result = resources
            .orchestrator
            .gemini_advice(
                service,
                request.context.as_deref().unwrap_or_default(),
                &request.profile,
                &request.pets,
            )
            .await?;
        Ok((StatusCode::OK, Json(ResultResponse { result })).into_response())
    }

    /// Image diagnosis with vision-then-text fallback
    async fn gemini_diagnosis(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<DiagnosisRequest>,
    ) -> Result<Response, AppError> {
        let image = request
            .image_base64
            .as_deref()
            .filter(|img| !img.is_empty())
            .ok_or_else(|| AppError::invalid_input("imageBase64 is required"))?;
        base64::engine::general_purpose::STANDARD
            .decode(image)
            .map_err(|_| AppError::invalid_input("imageBase64 is not valid base64"))?;

        let result = resources
            .orchestrator
            .diagnose(
                image,
                request.mime_type.as_deref().unwrap_or_default(),
                request.symptoms.as_deref(),
            )
            .await?;
        Ok((StatusCode::OK, Json(ResultResponse { result })).into_response())
    }

    /// Weekly prediction with eager local fallback
    async fn pet_prediction(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<PredictionRequest>,
    ) -> Result<Response, AppError> {
        let prediction = resources.orchestrator.predict(&request.profile).await;
        let source = match prediction.source {
            PredictionSource::Local => Some(PredictionSource::Local),
            PredictionSource::Remote => None,
        };
        Ok((
            StatusCode::OK,
            Json(PredictionResponse {
                prediction: prediction.text,
                source,
            }),
        )
            .into_response())
    }
}
