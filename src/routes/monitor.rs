// ABOUTME: Monitoring route handlers for telemetry collection and operational snapshots
// ABOUTME: Exposes the collector write side plus the overview and metrics read sides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Monitoring routes.
//!
//! The collector accepts loosely structured submissions; anything that does
//! not fit the expected shape is dropped rather than rejected, matching the
//! frontend's fire-and-forget usage.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::{errors::AppError, server::ServerResources, telemetry::CollectPayload};

/// Monitoring routes handler
pub struct MonitorRoutes;

impl MonitorRoutes {
    /// Create all monitoring routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/monitor/collect", post(Self::collect))
            .route("/api/monitor/overview", get(Self::overview))
            .route("/api/monitor/metrics", get(Self::metrics))
            .with_state(resources)
    }

    /// Capture a telemetry submission
    async fn collect(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<Value>,
    ) -> Result<Response, AppError> {
        // Tolerant parse: malformed sections collapse to empty defaults
        let payload: CollectPayload = serde_json::from_value(body).unwrap_or_default();
        let receipt = resources.telemetry.capture(payload).await?;
        Ok((StatusCode::OK, Json(receipt)).into_response())
    }

    /// Full retained monitoring set plus summary counts
    async fn overview(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let snapshot = resources.telemetry.overview().await;
        Ok((StatusCode::OK, Json(snapshot)).into_response())
    }

    /// Per-route latency/status snapshot
    async fn metrics(State(resources): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        let snapshot = resources.metrics.snapshot();
        Ok((StatusCode::OK, Json(snapshot)).into_response())
    }
}
