// ABOUTME: Server resource wiring, router assembly, and the serve loop
// ABOUTME: Injects the shared store, orchestrator, telemetry, and metrics into every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Server assembly.
//!
//! [`ServerResources`] is the single dependency-injection point: every route
//! handler receives it as axum state, and no component reaches for global
//! mutable state. The router wires the API domains, the metrics middleware,
//! CORS, request tracing, and static SPA serving.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{extract::DefaultBodyLimit, middleware, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::ServerConfig,
    errors::{AppError, AppResult},
    llm::AiOrchestrator,
    metrics::{track_requests, RequestMetricsCollector},
    routes::{AiRoutes, ChatRoutes, MonitorRoutes, NoteRoutes, PetRoutes, SiteRoutes},
    store::DocumentStore,
    telemetry::TelemetryCapture,
};

/// JSON body limit, matching the image-upload needs of the diagnosis feature
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Shared resources injected into every route handler
pub struct ServerResources {
    /// Runtime configuration
    pub config: ServerConfig,
    /// JSON document store
    pub store: Arc<DocumentStore>,
    /// AI provider orchestrator
    pub orchestrator: AiOrchestrator,
    /// Bounded telemetry recorder
    pub telemetry: TelemetryCapture,
    /// Request metrics collector
    pub metrics: Arc<RequestMetricsCollector>,
    /// RNG for route-level selection (pet sprites); injected so tests can seed
    rng: Mutex<StdRng>,
}

impl ServerResources {
    /// Wire resources explicitly; integration tests use this with mock
    /// providers and seeded RNGs.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<DocumentStore>,
        orchestrator: AiOrchestrator,
        telemetry: TelemetryCapture,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            store,
            orchestrator,
            telemetry,
            metrics: Arc::new(RequestMetricsCollector::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Build production resources from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or an HTTP client
    /// cannot be created.
    pub async fn from_config(config: ServerConfig) -> AppResult<Arc<Self>> {
        let store = DocumentStore::open(&config.data_dir, config.monitor_max).await?;
        let orchestrator = AiOrchestrator::from_config(&config)?;
        let telemetry = TelemetryCapture::new(store.clone(), StdRng::from_entropy());
        Ok(Arc::new(Self::new(
            config,
            store,
            orchestrator,
            telemetry,
            StdRng::from_entropy(),
        )))
    }

    /// Lock the shared route-level RNG
    pub fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Assemble the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    let static_dir = resources.config.static_dir.clone();
    let spa = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .merge(ChatRoutes::routes(resources.clone()))
        .merge(AiRoutes::routes(resources.clone()))
        .merge(MonitorRoutes::routes(resources.clone()))
        .merge(PetRoutes::routes(resources.clone()))
        .merge(NoteRoutes::routes(resources.clone()))
        .merge(SiteRoutes::routes(resources.clone()))
        .fallback_service(spa)
        .layer(middleware::from_fn_with_state(
            resources.metrics.clone(),
            track_requests,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

/// Bind the listener and serve until shutdown
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server loop fails.
pub async fn serve(resources: Arc<ServerResources>) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], resources.config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("failed to bind {addr}: {e}")))?;
    info!(
        "PawTrace web app running at http://localhost:{}",
        resources.config.http_port
    );
    axum::serve(listener, router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("server error: {e}")))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
