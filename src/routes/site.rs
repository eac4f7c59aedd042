// ABOUTME: Community roster, readiness probe, and map location route handlers
// ABOUTME: Read-only plumbing endpoints backing the SPA shell
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Site-level routes: users, status, and the demo map spots.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    errors::AppError, llm::DASHSCOPE_ENDPOINT, models::CommunityUser, server::ServerResources,
};

#[derive(Debug, Serialize)]
struct UsersResponse {
    users: Vec<CommunityUser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    ready: bool,
    ai_endpoint: &'static str,
    last_sync: String,
}

#[derive(Debug, Serialize)]
struct MapSpot {
    id: &'static str,
    name: &'static str,
    desc: &'static str,
    link: &'static str,
}

#[derive(Debug, Serialize)]
struct MapLocationsResponse {
    spots: Vec<MapSpot>,
}

/// Site routes handler
pub struct SiteRoutes;

impl SiteRoutes {
    /// Create all site routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users", get(Self::users))
            .route("/api/status", get(Self::status))
            .route("/api/map-locations", get(Self::map_locations))
            .with_state(resources)
    }

    /// List the community member roster
    async fn users(State(resources): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        let users = resources.store.read(|doc| doc.users.clone()).await;
        Ok((StatusCode::OK, Json(UsersResponse { users })).into_response())
    }

    /// Readiness probe with the configured AI endpoint
    async fn status(State(_): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        Ok((
            StatusCode::OK,
            Json(StatusResponse {
                ready: true,
                ai_endpoint: DASHSCOPE_ENDPOINT,
                last_sync: Utc::now().to_rfc3339(),
            }),
        )
            .into_response())
    }

    /// Hard-coded campus map spots rendered by the frontend widget
    async fn map_locations(
        State(_): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        Ok((
            StatusCode::OK,
            Json(MapLocationsResponse {
                spots: vec![
                    MapSpot {
                        id: "1",
                        name: "Central Lawn",
                        desc: "Wide grass field...",
                        link: "https://taicang.edu/campus/central-lawn",
                    },
                    MapSpot {
                        id: "2",
                        name: "Orange Corner Café",
                        desc: "Pet-friendly café with outdoor seating.",
                        link: "https://taicang.edu/campus/orange-cafe",
                    },
                ],
            }),
        )
            .into_response())
    }
}
