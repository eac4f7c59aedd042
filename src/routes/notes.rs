// ABOUTME: Sticky note route handlers for the community board
// ABOUTME: List, create, delete one, and clear all notes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Sticky note routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors::AppError, models::StickyNote, server::ServerResources};

/// Request body for creating a note
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewNoteRequest {
    /// Note text, trimmed; empty is rejected
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
struct NotesResponse {
    notes: Vec<StickyNote>,
}

#[derive(Debug, Serialize)]
struct NoteResponse {
    note: StickyNote,
}

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
}

/// Sticky note routes handler
pub struct NoteRoutes;

impl NoteRoutes {
    /// Create all sticky note routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/sticky-notes", get(Self::list))
            .route("/api/sticky-notes", post(Self::create))
            .route("/api/sticky-notes", delete(Self::clear))
            .route("/api/sticky-notes/:id", delete(Self::remove))
            .with_state(resources)
    }

    /// List all notes
    async fn list(State(resources): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        let notes = resources.store.read(|doc| doc.sticky_notes.clone()).await;
        Ok((StatusCode::OK, Json(NotesResponse { notes })).into_response())
    }

    /// Create a note
    async fn create(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<NewNoteRequest>,
    ) -> Result<Response, AppError> {
        let text = request
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::invalid_input("Note text is required"))?
            .to_owned();

        let note = StickyNote {
            id: format!("note-{}", Utc::now().timestamp_millis()),
            text,
            created_at: Utc::now().to_rfc3339(),
        };
        let created = note.clone();
        resources
            .store
            .mutate(move |doc| doc.sticky_notes.push(note))
            .await?;
        Ok((StatusCode::OK, Json(NoteResponse { note: created })).into_response())
    }

    /// Delete a note by id
    async fn remove(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .store
            .mutate(move |doc| doc.sticky_notes.retain(|n| n.id != id))
            .await?;
        Ok((StatusCode::OK, Json(SuccessResponse { success: true })).into_response())
    }

    /// Clear all notes
    async fn clear(State(resources): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        resources
            .store
            .mutate(|doc| doc.sticky_notes.clear())
            .await?;
        Ok((StatusCode::OK, Json(SuccessResponse { success: true })).into_response())
    }
}
