// ABOUTME: Chat route handlers for persona conversations and chat history
// ABOUTME: Normalizes inbound messages, dispatches to the orchestrator, and persists history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Chat routes.
//!
//! `POST /api/chat` drives the persona conversation: the credential check
//! happens before any processing, the message array is validated before any
//! I/O, and the normalized exchange is appended to the contact's history and
//! flushed before the response is sent. The telemetry mirror of the exchange
//! is best-effort and never fails the request.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::{
    errors::AppError,
    llm::{normalize_messages, ChatMessage},
    server::ServerResources,
};

/// Reply payload for a chat completion
#[derive(Debug, Serialize)]
struct ChatReplyResponse {
    reply: String,
}

/// History payload for a contact
#[derive(Debug, Serialize)]
struct HistoryResponse {
    history: Vec<ChatMessage>,
}

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat", post(Self::send_message))
            .route("/api/chat/history/:contact_id", get(Self::history))
            .with_state(resources)
    }

    /// Handle a persona chat exchange
    async fn send_message(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<Value>,
    ) -> Result<Response, AppError> {
        // Credential failure is terminal before any processing
        resources.orchestrator.ensure_chat_ready()?;

        let raw_messages = body
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::invalid_input("messages array is required"))?;
        let contact_id = body
            .get("contactId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let contact_profile = body.get("contactProfile").and_then(Value::as_str);

        let normalized = normalize_messages(raw_messages);
        let reply = resources
            .orchestrator
            .chat(&contact_id, &normalized, contact_profile)
            .await?;

        // History must be durable before the reply goes out
        let mut entries = normalized.clone();
        entries.push(ChatMessage::assistant(reply.clone()));
        resources.store.append_history(&contact_id, entries).await?;

        if let Err(e) = resources
            .telemetry
            .record_chat_log(&contact_id, &normalized, &reply)
            .await
        {
            warn!(error = %e, "failed to record chat log capture");
        }

        Ok((StatusCode::OK, Json(ChatReplyResponse { reply })).into_response())
    }

    /// Return the ordered history for a contact
    async fn history(
        State(resources): State<Arc<ServerResources>>,
        Path(contact_id): Path<String>,
    ) -> Result<Response, AppError> {
        let history = resources.store.history(&contact_id).await;
        Ok((StatusCode::OK, Json(HistoryResponse { history })).into_response())
    }
}
