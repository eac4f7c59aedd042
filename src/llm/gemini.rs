// ABOUTME: Gemini provider for single-shot advice generation
// ABOUTME: Talks to the generateContent endpoint and joins candidate part texts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! # Gemini Provider
//!
//! Client for Google's `generateContent` API. Message lists are folded into
//! content parts (the advice feature sends a single rendered prompt, so the
//! fold is usually the identity).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatMessage, CompletionProvider};
use crate::errors::{AppError, AppResult};

/// generateContent endpoint for the flash model
const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Connect timeout; the per-call budget is enforced at the dispatch layer
const CONNECT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Gemini text generation provider
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
}

impl GeminiProvider {
    /// Create a provider. The credential may be absent; every call then fails
    /// fast with a `Misconfigured` error before any network attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: Option<String>) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, api_key })
    }

    /// Resolve the credential or fail fast
    fn require_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::misconfigured("GEMINI_API_KEY is missing on the server."))
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn ensure_configured(&self) -> AppResult<()> {
        self.require_key().map(|_| ())
    }

    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<Option<String>> {
        let key = self.require_key()?.to_owned();

        let payload = GenerateRequest {
            contents: vec![Content {
                parts: messages
                    .iter()
                    .map(|m| Part {
                        text: m.content.clone(),
                    })
                    .collect(),
            }],
        };

        let response = self
            .client
            .post(GEMINI_ENDPOINT)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::provider("Gemini", format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::provider("Gemini", format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(AppError::provider("Gemini", body));
        }

        let envelope: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::provider("Gemini", format!("failed to parse response: {e}")))?;

        let text = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
            .filter(|joined| !joined.trim().is_empty());

        debug!(
            content_len = text.as_ref().map_or(0, String::len),
            "Gemini completion received"
        );
        Ok(text)
    }
}
