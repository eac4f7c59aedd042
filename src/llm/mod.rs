// ABOUTME: LLM provider abstraction for PawTrace AI features
// ABOUTME: Defines chat message types and the provider contracts for text and vision backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! # LLM Provider Service Provider Interface
//!
//! This module defines the contract AI backends must implement to plug into
//! the PawTrace orchestration layer. Two concrete providers exist: DashScope
//! (Qwen text + vision) and Gemini. The orchestrator only ever sees the
//! traits, which is also the seam the integration tests mock.
//!
//! ## Key Concepts
//!
//! - **`ChatMessage`**: role-based message structure for conversations
//! - **`CompletionProvider`**: async trait for text chat completion
//! - **`VisionProvider`**: async trait for image-plus-prompt analysis
//!
//! A provider returning `Ok(None)` means the upstream answered with a
//! structurally valid but empty envelope; callers supply the final default.

mod dashscope;
mod gemini;
pub mod orchestrator;
pub mod prompts;

pub use dashscope::{DashScopeProvider, DASHSCOPE_ENDPOINT};
pub use gemini::GeminiProvider;
pub use orchestrator::{AiOrchestrator, Prediction, PredictionSource};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppResult;

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// String form used in provider payloads and the persisted history
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Normalize a raw caller-supplied message array.
///
/// Unknown roles collapse to `user`, content is trimmed, and entries that end
/// up empty are dropped before the list reaches a provider or the history
/// store.
#[must_use]
pub fn normalize_messages(raw: &[Value]) -> Vec<ChatMessage> {
    raw.iter()
        .filter_map(|entry| {
            let role = match entry.get("role").and_then(Value::as_str) {
                Some("assistant") => MessageRole::Assistant,
                _ => MessageRole::User,
            };
            let content = entry
                .get("content")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default();
            if content.is_empty() {
                None
            } else {
                Some(ChatMessage::new(role, content))
            }
        })
        .collect()
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Text chat completion backend.
///
/// Implementations must fail fast with `AppError::Misconfigured` when their
/// credential is absent, before attempting any network I/O.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider display name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Check the credential without performing any I/O.
    ///
    /// Routes call this up front where the contract requires a configuration
    /// failure before request processing.
    fn ensure_configured(&self) -> AppResult<()> {
        Ok(())
    }

    /// Perform a chat completion. `Ok(None)` signals an empty-but-valid
    /// upstream response.
    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<Option<String>>;
}

/// Vision-capable backend analyzing an image alongside a text prompt
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider display name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Analyze a base64-encoded image with the given prompt
    async fn diagnose(
        &self,
        image_base64: &str,
        mime_type: &str,
        prompt: &str,
    ) -> AppResult<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_drops_empty_and_defaults_role() {
        let raw = vec![
            json!({"role": "user", "content": "  hi  "}),
            json!({"role": "assistant", "content": "hello"}),
            json!({"role": "user", "content": "   "}),
            json!({"role": "narrator", "content": "aside"}),
            json!({"content": 42}),
        ];
        let normalized = normalize_messages(&raw);
        assert_eq!(
            normalized,
            vec![
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
                ChatMessage::user("aside"),
            ]
        );
    }
}
