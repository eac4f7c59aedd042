// ABOUTME: DashScope (Qwen) provider for text chat and vision diagnosis
// ABOUTME: Talks to the OpenAI-compatible chat completions endpoint with qwen-plus and qwen-vl-plus
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! # DashScope Provider
//!
//! Client for Alibaba DashScope's OpenAI-compatible chat completions API.
//! Serves both the text features (`qwen-plus`) and the vision diagnosis
//! feature (`qwen-vl-plus`, image passed as a data URL part).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatMessage, CompletionProvider, VisionProvider};
use crate::errors::{AppError, AppResult};

/// OpenAI-compatible chat completions endpoint
pub const DASHSCOPE_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

/// Text completion model
const TEXT_MODEL: &str = "qwen-plus";

/// Vision completion model
const VISION_MODEL: &str = "qwen-vl-plus";

/// Connect timeout; the per-call budget is enforced at the dispatch layer
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Fallback MIME type when the caller omits one
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct VisionRequest<'a> {
    model: &'a str,
    messages: Vec<VisionMessage>,
}

#[derive(Debug, Serialize)]
struct VisionMessage {
    role: &'static str,
    content: Vec<VisionPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum VisionPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// DashScope (Qwen) provider covering text completion and vision analysis
pub struct DashScopeProvider {
    client: Client,
    api_key: Option<String>,
}

impl DashScopeProvider {
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
        self.api_key.as_deref().ok_or_else(|| {
            AppError::misconfigured("Backend is not configured with a valid DASHSCOPE_API_KEY.")
        })
    }

    /// Post a completion payload and extract the first choice's text.
    ///
    /// A structurally valid envelope without usable content maps to
    /// `Ok(None)`; the caller supplies the final default.
    async fn post_completion<P: Serialize + Sync>(
        &self,
        key: &str,
        payload: &P,
    ) -> AppResult<Option<String>> {
        let response = self
            .client
            .post(DASHSCOPE_ENDPOINT)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {key}"))
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::provider("DashScope", format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::provider("DashScope", format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(AppError::provider("DashScope", body));
        }

        let envelope: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::provider("DashScope", format!("failed to parse response: {e}")))?;

        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty());

        debug!(
            content_len = content.as_ref().map_or(0, String::len),
            "DashScope completion received"
        );
        Ok(content)
    }
}

#[async_trait]
impl CompletionProvider for DashScopeProvider {
    fn name(&self) -> &'static str {
        "DashScope"
    }

    fn ensure_configured(&self) -> AppResult<()> {
        self.require_key().map(|_| ())
    }

    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<Option<String>> {
        let key = self.require_key()?.to_owned();
        let payload = CompletionRequest {
            model: TEXT_MODEL,
            messages: messages.iter().map(WireMessage::from).collect(),
        };
        self.post_completion(&key, &payload).await
    }
}

#[async_trait]
impl VisionProvider for DashScopeProvider {
    fn name(&self) -> &'static str {
        "DashScope-VL"
    }

    async fn diagnose(
        &self,
        image_base64: &str,
        mime_type: &str,
        prompt: &str,
    ) -> AppResult<Option<String>> {
        let key = self.require_key()?.to_owned();
        let mime = if mime_type.is_empty() {
            DEFAULT_IMAGE_MIME
        } else {
            mime_type
        };
        let payload = VisionRequest {
            model: VISION_MODEL,
            messages: vec![VisionMessage {
                role: "user",
                content: vec![
                    VisionPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{mime};base64,{image_base64}"),
                        },
                    },
                    VisionPart::Text {
                        text: prompt.to_owned(),
                    },
                ],
            }],
        };
        self.post_completion(&key, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let provider = DashScopeProvider::new(None).unwrap();
        let err = provider
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Misconfigured(_)));
    }

    #[test]
    fn vision_payload_shape() {
        let payload = VisionRequest {
            model: VISION_MODEL,
            messages: vec![VisionMessage {
                role: "user",
                content: vec![
                    VisionPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,QUJD".to_owned(),
                        },
                    },
                    VisionPart::Text {
                        text: "look".to_owned(),
                    },
                ],
            }],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["model"], "qwen-vl-plus");
        assert_eq!(value["messages"][0]["content"][0]["type"], "image_url");
        assert_eq!(
            value["messages"][0]["content"][0]["image_url"]["url"],
            "data:image/png;base64,QUJD"
        );
        assert_eq!(value["messages"][0]["content"][1]["type"], "text");
    }
}
