// ABOUTME: Unified error handling for PawTrace HTTP handlers and AI dispatch
// ABOUTME: Maps the error taxonomy onto HTTP status codes and JSON error bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Application error taxonomy.
//!
//! Provider-level failures (`Timeout`, `Provider`) act as fallback triggers
//! inside the orchestrator and only surface to callers when a chain is
//! exhausted. `InvalidInput` is rejected before any I/O. Upstream detail is
//! logged server-side and carried to the caller in a `detail` field; this is
//! a low-trust demo surface, a stricter deployment would redact it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Convenience alias used across the crate
pub type AppResult<T> = Result<T, AppError>;

/// Unified application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// A required credential is absent or still the placeholder value.
    /// Raised before any network attempt.
    #[error("{0}")]
    Misconfigured(String),

    /// A provider call exceeded the configured budget and was aborted
    #[error("{provider} request exceeded the {budget_ms} ms budget")]
    Timeout {
        /// Provider that was in flight when the budget expired
        provider: String,
        /// Configured budget in milliseconds
        budget_ms: u64,
    },

    /// Non-success HTTP status from an upstream AI provider
    #[error("{provider} API error")]
    Provider {
        /// Provider display name
        provider: String,
        /// Raw upstream response body, kept for diagnostics
        detail: String,
    },

    /// Malformed caller input, rejected before any I/O
    #[error("{0}")]
    InvalidInput(String),

    /// Requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Every option in a fallback chain was exhausted
    #[error("{message}")]
    ServiceUnavailable {
        /// Caller-facing message naming the missing capability
        message: String,
        /// Last upstream failure, if any
        detail: Option<String>,
    },

    /// Document store read or flush failure
    #[error("store error: {0}")]
    Store(String),

    /// Unexpected internal failure
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Missing or placeholder credential
    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self::Misconfigured(msg.into())
    }

    /// Provider call exceeded its budget
    pub fn timeout(provider: impl Into<String>, budget_ms: u64) -> Self {
        Self::Timeout {
            provider: provider.into(),
            budget_ms,
        }
    }

    /// Non-success upstream status with the raw body attached
    pub fn provider(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            detail: detail.into(),
        }
    }

    /// Malformed caller input
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Missing record
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Fallback chain exhausted
    pub fn service_unavailable(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            detail,
        }
    }

    /// Document store failure
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Unexpected internal failure
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Misconfigured(_)
            | Self::Timeout { .. }
            | Self::Provider { .. }
            | Self::ServiceUnavailable { .. }
            | Self::Store(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the orchestrator may advance a fallback chain past this error
    #[must_use]
    pub const fn is_fallback_trigger(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Provider { .. } | Self::Misconfigured(_)
        )
    }

    /// Upstream detail carried to the caller, when present
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Provider { detail, .. } => Some(detail.as_str()),
            Self::ServiceUnavailable { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            // Full detail stays server-side in the log; the body carries a
            // sanitized message plus the raw upstream text under `detail`.
            error!(error = %self, detail = ?self.detail(), "request failed");
        }
        let body = match self.detail() {
            Some(detail) => json!({ "error": self.to_string(), "detail": detail }),
            None => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_trigger_fallback() {
        assert!(AppError::provider("Qwen", "boom").is_fallback_trigger());
        assert!(AppError::timeout("Qwen", 15_000).is_fallback_trigger());
        assert!(AppError::misconfigured("DASHSCOPE_API_KEY missing").is_fallback_trigger());
        assert!(!AppError::invalid_input("bad service").is_fallback_trigger());
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            AppError::invalid_input("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::service_unavailable("gone", None).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
