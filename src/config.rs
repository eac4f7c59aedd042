// ABOUTME: Environment-driven server configuration for PawTrace
// ABOUTME: Loads ports, AI credentials, timeout budget, and telemetry retention caps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Server configuration.
//!
//! Configuration is environment-only. A missing AI credential is a valid,
//! expected runtime state (the server starts and runs in degraded /
//! local-fallback mode), never a startup failure.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Placeholder value shipped in sample env files; treated the same as an
/// absent credential.
pub const DASHSCOPE_PLACEHOLDER: &str = "YOUR_DASHSCOPE_API_KEY_HERE";

/// Default per-call AI budget in milliseconds
const DEFAULT_AI_TIMEOUT_MS: u64 = 15_000;

/// Default HTTP port
const DEFAULT_PORT: u16 = 3000;

/// Runtime configuration for the PawTrace server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port (`PORT`)
    pub http_port: u16,
    /// DashScope (Qwen) credential (`DASHSCOPE_API_KEY`); `None` when absent
    /// or still the placeholder value
    pub dashscope_api_key: Option<String>,
    /// Gemini credential (`GEMINI_API_KEY`, falling back to `API_KEY`)
    pub gemini_api_key: Option<String>,
    /// Per-call budget for AI provider requests (`AI_TIMEOUT_MS`)
    pub ai_timeout: Duration,
    /// Maximum retained telemetry records per category (`MONITOR_MAX`)
    pub monitor_max: usize,
    /// Directory holding the JSON document store (`PAWTRACE_DATA_DIR`)
    pub data_dir: PathBuf,
    /// Directory holding the SPA frontend (`PAWTRACE_STATIC_DIR`)
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from the environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            http_port: parse_env("PORT", DEFAULT_PORT),
            dashscope_api_key: credential_env("DASHSCOPE_API_KEY"),
            gemini_api_key: credential_env("GEMINI_API_KEY")
                .or_else(|| credential_env("API_KEY")),
            ai_timeout: Duration::from_millis(parse_env("AI_TIMEOUT_MS", DEFAULT_AI_TIMEOUT_MS)),
            monitor_max: parse_env("MONITOR_MAX", crate::telemetry::DEFAULT_CAPACITY),
            data_dir: env::var("PAWTRACE_DATA_DIR")
                .map_or_else(|_| PathBuf::from("data"), PathBuf::from),
            static_dir: env::var("PAWTRACE_STATIC_DIR")
                .map_or_else(|_| PathBuf::from("frontend"), PathBuf::from),
        }
    }

    /// Budget for a single AI provider call in milliseconds
    #[must_use]
    pub fn ai_timeout_ms(&self) -> u64 {
        u64::try_from(self.ai_timeout.as_millis()).unwrap_or(DEFAULT_AI_TIMEOUT_MS)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_PORT,
            dashscope_api_key: None,
            gemini_api_key: None,
            ai_timeout: Duration::from_millis(DEFAULT_AI_TIMEOUT_MS),
            monitor_max: crate::telemetry::DEFAULT_CAPACITY,
            data_dir: PathBuf::from("data"),
            static_dir: PathBuf::from("frontend"),
        }
    }
}

/// Read a credential, filtering empty strings and the known placeholder
fn credential_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty() && v != DASHSCOPE_PLACEHOLDER)
}

/// Parse a numeric env var, falling back to the default on absence or garbage
fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring unparsable {name}={raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}
