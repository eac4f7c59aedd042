// ABOUTME: Shared test helpers: mock AI providers and server resource builders
// ABOUTME: Mock providers count invocations so tests can assert fallback ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

// Test files: allow missing_docs (rustc lint) and unwrap (valid in tests)
#![allow(missing_docs, clippy::unwrap_used, dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use pawtrace_server::config::ServerConfig;
use pawtrace_server::errors::{AppError, AppResult};
use pawtrace_server::llm::{
    AiOrchestrator, ChatMessage, CompletionProvider, VisionProvider,
};
use pawtrace_server::server::ServerResources;
use pawtrace_server::store::DocumentStore;
use pawtrace_server::telemetry::TelemetryCapture;

/// Scripted behavior for a mock provider call
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return the given reply
    Reply(String),
    /// Return a structurally-valid-but-empty response
    Empty,
    /// Fail with a provider error carrying this detail
    Fail(String),
    /// Fail fast as if the credential were missing
    Misconfigured(String),
    /// Never resolve; only the timeout budget ends the call
    Hang,
}

/// Counting mock for the text completion contract
pub struct MockCompletion {
    name: &'static str,
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockCompletion {
    pub fn new(name: &'static str, behavior: MockBehavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn replying(reply: &str) -> Arc<Self> {
        Self::new("MockText", MockBehavior::Reply(reply.to_owned()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    fn name(&self) -> &'static str {
        self.name
    }

    fn ensure_configured(&self) -> AppResult<()> {
        match &self.behavior {
            MockBehavior::Misconfigured(msg) => Err(AppError::misconfigured(msg.clone())),
            _ => Ok(()),
        }
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> AppResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Reply(reply) => Ok(Some(reply.clone())),
            MockBehavior::Empty => Ok(None),
            MockBehavior::Fail(detail) => Err(AppError::provider(self.name, detail.clone())),
            MockBehavior::Misconfigured(msg) => Err(AppError::misconfigured(msg.clone())),
            MockBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Counting mock for the vision contract
pub struct MockVision {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockVision {
    pub fn new(behavior: MockBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVision {
    fn name(&self) -> &'static str {
        "MockVision"
    }

    async fn diagnose(
        &self,
        _image_base64: &str,
        _mime_type: &str,
        _prompt: &str,
    ) -> AppResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Reply(reply) => Ok(Some(reply.clone())),
            MockBehavior::Empty => Ok(None),
            MockBehavior::Fail(detail) => Err(AppError::provider("MockVision", detail.clone())),
            MockBehavior::Misconfigured(msg) => Err(AppError::misconfigured(msg.clone())),
            MockBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Default per-call budget for orchestrator tests
pub const TEST_BUDGET: Duration = Duration::from_millis(500);

/// Build an orchestrator over mock providers with a seeded RNG
pub fn mock_orchestrator(
    qwen: Arc<MockCompletion>,
    vision: Arc<MockVision>,
    gemini: Arc<MockCompletion>,
) -> AiOrchestrator {
    AiOrchestrator::new(qwen, vision, gemini, TEST_BUDGET, StdRng::seed_from_u64(42))
}

/// Build full server resources over a temp-dir store and mock providers.
///
/// The returned `TempDir` guard must stay alive for the store's lifetime.
pub async fn mock_resources(
    qwen: Arc<MockCompletion>,
    vision: Arc<MockVision>,
    gemini: Arc<MockCompletion>,
) -> (Arc<ServerResources>, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig {
        data_dir: dir.path().to_path_buf(),
        static_dir: dir.path().join("frontend"),
        ..ServerConfig::default()
    };
    let store = DocumentStore::open(&config.data_dir, config.monitor_max)
        .await
        .unwrap();
    let orchestrator = mock_orchestrator(qwen, vision, gemini);
    let telemetry = TelemetryCapture::new(store.clone(), StdRng::seed_from_u64(7));
    let resources = Arc::new(ServerResources::new(
        config,
        store,
        orchestrator,
        telemetry,
        StdRng::seed_from_u64(11),
    ));
    (resources, dir)
}
