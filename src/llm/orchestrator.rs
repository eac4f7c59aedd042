// ABOUTME: Fallback orchestration across AI providers for chat, advice, diagnosis, and prediction
// ABOUTME: Applies the shared timeout budget and decides when to fall back to local heuristics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! # AI Orchestrator
//!
//! Sequences provider attempts per feature and owns the fallback policy:
//!
//! - **Chat**: single Qwen attempt, no fallback; a missing credential is a
//!   terminal configuration error.
//! - **Advice**: single attempt against the chosen provider; failures are
//!   terminal (advice requires live generation).
//! - **Diagnosis**: vision first, then a text-only retry from symptom text;
//!   exhaustion surfaces a `ServiceUnavailable` naming the credential.
//! - **Prediction**: short-circuits without profile signal, otherwise
//!   precomputes the local heuristic and prefers the remote result.
//!
//! Chains run strictly sequentially, stopping at the first non-empty result.
//! Every provider call races against the shared timeout budget; the losing
//! future is dropped, so no dangling work outlives the budget.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

use super::prompts;
use super::{ChatMessage, CompletionProvider, DashScopeProvider, GeminiProvider, VisionProvider};
use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{OwnerProfile, PetSummary, ServiceKind};

/// Reply used when the chat provider answers with an empty envelope
const DEFAULT_CHAT_REPLY: &str =
    "I could not generate a proper reply, but your backend is reachable.";

/// Reply used when an advice provider answers with an empty envelope
const DEFAULT_ADVICE_REPLY: &str = "Unable to generate advice. Please try again.";

/// Reply used when the diagnosis text fallback answers with an empty envelope
const DEFAULT_DIAGNOSIS_REPLY: &str = "AI could not analyze the image; please try again.";

/// Prediction short-circuit response when the profile carries no signal
const PREDICTION_MORE_INFO: &str =
    "Share your star sign or main pet info to unlock predictions.";

/// Terminal diagnosis message naming the missing capability
const DIAGNOSIS_UNAVAILABLE: &str = "AI service unavailable. Configure DASHSCOPE_API_KEY.";

// ============================================================================
// Prediction Result
// ============================================================================

/// Origin of a prediction text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    /// Generated by the remote provider (not tagged on the wire)
    Remote,
    /// Produced by the local deterministic heuristic
    Local,
}

/// Prediction text plus its origin, so callers can distinguish AI-generated
/// answers from the heuristic fallback
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Prediction text, never empty
    pub text: String,
    /// Where the text came from
    pub source: PredictionSource,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Sequences provider calls per feature under a shared timeout budget
pub struct AiOrchestrator {
    qwen: Arc<dyn CompletionProvider>,
    qwen_vision: Arc<dyn VisionProvider>,
    gemini: Arc<dyn CompletionProvider>,
    budget: Duration,
    rng: Mutex<StdRng>,
}

impl AiOrchestrator {
    /// Wire the orchestrator with explicit providers and RNG.
    ///
    /// Integration tests inject mock providers and a seeded RNG here.
    #[must_use]
    pub fn new(
        qwen: Arc<dyn CompletionProvider>,
        qwen_vision: Arc<dyn VisionProvider>,
        gemini: Arc<dyn CompletionProvider>,
        budget: Duration,
        rng: StdRng,
    ) -> Self {
        Self {
            qwen,
            qwen_vision,
            gemini,
            budget,
            rng: Mutex::new(rng),
        }
    }

    /// Build the production orchestrator from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created.
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let dashscope = Arc::new(DashScopeProvider::new(config.dashscope_api_key.clone())?);
        let gemini = Arc::new(GeminiProvider::new(config.gemini_api_key.clone())?);
        Ok(Self::new(
            dashscope.clone(),
            dashscope,
            gemini,
            config.ai_timeout,
            StdRng::from_entropy(),
        ))
    }

    /// Fail fast when the chat credential is absent, before any processing
    pub fn ensure_chat_ready(&self) -> AppResult<()> {
        self.qwen.ensure_configured()
    }

    /// Fail fast when the Gemini credential is absent
    pub fn ensure_gemini_ready(&self) -> AppResult<()> {
        self.gemini.ensure_configured()
    }

    /// Race a provider call against the timeout budget.
    ///
    /// The loser is dropped: an expired budget aborts the in-flight call, a
    /// settled call cancels the timer.
    async fn with_budget<F>(&self, provider: &'static str, call: F) -> AppResult<Option<String>>
    where
        F: Future<Output = AppResult<Option<String>>> + Send,
    {
        let budget_ms = u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX);
        match tokio::time::timeout(self.budget, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(provider, budget_ms)),
        }
    }

    // ========================================================================
    // Conversational Chat
    // ========================================================================

    /// Generate a persona reply for a contact.
    ///
    /// `messages` must already be normalized (trimmed, empties dropped). No
    /// fallback: provider failures are terminal for this feature.
    ///
    /// # Errors
    ///
    /// Returns the provider error unchanged (missing credential, timeout, or
    /// upstream failure).
    pub async fn chat(
        &self,
        contact_id: &str,
        messages: &[ChatMessage],
        contact_profile: Option<&str>,
    ) -> AppResult<String> {
        let mut payload = Vec::with_capacity(messages.len() + 1);
        payload.push(ChatMessage::system(prompts::contact_system_prompt(
            contact_id,
            contact_profile,
        )));
        payload.extend_from_slice(messages);

        let reply = self
            .with_budget(self.qwen.name(), self.qwen.complete(&payload))
            .await?;
        Ok(reply.unwrap_or_else(|| DEFAULT_CHAT_REPLY.to_owned()))
    }

    // ========================================================================
    // Advice
    // ========================================================================

    /// Generate advice through Qwen (system + user message pair)
    ///
    /// # Errors
    ///
    /// Returns the provider error unchanged; advice has no local fallback.
    pub async fn qwen_advice(
        &self,
        service: ServiceKind,
        context: &str,
        profile: &OwnerProfile,
        pets: &[PetSummary],
    ) -> AppResult<String> {
        let messages = prompts::advice_messages(service, context, profile, pets);
        let result = self
            .with_budget(self.qwen.name(), self.qwen.complete(&messages))
            .await?;
        Ok(result.unwrap_or_else(|| DEFAULT_ADVICE_REPLY.to_owned()))
    }

    /// Generate advice through Gemini (single rendered prompt)
    ///
    /// # Errors
    ///
    /// Returns the provider error unchanged; advice has no local fallback.
    pub async fn gemini_advice(
        &self,
        service: ServiceKind,
        context: &str,
        profile: &OwnerProfile,
        pets: &[PetSummary],
    ) -> AppResult<String> {
        let messages = vec![ChatMessage::user(prompts::advice_prompt(
            service, context, profile, pets,
        ))];
        let result = self
            .with_budget(self.gemini.name(), self.gemini.complete(&messages))
            .await?;
        Ok(result.unwrap_or_else(|| DEFAULT_ADVICE_REPLY.to_owned()))
    }

    // ========================================================================
    // Image Diagnosis
    // ========================================================================

    /// Diagnose a pet image: vision provider first, then a text-only retry
    /// built from the symptom text alone.
    ///
    /// # Errors
    ///
    /// Returns `ServiceUnavailable` naming the missing credential once both
    /// legs of the chain are exhausted.
    pub async fn diagnose(
        &self,
        image_base64: &str,
        mime_type: &str,
        symptoms: Option<&str>,
    ) -> AppResult<String> {
        let prompt = prompts::diagnosis_prompt(symptoms);

        match self
            .with_budget(
                self.qwen_vision.name(),
                self.qwen_vision.diagnose(image_base64, mime_type, &prompt),
            )
            .await
        {
            Ok(Some(result)) => return Ok(result),
            Ok(None) => warn!("vision diagnosis returned no content, trying text fallback"),
            Err(e) => warn!(error = %e, "vision diagnosis failed, trying text fallback"),
        }

        let symptom_line = format!(
            "Symptoms: {}. Image attached but processed as text.",
            symptoms.filter(|s| !s.is_empty()).unwrap_or("not provided")
        );
        let messages = prompts::advice_messages(
            ServiceKind::Health,
            &symptom_line,
            &OwnerProfile::default(),
            &[],
        );
        match self
            .with_budget(self.qwen.name(), self.qwen.complete(&messages))
            .await
        {
            Ok(Some(result)) => Ok(result),
            Ok(None) => Ok(DEFAULT_DIAGNOSIS_REPLY.to_owned()),
            Err(e) => {
                let detail = e.detail().map_or_else(|| e.to_string(), ToOwned::to_owned);
                Err(AppError::service_unavailable(
                    DIAGNOSIS_UNAVAILABLE,
                    Some(detail),
                ))
            }
        }
    }

    // ========================================================================
    // Prediction
    // ========================================================================

    /// Weekly behavior prediction.
    ///
    /// Without star-sign or pet-name signal this short-circuits with a
    /// prompt-for-more-info message and never touches the network. Otherwise
    /// the local heuristic is computed eagerly and any remote failure
    /// (missing credential included) returns it tagged `Local`.
    pub async fn predict(&self, profile: &OwnerProfile) -> Prediction {
        let has_signal = profile
            .star_sign
            .as_deref()
            .is_some_and(|s| !s.is_empty())
            || profile.pet_name.as_deref().is_some_and(|s| !s.is_empty());
        if !has_signal {
            return Prediction {
                text: PREDICTION_MORE_INFO.to_owned(),
                source: PredictionSource::Remote,
            };
        }

        let fallback = {
            // Lock scope kept tight; the RNG is never held across an await.
            let mut rng = self.rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            prompts::local_prediction(profile, &mut *rng)
        };

        let messages = prompts::prediction_messages(profile);
        match self
            .with_budget(self.qwen.name(), self.qwen.complete(&messages))
            .await
        {
            Ok(Some(text)) => {
                info!("prediction served from remote provider");
                Prediction {
                    text,
                    source: PredictionSource::Remote,
                }
            }
            Ok(None) => Prediction {
                text: fallback,
                source: PredictionSource::Local,
            },
            Err(e) => {
                warn!(error = %e, "prediction provider failed, serving local fallback");
                Prediction {
                    text: fallback,
                    source: PredictionSource::Local,
                }
            }
        }
    }
}
