// ABOUTME: Main library entry point for the PawTrace campus pet-social backend
// ABOUTME: Exposes the AI orchestration core, telemetry capture, and the HTTP surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

#![deny(unsafe_code)]

//! # PawTrace Server
//!
//! Backend for a campus pet-social web app: CRUD over pets, community users,
//! and sticky notes backed by a flat JSON document, plus chat and advice
//! features that proxy to hosted AI providers with ordered fallback and
//! bounded telemetry capture.
//!
//! ## Architecture
//!
//! - **llm**: provider clients (DashScope, Gemini), prompt builders, and the
//!   fallback orchestrator
//! - **store**: the injected JSON-document persistence collaborator
//! - **telemetry**: bounded-retention capture of profiles, purchases, and
//!   chat logs
//! - **metrics**: per-route latency and status accumulators
//! - **routes**: the HTTP surface, one module per domain
//! - **server**: resource wiring, router assembly, and the serve loop
//!
//! A missing AI credential is an expected runtime state: the server starts,
//! chat and advice report the configuration error, and the prediction
//! feature degrades to its local heuristic.

/// Environment-driven server configuration
pub mod config;

/// Unified error handling with HTTP response mapping
pub mod errors;

/// LLM provider clients, prompt builders, and fallback orchestration
pub mod llm;

/// Per-route request metrics
pub mod metrics;

/// Shared domain records
pub mod models;

/// HTTP routes, one module per domain
pub mod routes;

/// Resource wiring, router assembly, and the serve loop
pub mod server;

/// Flat-file JSON document store
pub mod store;

/// Bounded-retention telemetry capture
pub mod telemetry;
