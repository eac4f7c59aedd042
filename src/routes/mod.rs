// ABOUTME: Route module organization for PawTrace HTTP endpoints
// ABOUTME: One module per domain, each exposing an XxxRoutes struct with a routes() constructor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Route modules for the PawTrace server.
//!
//! Each domain module contains route definitions and thin handler functions
//! that delegate to the orchestration layer, the document store, and the
//! telemetry/metrics collectors.

/// Conversational chat and chat history routes
pub mod chat;

/// AI advice, diagnosis, and prediction routes
pub mod ai;

/// Telemetry collection and operational snapshots
pub mod monitor;

/// Pet roster CRUD routes
pub mod pets;

/// Sticky note routes
pub mod notes;

/// Community roster, readiness, and map routes
pub mod site;

pub use ai::AiRoutes;
pub use chat::ChatRoutes;
pub use monitor::MonitorRoutes;
pub use notes::NoteRoutes;
pub use pets::PetRoutes;
pub use site::SiteRoutes;
