// ABOUTME: Shared domain records for pets, community members, notes, and owner profiles
// ABOUTME: Wire shapes use camelCase to match the PawTrace frontend contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Common data models.
//!
//! Profile and pet-summary payloads arrive from the frontend as loosely
//! structured objects. They are modeled with named optional fields plus a
//! flattened `extra` bag: known fields get compile-time shape checking,
//! unknown fields are captured and ignored by the prompt builders.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Persisted CRUD Records
// ============================================================================

/// A pet on the campus roster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Record identifier
    pub id: String,
    /// Pet name
    pub name: String,
    /// Species label ("Dog", "Cat", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Breed label
    pub breed: String,
    /// Free-text age ("2 years")
    pub age: String,
    /// Free-text gender
    pub gender: String,
    /// Sprite path served from the assets directory
    pub avatar: String,
    /// Personality traits
    pub traits: Vec<String>,
    /// Health notes
    pub health: String,
    /// Current status line
    pub status: String,
}

/// A community member profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityUser {
    /// Record identifier
    pub id: String,
    /// Login-style handle
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Avatar path, may be empty
    pub avatar: String,
    /// Short bio
    pub bio: String,
    /// Campus label
    pub campus: String,
    /// Preferred contact channel
    pub contact: String,
}

/// A sticky note on the community board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    /// Record identifier
    pub id: String,
    /// Note text, trimmed and non-empty
    pub text: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

// ============================================================================
// Loosely-Typed Caller Payloads
// ============================================================================

/// Owner profile as submitted by the frontend.
///
/// Every field is optional; the prompt builders substitute documented
/// defaults for absent values and never leak `null` into rendered text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfile {
    /// Owner display name
    pub display_name: Option<String>,
    /// Owner handle, used to attribute pet captures
    pub username: Option<String>,
    /// Western star sign, drives the prediction feature
    pub star_sign: Option<String>,
    /// Headline pet name (prediction feature)
    pub pet_name: Option<String>,
    /// Headline pet species (prediction feature)
    pub pet_type: Option<String>,
    /// Headline pet birthday (prediction feature)
    pub pet_birthday: Option<String>,
    /// Free-text notes about the headline pet (prediction feature)
    pub pet_notes: Option<String>,
    /// Main pet name (advice feature)
    pub main_pet_name: Option<String>,
    /// Main pet species (advice feature)
    pub main_pet_type: Option<String>,
    /// Free-text notes about the main pet (advice feature)
    pub main_pet_notes: Option<String>,
    /// Unknown fields, captured but never rendered
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Minimal pet summary attached to advice requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSummary {
    /// Pet name
    pub name: Option<String>,
    /// Species label
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Breed label
    pub breed: Option<String>,
    /// Unknown fields, captured but never rendered
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

// ============================================================================
// Service Kind
// ============================================================================

/// Advice service selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// General health checklist and preventive care
    Health,
    /// Behavior analysis and training drills
    Behavior,
    /// Nutrition and hydration guidance
    Diet,
}

impl ServiceKind {
    /// Parse a caller-supplied service string. Anything outside the three
    /// known kinds is a request validation error at the route layer.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "health" => Some(Self::Health),
            "behavior" => Some(Self::Behavior),
            "diet" => Some(Self::Diet),
            _ => None,
        }
    }

    /// Stable string form used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Behavior => "behavior",
            Self::Diet => "diet",
        }
    }
}
