// ABOUTME: Flat-file JSON document store backing all persistent PawTrace state
// ABOUTME: Read-modify-write-then-flush semantics with seeding on first boot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! # Document Store
//!
//! All persistent state lives in one JSON document rewritten whole on every
//! mutation ("last successful write wins" — there is no finer durability
//! guarantee). The store is injected into every component that needs it; no
//! module-level shared state exists. Each mutation applies its closure and
//! flushes under the write lock, so individual read-modify-write cycles are
//! atomic, while ordering across concurrent writers remains last-flush-wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::llm::ChatMessage;
use crate::models::{CommunityUser, Pet, StickyNote};
use crate::telemetry::MonitoringData;

/// File name of the document inside the data directory
const DB_FILE: &str = "pawtrace-db.json";

// ============================================================================
// Document Shape
// ============================================================================

/// Roster bookkeeping kept for document-shape compatibility
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Next sequential pet id hint
    pub next_pet_id: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self { next_pet_id: 1 }
    }
}

/// The whole persisted document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppDocument {
    /// Pet roster
    pub pets: Vec<Pet>,
    /// Community member roster
    pub users: Vec<CommunityUser>,
    /// Per-contact chat history, append-only and unbounded
    pub chat_history: HashMap<String, Vec<ChatMessage>>,
    /// Community sticky notes
    pub sticky_notes: Vec<StickyNote>,
    /// Bounded telemetry categories
    pub monitoring: MonitoringData,
    /// Roster bookkeeping
    pub settings: Settings,
}

// ============================================================================
// Store
// ============================================================================

/// JSON-file-backed document store
pub struct DocumentStore {
    path: PathBuf,
    doc: RwLock<AppDocument>,
}

impl DocumentStore {
    /// Open (or seed) the document under `data_dir` and apply the configured
    /// telemetry retention ceiling.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created, the existing
    /// document cannot be parsed, or the initial flush fails.
    pub async fn open(data_dir: &Path, monitor_max: usize) -> AppResult<Arc<Self>> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| AppError::store(format!("failed to create {}: {e}", data_dir.display())))?;
        let path = data_dir.join(DB_FILE);

        let mut doc = if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::store(format!("failed to probe {}: {e}", path.display())))?
        {
            let raw = tokio::fs::read(&path)
                .await
                .map_err(|e| AppError::store(format!("failed to read {}: {e}", path.display())))?;
            serde_json::from_slice(&raw)
                .map_err(|e| AppError::store(format!("failed to parse {}: {e}", path.display())))?
        } else {
            info!(path = %path.display(), "seeding new document store");
            seed_document()
        };
        doc.monitoring.set_capacity(monitor_max);

        let store = Arc::new(Self {
            path,
            doc: RwLock::new(doc),
        });
        store.flush(&*store.doc.read().await).await?;
        Ok(store)
    }

    /// Run a read-only closure against the document
    pub async fn read<R>(&self, f: impl FnOnce(&AppDocument) -> R) -> R {
        f(&*self.doc.read().await)
    }

    /// Apply a mutation and flush the whole document before returning.
    ///
    /// The write lock is held across apply and flush, so the mutation is
    /// durable before the caller can produce a response.
    ///
    /// # Errors
    ///
    /// Returns an error when the flush fails; the in-memory mutation still
    /// applies (matching last-write-wins semantics).
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut AppDocument) -> R) -> AppResult<R> {
        let mut doc = self.doc.write().await;
        let result = f(&mut doc);
        self.flush(&doc).await?;
        Ok(result)
    }

    async fn flush(&self, doc: &AppDocument) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| AppError::store(format!("failed to serialize document: {e}")))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| AppError::store(format!("failed to write {}: {e}", self.path.display())))
    }

    // ========================================================================
    // Chat History
    // ========================================================================

    /// Append messages to a contact's history and persist before returning
    ///
    /// # Errors
    ///
    /// Returns an error when the flush fails.
    pub async fn append_history(
        &self,
        contact_id: &str,
        messages: Vec<ChatMessage>,
    ) -> AppResult<()> {
        let contact_id = contact_id.to_owned();
        self.mutate(move |doc| {
            doc.chat_history
                .entry(contact_id)
                .or_default()
                .extend(messages);
        })
        .await
    }

    /// Ordered history for a contact; empty when the contact is unknown
    pub async fn history(&self, contact_id: &str) -> Vec<ChatMessage> {
        self.read(|doc| doc.chat_history.get(contact_id).cloned().unwrap_or_default())
            .await
    }
}

// ============================================================================
// Seed Data
// ============================================================================

/// Build the first-boot document with the demo roster
fn seed_document() -> AppDocument {
    AppDocument {
        pets: seed_pets(),
        users: seed_users(),
        chat_history: HashMap::new(),
        sticky_notes: Vec::new(),
        monitoring: MonitoringData::default(),
        settings: Settings { next_pet_id: 6 },
    }
}

fn seed_pets() -> Vec<Pet> {
    vec![
        Pet {
            id: "p1".to_owned(),
            name: "Mocha".to_owned(),
            kind: "Dog".to_owned(),
            breed: "Corgi".to_owned(),
            age: "2 years".to_owned(),
            gender: "Male".to_owned(),
            avatar: "/assets/1.png".to_owned(),
            traits: vec![
                "Friendly".to_owned(),
                "Food-motivated".to_owned(),
                "Short legs, fast heart".to_owned(),
            ],
            health: "Vaccinations up to date. Last vet check 2 months ago.".to_owned(),
            status: "Always ready for a fetch session.".to_owned(),
        },
        Pet {
            id: "p2".to_owned(),
            name: "Pixel".to_owned(),
            kind: "Dog".to_owned(),
            breed: "Border Collie".to_owned(),
            age: "3 years".to_owned(),
            gender: "Female".to_owned(),
            avatar: "/assets/2.png".to_owned(),
            traits: vec![
                "Smart".to_owned(),
                "High energy".to_owned(),
                "Ball addict".to_owned(),
            ],
            health: "Needs daily long walks. Joint check scheduled next month.".to_owned(),
            status: "Learning trick combos every week.".to_owned(),
        },
        Pet {
            id: "p3".to_owned(),
            name: "Mochi".to_owned(),
            kind: "Cat".to_owned(),
            breed: "Ragdoll".to_owned(),
            age: "1 year".to_owned(),
            gender: "Female".to_owned(),
            avatar: "/assets/3.png".to_owned(),
            traits: vec![
                "Quiet".to_owned(),
                "Cuddly".to_owned(),
                "Window watcher".to_owned(),
            ],
            health: "Indoor only, spayed, no known issues.".to_owned(),
            status: "Prefers sunlit shelves and calm corners.".to_owned(),
        },
        Pet {
            id: "p4".to_owned(),
            name: "Kiko".to_owned(),
            kind: "Dog".to_owned(),
            breed: "Husky".to_owned(),
            age: "4 years".to_owned(),
            gender: "Female".to_owned(),
            avatar: "/assets/4.png".to_owned(),
            traits: vec!["Pack leader".to_owned(), "Snow lover".to_owned()],
            health: "Energetic and strong, needs long runs.".to_owned(),
            status: "Dreaming about weekend meetups.".to_owned(),
        },
        Pet {
            id: "p5".to_owned(),
            name: "Luna".to_owned(),
            kind: "Cat".to_owned(),
            breed: "Siamese".to_owned(),
            age: "2 years".to_owned(),
            gender: "Female".to_owned(),
            avatar: "/assets/5.png".to_owned(),
            traits: vec![
                "Playful".to_owned(),
                "Curious".to_owned(),
                "Talkative".to_owned(),
            ],
            health: "Indoor only, loves puzzles.".to_owned(),
            status: "Chasing laser dots when not napping.".to_owned(),
        },
    ]
}

fn seed_users() -> Vec<CommunityUser> {
    vec![
        CommunityUser {
            id: "u1".to_owned(),
            username: "demo".to_owned(),
            display_name: "Pet Lover".to_owned(),
            avatar: String::new(),
            bio: "Welcome to PawTrace!".to_owned(),
            campus: "Taicang".to_owned(),
            contact: "WeChat".to_owned(),
        },
        CommunityUser {
            id: "u2".to_owned(),
            username: "mila".to_owned(),
            display_name: "Mila".to_owned(),
            avatar: String::new(),
            bio: "Cat person, art lover".to_owned(),
            campus: "Shanghai".to_owned(),
            contact: "Email".to_owned(),
        },
        CommunityUser {
            id: "u3".to_owned(),
            username: "rocky".to_owned(),
            display_name: "Rocky".to_owned(),
            avatar: String::new(),
            bio: "Dog walker & plant dad".to_owned(),
            campus: "Beijing".to_owned(),
            contact: "Phone".to_owned(),
        },
        CommunityUser {
            id: "u4".to_owned(),
            username: "lily".to_owned(),
            display_name: "Lily".to_owned(),
            avatar: String::new(),
            bio: "Event planner for pet meetups".to_owned(),
            campus: "Taicang".to_owned(),
            contact: "WeChat".to_owned(),
        },
    ]
}
