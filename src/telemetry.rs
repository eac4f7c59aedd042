// ABOUTME: Bounded-retention telemetry capture for profiles, purchases, and chat logs
// ABOUTME: Enforces a per-category retention ceiling with FIFO eviction of the oldest records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! # Telemetry Capture
//!
//! Write-mostly recorder for user-submitted profile, pet, purchase, and chat
//! data. Every capture generates a best-effort unique identifier
//! (`<prefix>-<unix-millis>-<random-suffix>`) and a timestamp, then appends
//! into the category's [`BoundedList`]; records are never mutated after
//! creation. The bounded lists are the only growth bound in the process —
//! chat history itself is intentionally left unbounded (see DESIGN.md).
//!
//! Capture failures in side-channel positions must never abort the primary
//! response; callers log and continue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppResult;
use crate::llm::ChatMessage;
use crate::models::{CommunityUser, Pet};
use crate::store::DocumentStore;

/// Default maximum retained records per category (`MONITOR_MAX` overrides)
pub const DEFAULT_CAPACITY: usize = 500;

// ============================================================================
// Bounded List
// ============================================================================

/// A sequence with a retention ceiling.
///
/// Insertion beyond capacity evicts the oldest elements first, preserving the
/// relative order of survivors. The list serializes as its plain item
/// sequence; deserialization restores the default ceiling and the store
/// re-applies the configured one after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<T>", into = "Vec<T>")]
pub struct BoundedList<T: Clone> {
    max: usize,
    items: Vec<T>,
}

impl<T: Clone> BoundedList<T> {
    /// Create an empty list with the given retention ceiling (minimum 1)
    #[must_use]
    pub fn with_capacity(max: usize) -> Self {
        Self {
            max: max.max(1),
            items: Vec::new(),
        }
    }

    /// Append an element, evicting the oldest beyond capacity
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.trim();
    }

    /// Change the retention ceiling and trim to it
    pub fn set_capacity(&mut self, max: usize) {
        self.max = max.max(1);
        self.trim();
    }

    fn trim(&mut self) {
        if self.items.len() > self.max {
            let overflow = self.items.len() - self.max;
            self.items.drain(..overflow);
        }
    }

    /// Number of retained elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list holds no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Retained elements, oldest first
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> Default for BoundedList<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<T: Clone> From<Vec<T>> for BoundedList<T> {
    fn from(items: Vec<T>) -> Self {
        let mut list = Self {
            max: DEFAULT_CAPACITY,
            items,
        };
        list.trim();
        list
    }
}

impl<T: Clone> From<BoundedList<T>> for Vec<T> {
    fn from(list: BoundedList<T>) -> Self {
        list.items
    }
}

// ============================================================================
// Capture Records
// ============================================================================

/// Captured user profile submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileCapture {
    /// Generated capture identifier
    pub id: String,
    /// RFC 3339 capture timestamp
    pub captured_at: String,
    /// Raw submitted profile object
    pub profile: Value,
    /// Optional personal-info object, kept only when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<Value>,
    /// Caller-supplied metadata bag
    pub metadata: Value,
}

/// Captured pet profile submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetProfileCapture {
    /// Generated capture identifier
    pub id: String,
    /// RFC 3339 capture timestamp
    pub captured_at: String,
    /// Username the pet was attributed to
    pub owner: String,
    /// Raw submitted pet object
    pub pet: Value,
    /// Caller-supplied metadata bag
    pub metadata: Value,
}

/// Captured purchase event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCapture {
    /// Caller-supplied id when present, otherwise generated
    pub id: String,
    /// RFC 3339 capture timestamp
    pub captured_at: String,
    /// Raw purchase object
    pub purchase: Value,
    /// Caller-supplied metadata bag
    pub metadata: Value,
}

/// Captured chat exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLogCapture {
    /// Generated capture identifier
    pub id: String,
    /// RFC 3339 capture timestamp
    pub captured_at: String,
    /// Contact the exchange belongs to
    pub contact_id: String,
    /// Normalized user-side messages of the exchange
    pub messages: Vec<ChatMessage>,
    /// Assistant reply
    pub reply: String,
}

/// The monitoring section of the persisted document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringData {
    /// Captured user profiles
    pub user_profiles: BoundedList<UserProfileCapture>,
    /// Captured pet profiles
    pub pet_profiles: BoundedList<PetProfileCapture>,
    /// Captured purchase events
    pub purchases: BoundedList<PurchaseCapture>,
    /// Captured chat exchanges
    pub chat_logs: BoundedList<ChatLogCapture>,
}

impl MonitoringData {
    /// Apply the configured retention ceiling to every category
    pub fn set_capacity(&mut self, max: usize) {
        self.user_profiles.set_capacity(max);
        self.pet_profiles.set_capacity(max);
        self.purchases.set_capacity(max);
        self.chat_logs.set_capacity(max);
    }
}

// ============================================================================
// Collect Payload and Acknowledgments
// ============================================================================

/// Inbound body of `POST /api/monitor/collect`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectPayload {
    /// Submitted user profile, captured only when it is an object
    pub user_profile: Option<Value>,
    /// Submitted pet objects; non-objects are dropped
    pub pets: Vec<Value>,
    /// Submitted purchase objects; non-objects are dropped
    pub shopping: Vec<Value>,
    /// Metadata bag attached to every record of this submission
    pub metadata: Option<Value>,
    /// Optional personal-info object attached to the profile capture
    pub personal_info: Option<Value>,
}

/// Newly captured record counts per category
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedCounts {
    /// User profiles captured by this submission
    pub user_profiles: usize,
    /// Pet profiles captured by this submission
    pub pet_profiles: usize,
    /// Purchases captured by this submission
    pub purchases: usize,
}

/// Retained totals per category after a submission
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    /// Retained user profile captures
    pub user_profiles: usize,
    /// Retained pet profile captures
    pub pet_profiles: usize,
    /// Retained purchase captures
    pub purchases: usize,
    /// Retained chat log captures
    pub chat_logs: usize,
}

/// Acknowledgment returned to the collector caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReceipt {
    /// Always true when the submission was persisted
    pub success: bool,
    /// Newly captured counts
    pub captured: CapturedCounts,
    /// Retained totals after capture
    pub totals: CategoryTotals,
}

/// Summary block of the overview snapshot
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSummary {
    /// Retained user profile captures
    pub user_profiles: usize,
    /// Retained pet profile captures
    pub pet_profiles: usize,
    /// Retained purchase captures
    pub purchases: usize,
    /// Retained chat log captures
    pub chat_logs: usize,
    /// Distinct contacts with stored chat history
    pub contacts_tracked: usize,
}

/// Full read-side snapshot of the monitoring state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSnapshot {
    /// Snapshot timestamp
    pub captured_at: String,
    /// Cross-referenced counts
    pub summary: OverviewSummary,
    /// Entire retained monitoring set
    pub monitoring: MonitoringData,
    /// Full chat history by contact
    pub chat_history: HashMap<String, Vec<ChatMessage>>,
    /// Community member roster
    pub users: Vec<CommunityUser>,
    /// Pet roster
    pub pets: Vec<Pet>,
}

// ============================================================================
// Telemetry Capture
// ============================================================================

/// Bounded-retention recorder over the shared document store
pub struct TelemetryCapture {
    store: Arc<DocumentStore>,
    rng: Mutex<StdRng>,
}

impl TelemetryCapture {
    /// Create a recorder with an injected RNG for identifier suffixes
    #[must_use]
    pub fn new(store: Arc<DocumentStore>, rng: StdRng) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    /// Generate a capture identifier: timestamp plus random suffix.
    /// Collision-tolerant, not cryptographically unique.
    fn capture_id(&self, prefix: &str, suffix_bound: u32) -> String {
        let millis = Utc::now().timestamp_millis();
        let suffix = {
            let mut rng = self
                .rng
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            rng.gen_range(0..suffix_bound)
        };
        format!("{prefix}-{millis}-{suffix}")
    }

    /// Capture a collector submission and persist it.
    ///
    /// Non-object entries are dropped before capture. Returns per-category
    /// counts for caller acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns an error when the document flush fails.
    pub async fn capture(&self, payload: CollectPayload) -> AppResult<CaptureReceipt> {
        let captured_at = Utc::now().to_rfc3339();
        let metadata = payload
            .metadata
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));
        let personal_info = payload.personal_info.filter(Value::is_object);

        let owner = payload
            .user_profile
            .as_ref()
            .and_then(|p| p.get("username"))
            .or_else(|| personal_info.as_ref().and_then(|p| p.get("username")))
            .or_else(|| metadata.get("username"))
            .and_then(Value::as_str)
            .unwrap_or("anonymous")
            .to_owned();

        let user_profile = payload.user_profile.filter(Value::is_object);
        let pets: Vec<Value> = payload.pets.into_iter().filter(Value::is_object).collect();
        let purchases: Vec<Value> = payload
            .shopping
            .into_iter()
            .filter(Value::is_object)
            .collect();

        let mut counts = CapturedCounts::default();

        let profile_record = user_profile.map(|profile| {
            counts.user_profiles = 1;
            UserProfileCapture {
                id: self.capture_id("profile", 1000),
                captured_at: captured_at.clone(),
                profile,
                personal_info,
                metadata: metadata.clone(),
            }
        });

        let pet_records: Vec<PetProfileCapture> = pets
            .into_iter()
            .map(|pet| PetProfileCapture {
                id: self.capture_id("pet", 1000),
                captured_at: captured_at.clone(),
                owner: owner.clone(),
                pet,
                metadata: metadata.clone(),
            })
            .collect();
        counts.pet_profiles = pet_records.len();

        let purchase_records: Vec<PurchaseCapture> = purchases
            .into_iter()
            .map(|purchase| PurchaseCapture {
                id: purchase
                    .get("id")
                    .and_then(Value::as_str)
                    .map_or_else(|| self.capture_id("purchase", 1000), ToOwned::to_owned),
                captured_at: captured_at.clone(),
                purchase,
                metadata: metadata.clone(),
            })
            .collect();
        counts.purchases = purchase_records.len();

        let totals = self
            .store
            .mutate(move |doc| {
                if let Some(record) = profile_record {
                    doc.monitoring.user_profiles.push(record);
                }
                for record in pet_records {
                    doc.monitoring.pet_profiles.push(record);
                }
                for record in purchase_records {
                    doc.monitoring.purchases.push(record);
                }
                CategoryTotals {
                    user_profiles: doc.monitoring.user_profiles.len(),
                    pet_profiles: doc.monitoring.pet_profiles.len(),
                    purchases: doc.monitoring.purchases.len(),
                    chat_logs: doc.monitoring.chat_logs.len(),
                }
            })
            .await?;

        Ok(CaptureReceipt {
            success: true,
            captured: counts,
            totals,
        })
    }

    /// Record a completed chat exchange.
    ///
    /// # Errors
    ///
    /// Returns an error when the document flush fails; chat handlers treat
    /// this as best-effort and only log it.
    pub async fn record_chat_log(
        &self,
        contact_id: &str,
        messages: &[ChatMessage],
        reply: &str,
    ) -> AppResult<()> {
        let record = ChatLogCapture {
            id: self.capture_id("chat", 10_000),
            captured_at: Utc::now().to_rfc3339(),
            contact_id: contact_id.to_owned(),
            messages: messages.to_vec(),
            reply: reply.to_owned(),
        };
        self.store
            .mutate(move |doc| doc.monitoring.chat_logs.push(record))
            .await
    }

    /// Read-side snapshot: the entire retained set plus summary counts
    pub async fn overview(&self) -> OverviewSnapshot {
        self.store
            .read(|doc| OverviewSnapshot {
                captured_at: Utc::now().to_rfc3339(),
                summary: OverviewSummary {
                    user_profiles: doc.monitoring.user_profiles.len(),
                    pet_profiles: doc.monitoring.pet_profiles.len(),
                    purchases: doc.monitoring.purchases.len(),
                    chat_logs: doc.monitoring.chat_logs.len(),
                    contacts_tracked: doc.chat_history.len(),
                },
                monitoring: doc.monitoring.clone(),
                chat_history: doc.chat_history.clone(),
                users: doc.users.clone(),
                pets: doc.pets.clone(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_list_never_exceeds_capacity() {
        let mut list = BoundedList::with_capacity(3);
        for i in 0..10 {
            list.push(i);
            assert!(list.len() <= 3);
        }
        assert_eq!(list.as_slice(), &[7, 8, 9]);
    }

    #[test]
    fn bounded_list_survivors_keep_order() {
        let mut list = BoundedList::with_capacity(5);
        for i in 0..8 {
            list.push(i);
        }
        assert_eq!(list.as_slice(), &[3, 4, 5, 6, 7]);
    }

    #[test]
    fn shrinking_capacity_trims_oldest() {
        let mut list = BoundedList::with_capacity(10);
        for i in 0..10 {
            list.push(i);
        }
        list.set_capacity(4);
        assert_eq!(list.as_slice(), &[6, 7, 8, 9]);
    }

    #[test]
    fn deserialized_list_restores_default_capacity() {
        let raw = serde_json::to_string(&vec![1, 2, 3]).unwrap();
        let list: BoundedList<i32> = serde_json::from_str(&raw).unwrap();
        assert_eq!(list.as_slice(), &[1, 2, 3]);
        assert_eq!(list.max, DEFAULT_CAPACITY);
    }
}
