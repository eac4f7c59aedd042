// ABOUTME: Pet roster CRUD route handlers
// ABOUTME: List, create with defaulted fields and a random sprite, and delete pets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! Pet roster routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{errors::AppError, models::Pet, server::ServerResources};

/// Sprite pool for pets created without an avatar
const PET_SPRITES: &[&str] = &[
    "/assets/1.png",
    "/assets/2.png",
    "/assets/3.png",
    "/assets/4.png",
    "/assets/5.png",
    "/assets/6.png",
];

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a pet; everything but the name is optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPetRequest {
    /// Pet name, required
    pub name: Option<String>,
    /// Species label
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Breed label
    pub breed: Option<String>,
    /// Free-text age
    pub age: Option<String>,
    /// Free-text gender
    pub gender: Option<String>,
    /// Avatar path; a random sprite when absent
    pub avatar: Option<String>,
    /// Traits as an array or a comma-separated string
    pub traits: Option<Value>,
    /// Health notes
    pub health: Option<String>,
    /// Status line
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
struct PetsResponse {
    pets: Vec<Pet>,
}

#[derive(Debug, Serialize)]
struct PetResponse {
    pet: Pet,
}

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
}

/// Accept traits as either a JSON array or a comma-separated string
fn parse_traits(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(ToOwned::to_owned)
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Pet Routes
// ============================================================================

/// Pet roster routes handler
pub struct PetRoutes;

impl PetRoutes {
    /// Create all pet routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/pets", get(Self::list))
            .route("/api/pets", post(Self::create))
            .route("/api/pets/:id", delete(Self::remove))
            .with_state(resources)
    }

    /// List the pet roster
    async fn list(State(resources): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        let pets = resources.store.read(|doc| doc.pets.clone()).await;
        Ok((StatusCode::OK, Json(PetsResponse { pets })).into_response())
    }

    /// Create a pet with defaulted fields
    async fn create(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<NewPetRequest>,
    ) -> Result<Response, AppError> {
        let name = request
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::invalid_input("Pet name is required"))?;

        let avatar = request.avatar.filter(|a| !a.is_empty()).unwrap_or_else(|| {
            let mut rng = resources.rng();
            PET_SPRITES[rng.gen_range(0..PET_SPRITES.len())].to_owned()
        });

        let pet = Pet {
            id: format!("p{}", Utc::now().timestamp_millis()),
            name,
            kind: request.kind.unwrap_or_else(|| "Pet".to_owned()),
            breed: request.breed.unwrap_or_else(|| "Unknown".to_owned()),
            age: request.age.unwrap_or_else(|| "Unknown".to_owned()),
            gender: request.gender.unwrap_or_else(|| "Unknown".to_owned()),
            avatar,
            traits: parse_traits(request.traits.as_ref()),
            health: request
                .health
                .unwrap_or_else(|| "No health notes yet.".to_owned()),
            status: request
                .status
                .unwrap_or_else(|| "Just joined the crew.".to_owned()),
        };

        let created = pet.clone();
        resources.store.mutate(move |doc| doc.pets.push(pet)).await?;
        Ok((StatusCode::OK, Json(PetResponse { pet: created })).into_response())
    }

    /// Delete a pet by id
    async fn remove(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .store
            .mutate(move |doc| doc.pets.retain(|p| p.id != id))
            .await?;
        Ok((StatusCode::OK, Json(SuccessResponse { success: true })).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn traits_accept_array_or_comma_string() {
        let from_array = parse_traits(Some(&json!(["Calm", "Curious"])));
        assert_eq!(from_array, vec!["Calm", "Curious"]);
        let from_string = parse_traits(Some(&json!("Calm, Curious , ")));
        assert_eq!(from_string, vec!["Calm", "Curious"]);
        assert!(parse_traits(None).is_empty());
    }
}
