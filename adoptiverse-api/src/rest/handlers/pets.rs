use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::model::PetData;
use crate::resources::{PetInput, Upserted};

use super::{ApiError, AppState};

/// Pet resource
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub shelter_id: i64,
    pub name: String,
    pub breed: String,
    pub age: i32,
    pub adoptable: bool,
    pub created_at: DateTime<Utc>,
    /// Null until the first update
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<PetData> for Pet {
    fn from(data: PetData) -> Self {
        Self {
            id: data.id,
            shelter_id: data.shelter_id,
            name: data.name,
            breed: data.breed,
            age: data.age,
            adoptable: data.adoptable,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }
}

/// Pet fields for create and upsert
///
/// All four fields are required on both create and update. `shelterId` in
/// the body is ignored in favor of the path.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetRequest {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub adoptable: Option<bool>,
}

impl From<PetRequest> for PetInput {
    fn from(req: PetRequest) -> Self {
        Self {
            name: req.name,
            breed: req.breed,
            age: req.age,
            adoptable: req.adoptable,
        }
    }
}

/// List the pets of a shelter
#[utoipa::path(
    get,
    path = "/shelters/{shelter_id}/pets",
    params(
        ("shelter_id" = i64, Path, description = "Shelter ID")
    ),
    responses(
        (status = 200, description = "Pets of the shelter, ordered by id", body = Vec<Pet>),
        (status = 404, description = "Shelter not found")
    ),
    tag = "pets"
)]
pub async fn list_pets(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Pet>>, ApiError> {
    let Path(shelter_id) = path?;
    let pets = state.pets.list_by_shelter(shelter_id).await?;
    Ok(Json(pets.into_iter().map(Pet::from).collect()))
}

/// Get a pet of a shelter
#[utoipa::path(
    get,
    path = "/shelters/{shelter_id}/pets/{pet_id}",
    params(
        ("shelter_id" = i64, Path, description = "Shelter ID"),
        ("pet_id" = i64, Path, description = "Pet ID")
    ),
    responses(
        (status = 200, description = "Pet found", body = Pet),
        (status = 404, description = "Shelter or pet not found")
    ),
    tag = "pets"
)]
pub async fn get_pet(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<Pet>, ApiError> {
    let Path((shelter_id, pet_id)) = path?;
    let pet = state.pets.get(shelter_id, pet_id).await?;
    Ok(Json(pet.into()))
}

/// Create a pet in a shelter
#[utoipa::path(
    post,
    path = "/shelters/{shelter_id}/pets",
    params(
        ("shelter_id" = i64, Path, description = "Shelter ID")
    ),
    request_body = PetRequest,
    responses(
        (status = 201, description = "Pet created", body = Pet),
        (status = 400, description = "Missing or malformed field"),
        (status = 404, description = "Shelter not found")
    ),
    tag = "pets"
)]
pub async fn create_pet(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    let Path(shelter_id) = path?;
    state.pets.require_shelter(shelter_id).await?;
    let Json(req) = payload?;
    let pet = state.pets.create(shelter_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(pet.into())))
}

/// Create or overwrite a pet
///
/// An existing pet has all four fields replaced. The pet is looked up by id
/// alone unless the server runs with scoped pet updates, so a pet of another
/// shelter can be overwritten here; it stays in its own shelter.
#[utoipa::path(
    put,
    path = "/shelters/{shelter_id}/pets/{pet_id}",
    params(
        ("shelter_id" = i64, Path, description = "Shelter ID"),
        ("pet_id" = i64, Path, description = "Pet ID")
    ),
    request_body = PetRequest,
    responses(
        (status = 201, description = "Pet did not exist and was created", body = Pet),
        (status = 204, description = "Pet overwritten"),
        (status = 400, description = "Missing or malformed field"),
        (status = 404, description = "Shelter not found")
    ),
    tag = "pets"
)]
pub async fn upsert_pet(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<PetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path((shelter_id, pet_id)) = path?;
    state.pets.require_shelter(shelter_id).await?;
    let Json(req) = payload?;
    match state.pets.upsert(shelter_id, pet_id, req.into()).await? {
        Upserted::Created(pet) => Ok((StatusCode::CREATED, Json(Pet::from(pet))).into_response()),
        Upserted::Updated(_) => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Delete a pet of a shelter
#[utoipa::path(
    delete,
    path = "/shelters/{shelter_id}/pets/{pet_id}",
    params(
        ("shelter_id" = i64, Path, description = "Shelter ID"),
        ("pet_id" = i64, Path, description = "Pet ID")
    ),
    responses(
        (status = 204, description = "Pet deleted"),
        (status = 404, description = "Shelter or pet not found")
    ),
    tag = "pets"
)]
pub async fn delete_pet(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((shelter_id, pet_id)) = path?;
    let remaining = state.pets.delete(shelter_id, pet_id).await?;
    debug!(shelter_id, pet_id, remaining = remaining.len(), "Pet removed");
    Ok(StatusCode::NO_CONTENT)
}
