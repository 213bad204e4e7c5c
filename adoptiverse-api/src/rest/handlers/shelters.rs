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

use crate::model::ShelterData;
use crate::resources::{ShelterInput, Upserted};

use super::{ApiError, AppState};

/// Shelter resource
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub rank: Option<i32>,
    pub foster_program: Option<bool>,
    pub created_at: DateTime<Utc>,
    /// Null until the first update
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ShelterData> for Shelter {
    fn from(data: ShelterData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            city: data.city,
            rank: data.rank,
            foster_program: data.foster_program,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }
}

/// Shelter fields for create and upsert
///
/// `id`, `createdAt` and `updatedAt` in the body are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShelterRequest {
    /// Required on create
    pub name: Option<String>,
    /// Required on create
    pub city: Option<String>,
    pub rank: Option<i32>,
    pub foster_program: Option<bool>,
}

impl From<ShelterRequest> for ShelterInput {
    fn from(req: ShelterRequest) -> Self {
        Self {
            name: req.name,
            city: req.city,
            rank: req.rank,
            foster_program: req.foster_program,
        }
    }
}

/// List all shelters
#[utoipa::path(
    get,
    path = "/shelters",
    responses(
        (status = 200, description = "List of shelters", body = Vec<Shelter>)
    ),
    tag = "shelters"
)]
pub async fn list_shelters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Shelter>>, ApiError> {
    let shelters = state.shelters.list().await?;
    Ok(Json(shelters.into_iter().map(Shelter::from).collect()))
}

/// Get a shelter by ID
#[utoipa::path(
    get,
    path = "/shelters/{shelter_id}",
    params(
        ("shelter_id" = i64, Path, description = "Shelter ID")
    ),
    responses(
        (status = 200, description = "Shelter found", body = Shelter),
        (status = 404, description = "Shelter not found")
    ),
    tag = "shelters"
)]
pub async fn get_shelter(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Shelter>, ApiError> {
    let Path(id) = path?;
    let shelter = state.shelters.get(id).await?;
    Ok(Json(shelter.into()))
}

/// Create a new shelter
#[utoipa::path(
    post,
    path = "/shelters",
    request_body = ShelterRequest,
    responses(
        (status = 201, description = "Shelter created", body = Shelter),
        (status = 400, description = "Missing or malformed field")
    ),
    tag = "shelters"
)]
pub async fn create_shelter(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ShelterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Shelter>), ApiError> {
    let Json(req) = payload?;
    let shelter = state.shelters.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(shelter.into())))
}

/// Create or merge-update a shelter
///
/// An existing shelter takes only the fields present in the body. A missing
/// one is created under a newly assigned id, which the response carries.
#[utoipa::path(
    put,
    path = "/shelters/{shelter_id}",
    params(
        ("shelter_id" = i64, Path, description = "Shelter ID")
    ),
    request_body = ShelterRequest,
    responses(
        (status = 201, description = "Shelter did not exist and was created", body = Shelter),
        (status = 204, description = "Shelter updated"),
        (status = 400, description = "Missing or malformed field")
    ),
    tag = "shelters"
)]
pub async fn upsert_shelter(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ShelterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = path?;
    let Json(req) = payload?;
    match state.shelters.upsert(id, req.into()).await? {
        Upserted::Created(shelter) => {
            Ok((StatusCode::CREATED, Json(Shelter::from(shelter))).into_response())
        }
        Upserted::Updated(_) => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Delete a shelter and all of its pets
#[utoipa::path(
    delete,
    path = "/shelters/{shelter_id}",
    params(
        ("shelter_id" = i64, Path, description = "Shelter ID")
    ),
    responses(
        (status = 204, description = "Shelter and its pets deleted"),
        (status = 404, description = "Shelter not found")
    ),
    tag = "shelters"
)]
pub async fn delete_shelter(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let remaining = state.shelters.delete(id).await?;
    debug!(shelter_id = id, remaining = remaining.len(), "Shelter removed");
    Ok(StatusCode::NO_CONTENT)
}
