mod pets;
mod shelters;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::resources::{PetStore, PetUpdateLookup, ShelterStore};
use crate::store::{DataStore, Event, StoreError};

pub use pets::*;
pub use shelters::*;

/// Shared application state
pub struct AppState {
    pub shelters: ShelterStore,
    pub pets: PetStore,
    events: broadcast::Sender<Event>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, pet_update_lookup: PetUpdateLookup) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            shelters: ShelterStore::new(store.clone(), events.clone()),
            pets: PetStore::new(store, events.clone(), pet_update_lookup),
            events,
        }
    }

    /// Subscribe to change events from both resource managers.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

/// API error. Only the status code goes on the wire; the message is logged.
#[derive(Debug)]
pub struct ApiError {
    pub error: String,
    pub code: u16,
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        ApiError {
            error: error.into(),
            code: 400,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            400 => StatusCode::BAD_REQUEST,
            404 => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(code = self.code, "{}", self.error);
        } else {
            warn!(code = self.code, "{}", self.error);
        }
        status.into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => ApiError {
                error: msg,
                code: 404,
            },
            StoreError::Validation(msg) => ApiError::bad_request(msg),
            other => ApiError {
                error: other.to_string(),
                code: 500,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError {
            error: rejection.body_text(),
            code: rejection.status().as_u16(),
        }
    }
}

/// Version information
#[derive(Serialize, ToSchema)]
pub struct VersionInfo {
    pub version: String,
}

/// Get service version
#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = 200, description = "Service version", body = VersionInfo)
    ),
    tag = "system"
)]
pub async fn get_version() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_status_mapping() {
        let cases = [
            (StoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (StoreError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (StoreError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
