use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{self, AppState};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Adoptiverse API",
        version = "0.1.0",
        description = "REST API for animal shelters and the pets they hold.",
        license(name = "MIT")
    ),
    tags(
        (name = "system", description = "System information"),
        (name = "shelters", description = "Shelter CRUD operations"),
        (name = "pets", description = "Shelter-scoped pet CRUD operations")
    ),
    paths(
        handlers::get_version,
        // Shelters
        handlers::list_shelters,
        handlers::get_shelter,
        handlers::create_shelter,
        handlers::upsert_shelter,
        handlers::delete_shelter,
        // Pets
        handlers::list_pets,
        handlers::get_pet,
        handlers::create_pet,
        handlers::upsert_pet,
        handlers::delete_pet,
    ),
    components(schemas(
        handlers::VersionInfo,
        handlers::Shelter,
        handlers::ShelterRequest,
        handlers::Pet,
        handlers::PetRequest,
    ))
)]
pub struct ApiDoc;

pub fn create_router(state: Arc<AppState>) -> Router {
    let shelter_routes = Router::new()
        .route("/shelters", get(handlers::list_shelters))
        .route("/shelters", post(handlers::create_shelter))
        .route("/shelters/{shelter_id}", get(handlers::get_shelter))
        .route("/shelters/{shelter_id}", put(handlers::upsert_shelter))
        .route("/shelters/{shelter_id}", delete(handlers::delete_shelter));

    // Pets are always addressed through their shelter
    let pet_routes = Router::new()
        .route("/pets", get(handlers::list_pets))
        .route("/pets", post(handlers::create_pet))
        .route("/pets/{pet_id}", get(handlers::get_pet))
        .route("/pets/{pet_id}", put(handlers::upsert_pet))
        .route("/pets/{pet_id}", delete(handlers::delete_pet));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/version", get(handlers::get_version))
        .merge(shelter_routes)
        .nest("/shelters/{shelter_id}", pet_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_resource_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/shelters",
            "/shelters/{shelter_id}",
            "/shelters/{shelter_id}/pets",
            "/shelters/{shelter_id}/pets/{pet_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
