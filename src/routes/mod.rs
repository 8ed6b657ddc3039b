pub mod health;
pub mod identity;
pub mod qa;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::models::{AskForm, AskResponse, ErrorResponse, HealthResponse, UploadForm, UploadResponse};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(identity::upload, qa::ask, health::health_check),
    components(schemas(UploadForm, UploadResponse, AskForm, AskResponse, ErrorResponse, HealthResponse)),
    tags(
        (name = "identity", description = "Match a claimed name against an identity document"),
        (name = "qa", description = "Questions about the reference contract"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes();

    Router::new()
        .merge(identity::router())
        .merge(qa::router())
        .merge(health::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
