//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the lesson endpoint, artifact serving and OpenAPI documentation.

use crate::{
    handlers,
    models::{ChatMessage, ErrorResponse, LessonRequest, LessonResponse},
    state::AppState,
};

use axum::{Router, routing::post};
use std::sync::Arc;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::create_lesson),
    components(schemas(LessonRequest, LessonResponse, ChatMessage, ErrorResponse)),
    tags(
        (name = "Tutor API", description = "Staged lesson generation with optional visualizations")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Link-mode references point here, so the directory must match the store's.
    let outputs = ServeDir::new(&app_state.pipeline.config().output_location);

    let api_router = Router::new()
        .route("/lessons", post(handlers::create_lesson))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
        .nest_service("/outputs", outputs)
}
