//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling lesson requests. It uses
//! `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use futures::StreamExt;
use std::sync::Arc;
use tracing::warn;
use tutor_core::{LessonOutput, pipeline::HistoryMessage};

use crate::{
    models::{ErrorResponse, LessonRequest, LessonResponse},
    state::AppState,
};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                warn!(%message, "Rejected request");
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Generate a lesson for a topic.
///
/// With `stream` enabled (the default) the response body is newline-delimited
/// JSON, one lesson block per line, written as each block is produced.
/// Invalid topics and generation failures are reported as a `failure` block,
/// not as an HTTP error.
#[utoipa::path(
    post,
    path = "/lessons",
    request_body = LessonRequest,
    responses(
        (status = 200, description = "Lesson blocks as NDJSON when streaming, otherwise the aggregated lesson", body = LessonResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse)
    )
)]
pub async fn create_lesson(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LessonRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let options = payload.options();
    let model_id = payload.model_id.unwrap_or_default();
    let history: Vec<HistoryMessage> = payload.history.into_iter().map(Into::into).collect();

    let output = state
        .pipeline
        .run(&payload.topic, &model_id, &history, options)
        .await;

    match output {
        LessonOutput::Stream(blocks) => {
            let lines = blocks.map(|block| {
                serde_json::to_string(&block).map(|mut line| {
                    line.push('\n');
                    line
                })
            });
            Ok((
                [(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)],
                Body::from_stream(lines),
            )
                .into_response())
        }
        LessonOutput::Aggregated(content) => Ok(Json(LessonResponse { content }).into_response()),
    }
}
