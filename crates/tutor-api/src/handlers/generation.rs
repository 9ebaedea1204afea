//! Generation status HTTP handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use tutor_core::{GenerationAck, GenerationStatus, StatusLookup, StatusUpdate};

use crate::{ApiError, AppState};

/// POST /api/v1/users/:user_id/subjects/:subject_id/generation
pub async fn start_generation(
    State(state): State<AppState>,
    Path((user_id, subject_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<GenerationStatus>), ApiError> {
    let status = state.generation.start(&user_id, &subject_id).await?;
    Ok((StatusCode::ACCEPTED, Json(status)))
}

/// POST /api/v1/users/:user_id/generation
pub async fn start_all_generation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<GenerationAck>), ApiError> {
    let ack = state.generation.start_all(&user_id).await?;
    Ok((StatusCode::ACCEPTED, Json(ack)))
}

/// GET /api/v1/users/:user_id/subjects/:subject_id/generation
pub async fn get_status(
    State(state): State<AppState>,
    Path((user_id, subject_id)): Path<(String, String)>,
) -> Result<Json<StatusLookup>, ApiError> {
    Ok(Json(state.generation.status(&user_id, &subject_id).await?))
}

/// GET /api/v1/users/:user_id/generation
pub async fn list_statuses(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<GenerationStatus>>, ApiError> {
    Ok(Json(state.generation.list(&user_id).await?))
}

/// PATCH /api/v1/users/:user_id/subjects/:subject_id/generation
///
/// Written by the generation worker as it makes progress.
pub async fn update_status(
    State(state): State<AppState>,
    Path((user_id, subject_id)): Path<(String, String)>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<GenerationStatus>, ApiError> {
    let Json(update) = body?;
    Ok(Json(
        state
            .generation
            .update(&user_id, &subject_id, update)
            .await?,
    ))
}

/// DELETE /api/v1/users/:user_id/subjects/:subject_id/generation
pub async fn reset_generation(
    State(state): State<AppState>,
    Path((user_id, subject_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.generation.reset(&user_id, &subject_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
