//! Notification HTTP handlers.
//!
//! Path identifiers are taken as raw strings so that malformed ids produce a
//! 400 from the service rather than a router rejection.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use tutor_core::Notification;

use crate::{ApiError, AppState};

/// An identifier sent either as a JSON number or as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNotificationBody {
    pub user_id: RawId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// POST /api/v1/notifications
pub async fn create_notification(
    State(state): State<AppState>,
    body: Result<Json<CreateNotificationBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let Json(body) = body?;
    let notification = state
        .notifications
        .create(
            &body.user_id.into_string(),
            &body.title,
            &body.message,
            body.kind,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// GET /api/v1/users/:user_id/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.notifications.list_by_user(&user_id).await?))
}

/// GET /api/v1/users/:user_id/notifications/unread-count
pub async fn count_unread(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = state.notifications.count_unread(&user_id).await?;
    Ok(Json(json!({ "count": count })))
}

/// POST /api/v1/users/:user_id/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state.notifications.mark_all_read(&user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}

/// PATCH /api/v1/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    Ok(Json(state.notifications.mark_read(&id).await?))
}

/// DELETE /api/v1/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.notifications.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
