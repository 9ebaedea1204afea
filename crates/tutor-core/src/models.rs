//! Domain models shared between the server, the store and the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// A notification delivered to a single user.
///
/// The serialized field names are a wire contract with existing clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    /// Category tag ("info", "success", "warning", ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Request for creating a notification.
///
/// There is no read flag here: new notifications always start unread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    /// Category tag; `None` or blank falls back to [`defaults::NOTIFICATION_TYPE`].
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl CreateNotificationRequest {
    pub fn new(user_id: i64, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// The category tag that will be stored.
    pub fn resolved_kind(&self) -> &str {
        match self.kind.as_deref().map(str::trim) {
            Some(kind) if !kind.is_empty() => kind,
            _ => defaults::NOTIFICATION_TYPE,
        }
    }
}

// =============================================================================
// GENERATION STATUS
// =============================================================================

/// Lifecycle of AI content generation for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl GenerationState {
    /// Completed and failed are final: no further transition happens.
    pub fn is_terminal(self) -> bool {
        matches!(self, GenerationState::Completed | GenerationState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GenerationState::Pending => "pending",
            GenerationState::InProgress => "in_progress",
            GenerationState::Completed => "completed",
            GenerationState::Failed => "failed",
        }
    }

    /// Convert a stored status string. Unknown values read as pending.
    pub fn from_db(s: &str) -> Self {
        match s {
            "in_progress" => GenerationState::InProgress,
            "completed" => GenerationState::Completed,
            "failed" => GenerationState::Failed,
            _ => GenerationState::Pending,
        }
    }
}

impl std::fmt::Display for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation progress for one (user, subject) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStatus {
    pub user_id: i64,
    pub subject_id: i64,
    pub status: GenerationState,
    pub chapters_generated: bool,
    pub topics_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationStatus {
    /// Fresh status row for a generation request that was just accepted.
    pub fn pending(user_id: i64, subject_id: i64) -> Self {
        Self {
            user_id,
            subject_id,
            status: GenerationState::Pending,
            chapters_generated: false,
            topics_generated: false,
            error_message: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Result of a single-subject status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLookup {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GenerationStatus>,
}

impl From<Option<GenerationStatus>> for StatusLookup {
    fn from(status: Option<GenerationStatus>) -> Self {
        Self {
            exists: status.is_some(),
            status,
        }
    }
}

/// Progress update written by the generation worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<GenerationState>,
    pub chapters_generated: Option<bool>,
    pub topics_generated: Option<bool>,
    pub error_message: Option<String>,
}

/// Acknowledgement returned when generation is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationAck {
    /// Number of subjects queued for generation.
    pub queued: u64,
}
