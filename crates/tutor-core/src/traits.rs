//! Core traits for tutor abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTIFICATION REPOSITORY
// =============================================================================

/// Repository for notification storage. Every method is one atomic store
/// operation; ids are already validated integers.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a new, unread notification.
    async fn insert(&self, req: CreateNotificationRequest) -> Result<Notification>;

    /// All notifications of a user, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>>;

    /// Mark one notification read. Fails with `NotificationNotFound` if absent.
    async fn mark_read(&self, id: i64) -> Result<Notification>;

    /// Mark every unread notification of a user read; returns the number changed.
    async fn mark_all_read(&self, user_id: i64) -> Result<u64>;

    /// Delete one notification. Fails with `NotificationNotFound` if absent.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Number of unread notifications of a user.
    async fn count_unread(&self, user_id: i64) -> Result<i64>;
}

// =============================================================================
// GENERATION STATUS REPOSITORY
// =============================================================================

/// Server-side storage of generation status rows.
#[async_trait]
pub trait GenerationStatusRepository: Send + Sync {
    /// Register a subject for a user (profile onboarding).
    async fn enroll(&self, user_id: i64, subject_id: i64) -> Result<()>;

    /// Queue generation for one subject, resetting its status to pending.
    async fn start(&self, user_id: i64, subject_id: i64) -> Result<GenerationStatus>;

    /// Queue generation for every enrolled subject; returns how many were queued.
    async fn start_all(&self, user_id: i64) -> Result<u64>;

    /// Current status of one subject, if generation was ever started.
    async fn get(&self, user_id: i64, subject_id: i64) -> Result<Option<GenerationStatus>>;

    /// Statuses of all subjects of a user, ordered by subject id.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<GenerationStatus>>;

    /// Record worker progress for a subject. Fails with `NotFound` if absent.
    async fn update(
        &self,
        user_id: i64,
        subject_id: i64,
        update: StatusUpdate,
    ) -> Result<GenerationStatus>;

    /// Remove a subject's generated content and status. Fails with `NotFound` if absent.
    async fn reset(&self, user_id: i64, subject_id: i64) -> Result<()>;
}

// =============================================================================
// GENERATION CLIENT
// =============================================================================

/// Client-side view of the generation service.
///
/// The poller only talks to the backend through this trait.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// Start generation for one subject.
    async fn start_generation(&self, user_id: i64, subject_id: i64) -> Result<()>;

    /// Start generation for all subjects of a user.
    async fn start_all_generation(&self, user_id: i64) -> Result<()>;

    /// Fetch the status of one subject.
    async fn fetch_status(&self, user_id: i64, subject_id: i64) -> Result<StatusLookup>;

    /// Fetch statuses of all subjects of a user.
    async fn fetch_all_statuses(&self, user_id: i64) -> Result<Vec<GenerationStatus>>;

    /// Delete the generated content of one subject.
    async fn reset_generation(&self, user_id: i64, subject_id: i64) -> Result<()>;
}
