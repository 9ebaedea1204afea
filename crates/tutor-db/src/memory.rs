//! In-memory repositories for tests and local runs without PostgreSQL.
//!
//! Behavior mirrors the PostgreSQL repositories, including not-found errors
//! and ordering. `fail_storage` makes every call fail with a database error
//! so callers can exercise their storage-failure paths.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use tutor_core::{
    CreateNotificationRequest, Error, GenerationState, GenerationStatus,
    GenerationStatusRepository, Notification, NotificationRepository, Result, StatusUpdate,
};

fn storage_error() -> Error {
    Error::Database(sqlx::Error::PoolTimedOut)
}

/// In-memory notification store.
#[derive(Clone, Default)]
pub struct MemoryNotificationRepository {
    rows: Arc<RwLock<BTreeMap<i64, Notification>>>,
    next_id: Arc<AtomicI64>,
    failing: Arc<AtomicBool>,
}

impl MemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again) with a storage error.
    pub fn fail_storage(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(storage_error());
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn insert(&self, req: CreateNotificationRequest) -> Result<Notification> {
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let notification = Notification {
            id,
            user_id: req.user_id,
            kind: req.resolved_kind().to_string(),
            title: req.title,
            message: req.message,
            is_read: false,
            created_at: Utc::now(),
        };
        self.rows.write().await.insert(id, notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.check()?;
        let rows = self.rows.read().await;
        let mut listed: Vec<Notification> = rows
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listed)
    }

    async fn mark_read(&self, id: i64) -> Result<Notification> {
        self.check()?;
        let mut rows = self.rows.write().await;
        let notification = rows.get_mut(&id).ok_or(Error::NotificationNotFound(id))?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        self.check()?;
        let mut rows = self.rows.write().await;
        let mut changed = 0;
        for n in rows
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.check()?;
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::NotificationNotFound(id))
    }

    async fn count_unread(&self, user_id: i64) -> Result<i64> {
        self.check()?;
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }
}

#[derive(Default)]
struct GenerationTables {
    enrolled: BTreeSet<(i64, i64)>,
    statuses: BTreeMap<(i64, i64), GenerationStatus>,
}

/// In-memory generation status store.
#[derive(Clone, Default)]
pub struct MemoryGenerationStatusRepository {
    tables: Arc<RwLock<GenerationTables>>,
    failing: Arc<AtomicBool>,
}

impl MemoryGenerationStatusRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again) with a storage error.
    pub fn fail_storage(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(storage_error());
        }
        Ok(())
    }

    fn not_found(user_id: i64, subject_id: i64) -> Error {
        Error::NotFound(format!(
            "No generation for user {} subject {}",
            user_id, subject_id
        ))
    }
}

#[async_trait]
impl GenerationStatusRepository for MemoryGenerationStatusRepository {
    async fn enroll(&self, user_id: i64, subject_id: i64) -> Result<()> {
        self.check()?;
        self.tables
            .write()
            .await
            .enrolled
            .insert((user_id, subject_id));
        Ok(())
    }

    async fn start(&self, user_id: i64, subject_id: i64) -> Result<GenerationStatus> {
        self.check()?;
        let mut tables = self.tables.write().await;
        tables.enrolled.insert((user_id, subject_id));
        let status = GenerationStatus::pending(user_id, subject_id);
        tables.statuses.insert((user_id, subject_id), status.clone());
        Ok(status)
    }

    async fn start_all(&self, user_id: i64) -> Result<u64> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let subjects: Vec<(i64, i64)> = tables
            .enrolled
            .iter()
            .filter(|(user, _)| *user == user_id)
            .copied()
            .collect();

        let mut queued = 0;
        for key in subjects {
            let requeue = match tables.statuses.get(&key) {
                None => true,
                Some(existing) => existing.status == GenerationState::Failed,
            };
            if requeue {
                tables
                    .statuses
                    .insert(key, GenerationStatus::pending(key.0, key.1));
                queued += 1;
            }
        }
        Ok(queued)
    }

    async fn get(&self, user_id: i64, subject_id: i64) -> Result<Option<GenerationStatus>> {
        self.check()?;
        Ok(self
            .tables
            .read()
            .await
            .statuses
            .get(&(user_id, subject_id))
            .cloned())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<GenerationStatus>> {
        self.check()?;
        // BTreeMap keys order by (user, subject), so this is already sorted by subject.
        Ok(self
            .tables
            .read()
            .await
            .statuses
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        user_id: i64,
        subject_id: i64,
        update: StatusUpdate,
    ) -> Result<GenerationStatus> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let status = tables
            .statuses
            .get_mut(&(user_id, subject_id))
            .ok_or_else(|| Self::not_found(user_id, subject_id))?;

        if let Some(state) = update.status {
            status.status = state;
        }
        if let Some(chapters) = update.chapters_generated {
            status.chapters_generated = chapters;
        }
        if let Some(topics) = update.topics_generated {
            status.topics_generated = topics;
        }
        if update.error_message.is_some() {
            status.error_message = update.error_message;
        }
        status.updated_at = Utc::now();
        Ok(status.clone())
    }

    async fn reset(&self, user_id: i64, subject_id: i64) -> Result<()> {
        self.check()?;
        self.tables
            .write()
            .await
            .statuses
            .remove(&(user_id, subject_id))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(user_id, subject_id))
    }
}
