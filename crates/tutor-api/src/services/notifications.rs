//! Notification service.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use tutor_core::{
    parse_notification_id, parse_user_id, CreateNotificationRequest, Error, Notification,
    NotificationRepository, Result,
};

use super::log_failure;

const COMPONENT: &str = "notifications";

/// Validates caller input and runs notification operations against the store.
#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    /// Create an unread notification. `kind` falls back to `"info"`.
    pub async fn create(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: Option<String>,
    ) -> Result<Notification> {
        let user_id = parse_user_id(user_id).inspect_err(|e| log_failure(COMPONENT, "create", e))?;
        let title = title.trim();
        if title.is_empty() {
            let err = Error::InvalidInput("title must not be empty".into());
            log_failure(COMPONENT, "create", &err);
            return Err(err);
        }

        let mut req = CreateNotificationRequest::new(user_id, title, message);
        req.kind = kind;

        let notification = self
            .repo
            .insert(req)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "create", e))?;
        info!(
            subsystem = "api",
            component = COMPONENT,
            op = "create",
            user_id,
            notification_id = notification.id,
            "Notification created"
        );
        Ok(notification)
    }

    /// All notifications of a user, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        let start = Instant::now();
        let user_id =
            parse_user_id(user_id).inspect_err(|e| log_failure(COMPONENT, "list_by_user", e))?;
        let listed = self
            .repo
            .list_for_user(user_id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "list_by_user", e))?;
        debug!(
            subsystem = "api",
            component = COMPONENT,
            op = "list_by_user",
            user_id,
            result_count = listed.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed notifications"
        );
        Ok(listed)
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<Notification> {
        let id = parse_notification_id(notification_id)
            .inspect_err(|e| log_failure(COMPONENT, "mark_read", e))?;
        let updated = self
            .repo
            .mark_read(id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "mark_read", e))?;
        debug!(
            subsystem = "api",
            component = COMPONENT,
            op = "mark_read",
            notification_id = id,
            "Notification marked read"
        );
        Ok(updated)
    }

    /// Mark every unread notification of a user as read. Returns how many changed.
    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let user_id =
            parse_user_id(user_id).inspect_err(|e| log_failure(COMPONENT, "mark_all_read", e))?;
        let changed = self
            .repo
            .mark_all_read(user_id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "mark_all_read", e))?;
        info!(
            subsystem = "api",
            component = COMPONENT,
            op = "mark_all_read",
            user_id,
            result_count = changed,
            "Notifications marked read"
        );
        Ok(changed)
    }

    pub async fn delete(&self, notification_id: &str) -> Result<()> {
        let id = parse_notification_id(notification_id)
            .inspect_err(|e| log_failure(COMPONENT, "delete", e))?;
        self.repo
            .delete(id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "delete", e))?;
        info!(
            subsystem = "api",
            component = COMPONENT,
            op = "delete",
            notification_id = id,
            "Notification deleted"
        );
        Ok(())
    }

    pub async fn count_unread(&self, user_id: &str) -> Result<i64> {
        let user_id =
            parse_user_id(user_id).inspect_err(|e| log_failure(COMPONENT, "count_unread", e))?;
        self.repo
            .count_unread(user_id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "count_unread", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_db::MemoryNotificationRepository;

    fn service() -> (NotificationService, MemoryNotificationRepository) {
        let repo = MemoryNotificationRepository::new();
        (NotificationService::new(Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let (svc, _) = service();
        let n = svc.create("7", "Welcome", "Hello there", None).await.unwrap();
        assert_eq!(n.user_id, 7);
        assert_eq!(n.kind, "info");
        assert!(!n.is_read);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let (svc, _) = service();
        let err = svc.create("7", "   ", "body", None).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_invalid_ids_never_reach_store() {
        let (svc, repo) = service();
        // A store failure would surface as Error::Database; validation must win.
        repo.fail_storage(true);

        assert!(svc.list_by_user("abc").await.unwrap_err().is_validation());
        assert!(svc.count_unread("").await.unwrap_err().is_validation());
        assert!(svc.mark_all_read("7x").await.unwrap_err().is_validation());
        assert!(svc.mark_read("one").await.unwrap_err().is_validation());
        assert!(svc.delete("1.5").await.unwrap_err().is_validation());
        assert!(svc
            .create("u7", "title", "m", None)
            .await
            .unwrap_err()
            .is_validation());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let (svc, repo) = service();
        repo.fail_storage(true);
        let err = svc.count_unread("7").await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[tokio::test]
    async fn test_mark_all_read_then_count_is_zero() {
        let (svc, _) = service();
        for title in ["a", "b", "c"] {
            svc.create("7", title, "m", None).await.unwrap();
        }
        assert_eq!(svc.count_unread("7").await.unwrap(), 3);
        assert_eq!(svc.mark_all_read("7").await.unwrap(), 3);
        assert_eq!(svc.count_unread("7").await.unwrap(), 0);
        assert_eq!(svc.mark_all_read("7").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_welcome_then_read_all() {
        let (svc, _) = service();
        let n = svc
            .create("7", "Welcome", "Hi", Some("info".into()))
            .await
            .unwrap();
        assert!(!n.is_read);
        assert_eq!(n.kind, "info");

        svc.mark_all_read("7").await.unwrap();
        assert_eq!(svc.count_unread("7").await.unwrap(), 0);
        assert!(svc.list_by_user("7").await.unwrap().iter().all(|n| n.is_read));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let (svc, _) = service();
        let n = svc.create("7", "t", "m", None).await.unwrap();
        let id = n.id.to_string();
        svc.delete(&id).await.unwrap();
        assert!(svc.delete(&id).await.unwrap_err().is_not_found());
        assert!(svc.mark_read(&id).await.unwrap_err().is_not_found());
    }
}
