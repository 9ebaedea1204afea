//! PostgreSQL notification repository.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use tutor_core::{CreateNotificationRequest, Error, Notification, NotificationRepository, Result};

const COLUMNS: &str = "id, user_id, title, message, type, is_read, created_at";

/// PostgreSQL notification repository.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: Pool<Postgres>,
}

impl PgNotificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(r: &sqlx::postgres::PgRow) -> Notification {
        Notification {
            id: r.get("id"),
            user_id: r.get("user_id"),
            title: r.get("title"),
            message: r.get("message"),
            kind: r.get("type"),
            is_read: r.get("is_read"),
            created_at: r.get("created_at"),
        }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, req: CreateNotificationRequest) -> Result<Notification> {
        let row = sqlx::query(&format!(
            "INSERT INTO notification (user_id, title, message, type, is_read)
             VALUES ($1, $2, $3, $4, false)
             RETURNING {COLUMNS}"
        ))
        .bind(req.user_id)
        .bind(&req.title)
        .bind(&req.message)
        .bind(req.resolved_kind())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::parse_row(&row))
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM notification
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::parse_row).collect())
    }

    async fn mark_read(&self, id: i64) -> Result<Notification> {
        let row = sqlx::query(&format!(
            "UPDATE notification SET is_read = true WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref()
            .map(Self::parse_row)
            .ok_or(Error::NotificationNotFound(id))
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notification SET is_read = true WHERE user_id = $1 AND is_read = false")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM notification WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotificationNotFound(id));
        }
        Ok(())
    }

    async fn count_unread(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::DEFAULT_TEST_DATABASE_URL;

    async fn setup() -> PgNotificationRepository {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_TEST_DATABASE_URL.to_string());
        let pool = crate::create_pool(&database_url)
            .await
            .expect("Failed to connect to test DB");
        PgNotificationRepository::new(pool)
    }

    /// A user id unlikely to collide with other test runs.
    fn test_user() -> i64 {
        1_000_000 + (chrono::Utc::now().timestamp_micros() % 1_000_000_000)
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL with migrated database
    async fn test_insert_starts_unread_with_default_type() {
        let repo = setup().await;
        let user = test_user();

        let n = repo
            .insert(CreateNotificationRequest::new(user, "Welcome", "Hi"))
            .await
            .unwrap();

        assert_eq!(n.user_id, user);
        assert_eq!(n.kind, "info");
        assert!(!n.is_read);

        repo.delete(n.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL with migrated database
    async fn test_list_newest_first_and_mark_all_read() {
        let repo = setup().await;
        let user = test_user();

        let first = repo
            .insert(CreateNotificationRequest::new(user, "first", "1"))
            .await
            .unwrap();
        let second = repo
            .insert(CreateNotificationRequest::new(user, "second", "2"))
            .await
            .unwrap();

        let listed = repo.list_for_user(user).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        assert_eq!(repo.count_unread(user).await.unwrap(), 2);
        assert_eq!(repo.mark_all_read(user).await.unwrap(), 2);
        assert_eq!(repo.count_unread(user).await.unwrap(), 0);
        assert_eq!(repo.mark_all_read(user).await.unwrap(), 0);

        repo.delete(first.id).await.unwrap();
        repo.delete(second.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL with migrated database
    async fn test_missing_ids_are_not_found() {
        let repo = setup().await;

        let err = repo.mark_read(-1).await.unwrap_err();
        assert!(matches!(err, Error::NotificationNotFound(-1)));

        let err = repo.delete(-1).await.unwrap_err();
        assert!(matches!(err, Error::NotificationNotFound(-1)));
    }
}
