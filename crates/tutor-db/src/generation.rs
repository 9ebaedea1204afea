//! PostgreSQL generation status repository.
//!
//! Rows are written by the generation worker through [`GenerationStatusRepository::update`]
//! and read by the status endpoints the client poller hits.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use tutor_core::{
    Error, GenerationState, GenerationStatus, GenerationStatusRepository, Result, StatusUpdate,
};

const COLUMNS: &str =
    "user_id, subject_id, status, chapters_generated, topics_generated, error_message, updated_at";

/// PostgreSQL generation status repository.
#[derive(Clone)]
pub struct PgGenerationStatusRepository {
    pool: Pool<Postgres>,
}

impl PgGenerationStatusRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(r: &sqlx::postgres::PgRow) -> GenerationStatus {
        let status: String = r.get("status");
        GenerationStatus {
            user_id: r.get("user_id"),
            subject_id: r.get("subject_id"),
            status: GenerationState::from_db(&status),
            chapters_generated: r.get("chapters_generated"),
            topics_generated: r.get("topics_generated"),
            error_message: r.get("error_message"),
            updated_at: r.get("updated_at"),
        }
    }

    fn not_found(user_id: i64, subject_id: i64) -> Error {
        Error::NotFound(format!(
            "No generation for user {} subject {}",
            user_id, subject_id
        ))
    }
}

#[async_trait]
impl GenerationStatusRepository for PgGenerationStatusRepository {
    async fn enroll(&self, user_id: i64, subject_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_subject (user_id, subject_id) VALUES ($1, $2)
             ON CONFLICT (user_id, subject_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(subject_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn start(&self, user_id: i64, subject_id: i64) -> Result<GenerationStatus> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "INSERT INTO user_subject (user_id, subject_id) VALUES ($1, $2)
             ON CONFLICT (user_id, subject_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(subject_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let row = sqlx::query(&format!(
            "INSERT INTO generation_status (user_id, subject_id, status)
             VALUES ($1, $2, 'pending')
             ON CONFLICT (user_id, subject_id) DO UPDATE SET
                status = 'pending',
                chapters_generated = false,
                topics_generated = false,
                error_message = NULL,
                updated_at = now()
             RETURNING {COLUMNS}"
        ))
        .bind(user_id)
        .bind(subject_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(Self::parse_row(&row))
    }

    async fn start_all(&self, user_id: i64) -> Result<u64> {
        // Subjects already in flight or completed are left alone; failed ones are re-queued.
        let result = sqlx::query(
            "INSERT INTO generation_status (user_id, subject_id, status)
             SELECT user_id, subject_id, 'pending' FROM user_subject WHERE user_id = $1
             ON CONFLICT (user_id, subject_id) DO UPDATE SET
                status = 'pending',
                chapters_generated = false,
                topics_generated = false,
                error_message = NULL,
                updated_at = now()
             WHERE generation_status.status = 'failed'",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }

    async fn get(&self, user_id: i64, subject_id: i64) -> Result<Option<GenerationStatus>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM generation_status WHERE user_id = $1 AND subject_id = $2"
        ))
        .bind(user_id)
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::parse_row))
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<GenerationStatus>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM generation_status WHERE user_id = $1 ORDER BY subject_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::parse_row).collect())
    }

    async fn update(
        &self,
        user_id: i64,
        subject_id: i64,
        update: StatusUpdate,
    ) -> Result<GenerationStatus> {
        let row = sqlx::query(&format!(
            "UPDATE generation_status SET
                status = COALESCE($3, status),
                chapters_generated = COALESCE($4, chapters_generated),
                topics_generated = COALESCE($5, topics_generated),
                error_message = COALESCE($6, error_message),
                updated_at = now()
             WHERE user_id = $1 AND subject_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(user_id)
        .bind(subject_id)
        .bind(update.status.map(GenerationState::as_str))
        .bind(update.chapters_generated)
        .bind(update.topics_generated)
        .bind(update.error_message.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref()
            .map(Self::parse_row)
            .ok_or_else(|| Self::not_found(user_id, subject_id))
    }

    async fn reset(&self, user_id: i64, subject_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Topics go with their chapters (ON DELETE CASCADE).
        sqlx::query("DELETE FROM generated_chapter WHERE user_id = $1 AND subject_id = $2")
            .bind(user_id)
            .bind(subject_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result =
            sqlx::query("DELETE FROM generation_status WHERE user_id = $1 AND subject_id = $2")
                .bind(user_id)
                .bind(subject_id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(Error::Database)?;
            return Err(Self::not_found(user_id, subject_id));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }
}
