//! # tutor-db
//!
//! PostgreSQL database layer for tutor.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for notifications and generation status
//! - In-memory repositories with identical semantics for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use tutor_db::{Database, NotificationRepository, CreateNotificationRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/tutor").await?;
//!
//!     let created = db
//!         .notifications
//!         .insert(CreateNotificationRequest::new(7, "Welcome", "Hi"))
//!         .await?;
//!
//!     println!("Created notification: {}", created.id);
//!     Ok(())
//! }
//! ```
pub mod generation;
pub mod memory;
pub mod notifications;
pub mod pool;

// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use tutor_core::*;

pub use generation::PgGenerationStatusRepository;
pub use memory::{MemoryGenerationStatusRepository, MemoryNotificationRepository};
pub use notifications::PgNotificationRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Notification repository.
    pub notifications: PgNotificationRepository,
    /// Generation status repository.
    pub generation: PgGenerationStatusRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notifications: PgNotificationRepository::new(pool.clone()),
            generation: PgGenerationStatusRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
