//! PostgreSQL pool setup.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use tutor_core::{defaults, Error, Result};

/// Sizing and timeouts for the sqlx pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::DB_MAX_CONNECTIONS,
            min_connections: defaults::DB_MIN_CONNECTIONS,
            acquire_timeout: Duration::from_secs(defaults::DB_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(defaults::DB_IDLE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    /// Read `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS` and
    /// `DB_ACQUIRE_TIMEOUT_SECS`, keeping defaults for anything unset or
    /// unparseable. The minimum never exceeds the maximum.
    pub fn from_env() -> Self {
        fn var<T: std::str::FromStr>(name: &str) -> Option<T> {
            std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
        }

        let base = Self::default();
        let max_connections = var::<u32>("DB_MAX_CONNECTIONS")
            .unwrap_or(base.max_connections)
            .max(1);
        let min_connections = var::<u32>("DB_MIN_CONNECTIONS")
            .unwrap_or(base.min_connections)
            .min(max_connections);
        let acquire_timeout = var::<u64>("DB_ACQUIRE_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(base.acquire_timeout);

        Self {
            max_connections,
            min_connections,
            acquire_timeout,
            ..base
        }
    }

    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn with_min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Strip credentials from a connection URL before it is logged.
fn redact(database_url: &str) -> String {
    match (database_url.find("://"), database_url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &database_url[..scheme_end], &database_url[at + 1..])
        }
        _ => database_url.to_string(),
    }
}

/// Connect with the default pool settings.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    debug!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        url = %redact(database_url),
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(database_url)
        .await
        .map_err(|e| {
            warn!(
                subsystem = "db",
                component = "pool",
                url = %redact(database_url),
                error = %e,
                "PostgreSQL connection failed"
            );
            Error::Database(e)
        })?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "PostgreSQL pool ready"
    );
    Ok(pool)
}

/// Log pool occupancy. Warns when every connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();
    if size > 0 && idle == 0 {
        warn!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            "All pooled connections are in use"
        );
    } else {
        debug!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            pool_idle = idle,
            "Pool occupancy"
        );
    }
}
