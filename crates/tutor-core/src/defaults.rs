//! Centralized default constants for tutor.
//!
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Category tag stored when the caller does not supply one.
pub const NOTIFICATION_TYPE: &str = "info";

// =============================================================================
// GENERATION POLLING
// =============================================================================

/// Period between status checks for a subject being generated.
pub const GENERATION_POLL_INTERVAL_MS: u64 = 5_000;

/// Ceiling after which polling for a subject gives up.
pub const GENERATION_POLL_TIMEOUT_SECS: u64 = 300;

/// Consecutive failed status fetches tolerated before a subject is failed.
pub const GENERATION_POLL_MAX_ERRORS: u32 = 3;

/// Timeout for a single HTTP request from the generation client.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Capacity of the poller event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default API base URL used by clients.
pub const API_URL: &str = "http://localhost:3000";

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/tutor";

// =============================================================================
// DATABASE POOL
// =============================================================================

/// Pool size ceiling.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Connections kept open while idle.
pub const DB_MIN_CONNECTIONS: u32 = 1;

/// Seconds to wait for a pooled connection.
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Seconds before an idle connection is closed.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;
