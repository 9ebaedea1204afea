//! Structured logging field name constants for tutor.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue (failed poll tick, rejected request) |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | Per-item iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the HTTP request.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "poller", "render"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "notifications", "generation", "pool", "http_client"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "mark_all_read", "fetch_status"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Owning user id.
pub const USER_ID: &str = "user_id";

/// Notification id being operated on.
pub const NOTIFICATION_ID: &str = "notification_id";

/// Subject id whose content is generated.
pub const SUBJECT_ID: &str = "subject_id";

/// Generation status value.
pub const STATUS: &str = "status";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned or affected.
pub const RESULT_COUNT: &str = "result_count";

/// Number of status fetches performed for a subject.
pub const FETCH_COUNT: &str = "fetch_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
