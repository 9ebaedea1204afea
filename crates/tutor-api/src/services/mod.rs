//! Request-independent operations behind the HTTP handlers.
//!
//! Services take identifiers exactly as the caller sent them, validate them,
//! and only then touch the repositories.

pub mod generation;
pub mod notifications;

pub use generation::GenerationService;
pub use notifications::NotificationService;

use tracing::{error, warn};
use tutor_core::Error;

/// Log a failed operation at a level matching its cause.
pub(crate) fn log_failure(component: &'static str, op: &'static str, err: &Error) {
    match err {
        Error::Database(_) | Error::Internal(_) => error!(
            subsystem = "api",
            component,
            op,
            error = %err,
            "Storage operation failed"
        ),
        _ => warn!(
            subsystem = "api",
            component,
            op,
            error = %err,
            "Request rejected"
        ),
    }
}
