//! Error types for tutor.

use thiserror::Error;

/// Result type alias using tutor's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tutor operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Notification not found
    #[error("Notification not found: {0}")]
    NotificationNotFound(i64),

    /// Invalid input (unparseable identifiers, empty titles)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation conflicts with in-flight work
    #[error("Conflict: {0}")]
    Conflict(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::NotificationNotFound(_))
    }

    /// Whether this error was raised before any store access.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_notification_not_found() {
        let err = Error::NotificationNotFound(42);
        assert_eq!(err.to_string(), "Notification not found: 42");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("user id 'abc' is not an integer".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input: user id 'abc' is not an integer"
        );
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("subject 3 is polling".to_string());
        assert_eq!(err.to_string(), "Conflict: subject 3 is polling");
    }

    #[test]
    fn test_error_display_request() {
        let err = Error::Request("network unreachable".to_string());
        assert_eq!(err.to_string(), "Request error: network unreachable");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound("x".into()).is_not_found());
        assert!(Error::NotificationNotFound(1).is_not_found());
        assert!(!Error::InvalidInput("x".into()).is_not_found());
        assert!(!Error::Database(sqlx::Error::RowNotFound).is_not_found());
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::InvalidInput("x".into()).is_validation());
        assert!(!Error::NotificationNotFound(1).is_validation());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
