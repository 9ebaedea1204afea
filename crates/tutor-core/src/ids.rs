//! Identifier coercion for caller-supplied ids.
//!
//! Route parameters and request bodies carry ids as text. Every service
//! operation coerces them here before touching the store, so a malformed id
//! surfaces as [`Error::InvalidInput`] and never reaches the database.

use crate::error::{Error, Result};

/// Parse a caller-supplied identifier into an integer id.
///
/// Surrounding whitespace is ignored. Anything else that is not a plain
/// base-10 integer (empty strings, trailing garbage, floats, overflow) is
/// rejected; `label` names the id in the error message.
pub fn parse_id(label: &str, raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().map_err(|_| {
        Error::InvalidInput(format!("{} '{}' is not a valid integer id", label, raw))
    })
}

/// Parse a user id.
pub fn parse_user_id(raw: &str) -> Result<i64> {
    parse_id("user id", raw)
}

/// Parse a notification id.
pub fn parse_notification_id(raw: &str) -> Result<i64> {
    parse_id("notification id", raw)
}

/// Parse a subject id.
pub fn parse_subject_id(raw: &str) -> Result<i64> {
    parse_id("subject id", raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_integer() {
        assert_eq!(parse_user_id("7").unwrap(), 7);
        assert_eq!(parse_notification_id("1024").unwrap(), 1024);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_subject_id("  12 ").unwrap(), 12);
    }

    #[test]
    fn test_parse_negative_is_still_an_integer() {
        assert_eq!(parse_id("id", "-3").unwrap(), -3);
    }

    #[test]
    fn test_rejects_non_numeric() {
        let err = parse_user_id("abc").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("user id 'abc'"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(parse_notification_id("").unwrap_err().is_validation());
        assert!(parse_notification_id("   ").unwrap_err().is_validation());
    }

    #[test]
    fn test_rejects_trailing_garbage_and_floats() {
        assert!(parse_user_id("12abc").is_err());
        assert!(parse_user_id("1.5").is_err());
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(parse_user_id("99999999999999999999").is_err());
    }
}
