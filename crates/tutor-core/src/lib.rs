//! # tutor-core
//!
//! Core types, traits, and abstractions for the tutor backend and client.
//!
//! This crate provides the domain models, the error type and the repository
//! and client traits that the other tutor crates implement or consume.

pub mod defaults;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use ids::{parse_id, parse_notification_id, parse_subject_id, parse_user_id};
pub use models::*;
pub use traits::*;
