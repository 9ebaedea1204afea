//! # tutor-poller
//!
//! Client side of content generation: trigger generation for a user's
//! subjects and follow each one until it completes, fails, or times out.
//!
//! - [`GenerationPoller`] runs one polling task per subject and publishes
//!   [`PollerEvent`]s.
//! - [`HttpGenerationClient`] talks to the tutoring API over HTTP.
//!
//! The poller only depends on the [`GenerationApi`](tutor_core::GenerationApi)
//! trait, so tests drive it with scripted clients.

pub mod client;
pub mod config;
pub mod poller;
pub mod state;

pub use client::HttpGenerationClient;
pub use config::{ClientConfig, PollerConfig};
pub use poller::{GenerationPoller, PollerEvent};
pub use state::{FailureReason, SubjectState, SubjectView};

pub use tutor_core::{Error, GenerationApi, GenerationState, GenerationStatus, Result};
