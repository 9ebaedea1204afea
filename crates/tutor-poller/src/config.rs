//! Poller and HTTP client configuration.

use std::time::Duration;

use tutor_core::defaults;

/// Timing limits for generation status polling.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between status checks, in milliseconds. Also the delay before the first check.
    pub poll_interval_ms: u64,
    /// Give up on a subject after this many seconds without a terminal status.
    pub timeout_secs: u64,
    /// Consecutive failed fetches tolerated before the subject is marked failed.
    pub max_consecutive_errors: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: defaults::GENERATION_POLL_INTERVAL_MS,
            timeout_secs: defaults::GENERATION_POLL_TIMEOUT_SECS,
            max_consecutive_errors: defaults::GENERATION_POLL_MAX_ERRORS,
        }
    }
}

impl PollerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `GENERATION_POLL_INTERVAL_MS` | `5000` | Delay between status checks |
    /// | `GENERATION_POLL_TIMEOUT_SECS` | `300` | Polling ceiling per subject |
    /// | `GENERATION_POLL_MAX_ERRORS` | `3` | Consecutive fetch failures tolerated |
    pub fn from_env() -> Self {
        let poll_interval_ms = std::env::var("GENERATION_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::GENERATION_POLL_INTERVAL_MS);

        let timeout_secs = std::env::var("GENERATION_POLL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::GENERATION_POLL_TIMEOUT_SECS);

        let max_consecutive_errors = std::env::var("GENERATION_POLL_MAX_ERRORS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults::GENERATION_POLL_MAX_ERRORS);

        Self {
            poll_interval_ms,
            timeout_secs,
            max_consecutive_errors,
        }
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max;
        self
    }

    /// Check period; never zero.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Consecutive failures that end monitoring: one past the tolerated count.
    pub fn error_limit(&self) -> u32 {
        self.max_consecutive_errors.saturating_add(1)
    }
}

/// Where the generation API lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_URL.to_string(),
            token: None,
            timeout_secs: defaults::HTTP_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Read `TUTOR_API_URL` and `TUTOR_API_TOKEN`. A blank token counts as none.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("TUTOR_API_URL").unwrap_or_else(|_| defaults::API_URL.to_string());
        let token = std::env::var("TUTOR_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Self {
            base_url,
            token,
            ..Default::default()
        }
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
