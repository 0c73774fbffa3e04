//! Client configuration.

use std::time::Duration;

/// Default bound on one CMS round trip (30 seconds)
pub const DEFAULT_MUTATION_TIMEOUT_MS: u64 = 30_000;

/// Shown when a failure carries no readable message
pub const DEFAULT_GENERIC_ERROR: &str = "Something went wrong. Please try again.";

pub const MUTATION_TIMEOUT_ENV: &str = "COURSEMART_MUTATION_TIMEOUT_MS";
pub const GENERIC_ERROR_ENV: &str = "COURSEMART_GENERIC_ERROR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// A round trip still pending after this long is failed and rolled back
    pub mutation_timeout: Duration,

    /// Fallback text for error notices
    pub generic_error_message: String,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            mutation_timeout: Duration::from_millis(DEFAULT_MUTATION_TIMEOUT_MS),
            generic_error_message: DEFAULT_GENERIC_ERROR.to_string(),
        }
    }

    /// Defaults overridden by `COURSEMART_MUTATION_TIMEOUT_MS` and
    /// `COURSEMART_GENERIC_ERROR`. Unusable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(raw) = lookup(MUTATION_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.mutation_timeout = Duration::from_millis(ms),
                _ => tracing::warn!(
                    value = %raw,
                    "Ignoring invalid {}", MUTATION_TIMEOUT_ENV
                ),
            }
        }

        if let Some(message) = lookup(GENERIC_ERROR_ENV) {
            if !message.trim().is_empty() {
                config.generic_error_message = message;
            }
        }

        config
    }

    /// Set the round-trip timeout
    pub fn mutation_timeout(mut self, timeout: Duration) -> Self {
        self.mutation_timeout = timeout;
        self
    }

    /// Set the fallback error text
    pub fn generic_error_message(mut self, message: impl Into<String>) -> Self {
        self.generic_error_message = message.into();
        self
    }

    pub(crate) fn mutation_timeout_ms(&self) -> u64 {
        u64::try_from(self.mutation_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
