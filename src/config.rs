//! Configuration types and validation for the resolver.

use std::time::Duration;

use backon::ExponentialBuilder;
use thiserror::Error;
use url::Url;

use crate::constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_FACTOR, DEFAULT_RETRY_INITIAL_DELAY,
    DEFAULT_RETRY_MAX_DELAY,
};

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid URL format.
    #[error("invalid {field} URL: {reason}")]
    InvalidUrl {
        /// The field name that contains the invalid URL.
        field: &'static str,
        /// The reason the URL is invalid.
        reason: String,
    },
}

/// Validate that a URL has a scheme and host.
pub fn validate_url(url: &Url, field: &'static str) -> Result<(), ConfigError> {
    if url.scheme().is_empty() {
        return Err(ConfigError::InvalidUrl { field, reason: "missing scheme".to_string() });
    }

    if url.host().is_none() {
        return Err(ConfigError::InvalidUrl { field, reason: "missing host".to_string() });
    }

    Ok(())
}

/// Validated retry configuration for network operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, counting the initial invocation.
    pub max_attempts: u32,
    /// Initial delay for exponential backoff.
    pub initial_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_factor: f32,
    /// Whether to add random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_RETRY_INITIAL_DELAY,
            max_delay: DEFAULT_RETRY_MAX_DELAY,
            backoff_factor: DEFAULT_RETRY_FACTOR,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Sets the maximum number of attempts.
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the initial backoff delay.
    pub const fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Sets the maximum backoff delay.
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Disables delay jitter. Mostly useful in tests that assert timing.
    pub const fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Creates a `backon` [`ExponentialBuilder`] from this configuration.
    ///
    /// `max_attempts` counts invocations while the builder counts retries, so
    /// the builder is handed one less; at least one invocation always runs.
    pub fn to_backoff_builder(&self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.backoff_factor)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize);
        if self.jitter {
            builder = builder.with_jitter();
        }
        builder
    }
}
