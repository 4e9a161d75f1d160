//! Retry configuration for automatic request retry.

use std::time::Duration;

/// Configuration for automatic retry behavior.
///
/// Controls how the client handles server errors (5xx), network errors and
/// expired sessions (401).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use b1_lib::retry::RetryConfig;
///
/// let config = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(500))
///     .max_delay(Duration::from_secs(60));
/// assert_eq!(config.max_retries, 5);
///
/// let no_retry = RetryConfig::no_retry();
/// assert!(!no_retry.retry_on_5xx);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Initial delay between retries (doubles each attempt).
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Whether to retry on HTTP 5xx.
    pub retry_on_5xx: bool,
    /// Whether to retry on network errors.
    pub retry_on_network: bool,
    /// Whether a 401 triggers one re-login and a retry.
    pub relogin_on_unauthorized: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            retry_on_5xx: true,
            retry_on_network: true,
            relogin_on_unauthorized: true,
        }
    }
}

impl RetryConfig {
    /// Creates a config with all retries disabled.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            retry_on_5xx: false,
            retry_on_network: false,
            relogin_on_unauthorized: false,
            ..Default::default()
        }
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn retry_on_5xx(mut self, enabled: bool) -> Self {
        self.retry_on_5xx = enabled;
        self
    }

    pub fn retry_on_network(mut self, enabled: bool) -> Self {
        self.retry_on_network = enabled;
        self
    }

    pub fn relogin_on_unauthorized(mut self, enabled: bool) -> Self {
        self.relogin_on_unauthorized = enabled;
        self
    }

    /// Returns the delay following `delay`, capped at `max_delay`.
    pub(crate) fn next_delay(&self, delay: Duration) -> Duration {
        (delay * 2).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(config.retry_on_5xx);
        assert!(config.relogin_on_unauthorized);
    }

    #[test]
    fn test_backoff_doubles_until_cap() {
        let config = RetryConfig::default()
            .initial_delay(Duration::from_secs(10))
            .max_delay(Duration::from_secs(25));
        let d1 = config.next_delay(config.initial_delay);
        assert_eq!(d1, Duration::from_secs(20));
        assert_eq!(config.next_delay(d1), Duration::from_secs(25));
    }
}
