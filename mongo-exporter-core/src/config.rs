//! Connection configuration.
//!
//! Timeouts bound every connection attempt so a caller is never blocked
//! indefinitely on an unreachable or misconfigured target.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default connection-establishment timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default server-selection timeout.
pub const DEFAULT_SERVER_SELECTION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default bound on concurrent document-count requests.
pub const DEFAULT_COUNT_CONCURRENCY: usize = 8;

/// Upper bound accepted for any timeout, in milliseconds.
const MAX_TIMEOUT_MS: u64 = 300_000;

/// Configuration for transient engine connections.
///
/// # Security
/// This struct never holds the connection string; credentials live only in
/// [`crate::ConnectionTarget`].
///
/// # Example
/// ```rust
/// use mongo_exporter_core::ConnectionConfig;
/// use std::time::Duration;
///
/// let config = ConnectionConfig::new()
///     .with_connect_timeout(Duration::from_secs(2))
///     .with_count_concurrency(4);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Connection-establishment timeout
    pub connect_timeout: Duration,
    /// Server-selection timeout
    pub server_selection_timeout: Duration,
    /// Maximum number of document counts in flight while enumerating
    pub count_concurrency: usize,
    /// Application name reported to the server
    pub app_name: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            server_selection_timeout: DEFAULT_SERVER_SELECTION_TIMEOUT,
            count_concurrency: DEFAULT_COUNT_CONCURRENCY,
            app_name: format!("mongo-exporter-{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ConnectionConfig {
    /// Creates a config with the default timeouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the connection-establishment timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the server-selection timeout.
    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = timeout;
        self
    }

    /// Builder method to set the count concurrency.
    pub fn with_count_concurrency(mut self, concurrency: usize) -> Self {
        self.count_concurrency = concurrency;
        self
    }

    /// Validates configuration parameters.
    ///
    /// # Errors
    /// Returns error if a timeout is zero or above five minutes, or if the
    /// count concurrency is outside `1..=64`.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, timeout) in [
            ("connect_timeout", self.connect_timeout),
            ("server_selection_timeout", self.server_selection_timeout),
        ] {
            if timeout.is_zero() {
                return Err(crate::error::ExportError::configuration(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
            if timeout > Duration::from_millis(MAX_TIMEOUT_MS) {
                return Err(crate::error::ExportError::configuration(format!(
                    "{} must not exceed {} ms",
                    name, MAX_TIMEOUT_MS
                )));
            }
        }

        if !(1..=64).contains(&self.count_concurrency) {
            return Err(crate::error::ExportError::configuration(
                "count_concurrency must be between 1 and 64",
            ));
        }

        Ok(())
    }

    /// Picks the timeout a connection string supplies when it is in range,
    /// otherwise the configured one.
    ///
    /// Values of zero or above five minutes are ignored.
    pub fn prefer_url_timeout(from_url: Option<Duration>, configured: Duration) -> Duration {
        from_url
            .filter(|timeout| {
                !timeout.is_zero() && *timeout <= Duration::from_millis(MAX_TIMEOUT_MS)
            })
            .unwrap_or(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_default() {
        let config = ConnectionConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_millis(5000));
        assert_eq!(config.server_selection_timeout, Duration::from_millis(5000));
        assert_eq!(config.count_concurrency, 8);
        assert!(config.app_name.starts_with("mongo-exporter-"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connection_config_validation() {
        let config = ConnectionConfig::new().with_connect_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = ConnectionConfig::new().with_server_selection_timeout(Duration::from_secs(301));
        assert!(config.validate().is_err());

        let config = ConnectionConfig::new().with_count_concurrency(0);
        assert!(config.validate().is_err());

        let config = ConnectionConfig::new().with_count_concurrency(65);
        assert!(config.validate().is_err());

        // Sub-second timeouts are valid
        let config = ConnectionConfig::new().with_connect_timeout(Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prefer_url_timeout() {
        let configured = Duration::from_millis(5000);

        assert_eq!(
            ConnectionConfig::prefer_url_timeout(Some(Duration::from_millis(1500)), configured),
            Duration::from_millis(1500)
        );
        assert_eq!(ConnectionConfig::prefer_url_timeout(None, configured), configured);
    }

    #[test]
    fn test_prefer_url_timeout_ignores_out_of_range_values() {
        let configured = Duration::from_millis(5000);

        assert_eq!(
            ConnectionConfig::prefer_url_timeout(Some(Duration::ZERO), configured),
            configured
        );
        assert_eq!(
            ConnectionConfig::prefer_url_timeout(Some(Duration::from_secs(301)), configured),
            configured
        );
    }
}
