//! Router configuration and validation.
//!
//! Values are fixed at process start; nothing here is persisted.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Default bind host for the router.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port for the router.
pub const DEFAULT_PORT: u16 = 8000;

/// Default host backends are probed on.
pub const DEFAULT_BACKEND_HOST: &str = "localhost";

/// First port of the default backend range.
pub const DEFAULT_START_PORT: u16 = 8081;

/// Last port (inclusive) of the default backend range.
pub const DEFAULT_END_PORT: u16 = 8099;

/// Default time between background rescans.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60);

/// Default timeout for a single `/v1/models` probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration for the discovery router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to bind to (0 for auto-assign).
    pub port: u16,
    /// Host the backends listen on.
    pub backend_host: String,
    /// First backend port to probe.
    pub start_port: u16,
    /// Last backend port to probe (inclusive).
    pub end_port: u16,
    /// Interval between background rescans.
    pub scan_interval: Duration,
    /// Timeout for each probe.
    pub probe_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend_host: DEFAULT_BACKEND_HOST.to_string(),
            start_port: DEFAULT_START_PORT,
            end_port: DEFAULT_END_PORT,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl RouterConfig {
    /// The backend port range as an inclusive range.
    #[must_use]
    pub const fn port_range(&self) -> RangeInclusive<u16> {
        self.start_port..=self.end_port
    }

    /// Address string the router binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the configuration for values the router cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_port > self.end_port {
            return Err(ConfigError::InvalidPortRange {
                start: self.start_port,
                end: self.end_port,
            });
        }
        if self.scan_interval.is_zero() {
            return Err(ConfigError::ZeroScanInterval);
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroProbeTimeout);
        }
        if self.backend_host.trim().is_empty() {
            return Err(ConfigError::EmptyBackendHost);
        }
        Ok(())
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Backend port range is empty: start {start} is greater than end {end}")]
    InvalidPortRange { start: u16, end: u16 },

    #[error("Scan interval must be greater than zero")]
    ZeroScanInterval,

    #[error("Probe timeout must be greater than zero")]
    ZeroProbeTimeout,

    #[error("Backend host cannot be empty")]
    EmptyBackendHost,
}
