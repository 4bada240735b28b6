//! CLI-specific error types and exit codes.

use airouter_core::ConfigError;
use airouter_runtime::SupervisorError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Router could not bind its listen address.
    #[error("{0}")]
    Bind(String),

    /// Router failed while starting, running or stopping.
    #[error("Router error: {0}")]
    Router(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78, // EX_CONFIG
            Self::Bind(_) => 69,   // EX_UNAVAILABLE
            Self::Router(_) => 1,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::InvalidConfig(e) => Self::from(e),
            SupervisorError::BindFailed { .. } => Self::Bind(err.to_string()),
            other => Self::Router(other.to_string()),
        }
    }
}
