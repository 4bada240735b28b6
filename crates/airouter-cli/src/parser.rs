//! Main CLI parser.
//!
//! Every option can also come from an `AIROUTER_*` environment variable
//! (a `.env` file is loaded first). Defaults match a stock deployment:
//! router on 0.0.0.0:8000, backends on localhost:8081-8099.

use std::time::Duration;

use clap::Parser;

use airouter_core::{
    DEFAULT_BACKEND_HOST, DEFAULT_END_PORT, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROBE_TIMEOUT,
    DEFAULT_SCAN_INTERVAL, DEFAULT_START_PORT, RouterConfig,
};

const DEFAULT_SCAN_INTERVAL_SECS: u64 = DEFAULT_SCAN_INTERVAL.as_secs();
#[allow(clippy::cast_possible_truncation)]
const DEFAULT_PROBE_TIMEOUT_MS: u64 = DEFAULT_PROBE_TIMEOUT.as_millis() as u64;

/// Discovery router for local OpenAI-compatible inference backends.
#[derive(Debug, Parser)]
#[command(name = "airouter")]
#[command(about = "Route OpenAI-style requests to whichever local backend serves the model")]
#[command(version)]
pub struct Cli {
    /// Host to bind the router to
    #[arg(long, env = "AIROUTER_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind the router to
    #[arg(short, long, env = "AIROUTER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host the backends listen on
    #[arg(long, env = "AIROUTER_BACKEND_HOST", default_value = DEFAULT_BACKEND_HOST)]
    pub backend_host: String,

    /// First backend port to probe
    #[arg(long, env = "AIROUTER_START_PORT", default_value_t = DEFAULT_START_PORT)]
    pub start_port: u16,

    /// Last backend port to probe (inclusive)
    #[arg(long, env = "AIROUTER_END_PORT", default_value_t = DEFAULT_END_PORT)]
    pub end_port: u16,

    /// Seconds between background rescans
    #[arg(long, env = "AIROUTER_SCAN_INTERVAL", default_value_t = DEFAULT_SCAN_INTERVAL_SECS)]
    pub scan_interval: u64,

    /// Per-probe timeout in milliseconds
    #[arg(long, env = "AIROUTER_PROBE_TIMEOUT_MS", default_value_t = DEFAULT_PROBE_TIMEOUT_MS)]
    pub probe_timeout_ms: u64,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Build the router configuration from parsed arguments.
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            host: self.host.clone(),
            port: self.port,
            backend_host: self.backend_host.clone(),
            start_port: self.start_port,
            end_port: self.end_port,
            scan_interval: Duration::from_secs(self.scan_interval),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
        }
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub const fn default_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
