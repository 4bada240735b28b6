//! Core domain types and port definitions for airouter.
//!
//! This crate has no network I/O. It defines what a backend is, how the
//! model registry is published and read, and how an inbound model name is
//! resolved to a backend. Adapters (`airouter-runtime`, `airouter-proxy`)
//! plug into the traits in [`ports`].
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod services;
pub mod settings;

pub use domain::{BackendAddress, BackendModels, ModelEntry, ModelRegistry, RegistrySnapshot};
pub use ports::{BackendScanPort, RescanPort};
pub use services::{MatchKind, ModelResolver, ResolveError, Resolved};
pub use settings::{
    ConfigError, DEFAULT_BACKEND_HOST, DEFAULT_END_PORT, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_PROBE_TIMEOUT, DEFAULT_SCAN_INTERVAL, DEFAULT_START_PORT, RouterConfig,
};
