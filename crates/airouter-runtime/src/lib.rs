//! Network-facing runtime for airouter.
//!
//! - [`PortScanner`] probes the backend port range
//! - [`DiscoveryScheduler`] publishes scans into the registry, on a timer
//!   and on demand
//! - [`RouterSupervisor`] owns a running router (listener, scan loop and
//!   HTTP server) and shuts it down
#![deny(unsafe_code)]

pub mod scanner;
pub mod scheduler;
pub mod supervisor;

pub use scanner::PortScanner;
pub use scheduler::DiscoveryScheduler;
pub use supervisor::{RouterStatus, RouterSupervisor, SupervisorError};
