//! Port definitions (trait seams) between core logic and adapters.
//!
//! The scanner and the scheduler live in `airouter-runtime`; core code
//! only sees them through these traits so either side can be faked.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{BackendModels, RegistrySnapshot};

/// Port for probing the configured backend range.
#[async_trait]
pub trait BackendScanPort: Send + Sync + fmt::Debug {
    /// Probe every configured port once and report the live backends.
    ///
    /// Probe failures are never returned as errors; a failing backend is
    /// simply missing from the result. Results are ordered by port.
    async fn scan(&self) -> Vec<BackendModels>;
}

/// Port for forcing an immediate rescan of the backend range.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RescanPort: Send + Sync + fmt::Debug {
    /// Run one full scan and publish it to the registry.
    ///
    /// Returns once the registry has been replaced, with the snapshot
    /// that was published.
    async fn rescan(&self) -> Arc<RegistrySnapshot>;
}
