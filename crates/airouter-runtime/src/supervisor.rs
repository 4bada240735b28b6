//! Router supervisor for managing the discovery router lifecycle.
//!
//! The RouterSupervisor owns the running router internally, using
//! tokio::sync::Mutex for async-safe access. The binary (and tests) call
//! methods on the supervisor without storing handles themselves.
//!
//! Start-up order:
//! - **Bind-then-report**: TcpListener binds FIRST, then reports real address
//! - **Initial scan**: one full scan completes before the server accepts requests
//! - **Shared cancellation**: the scan loop and the HTTP server stop on one token
//! - **Crash detection**: status() uses the token to tell a clean stop from a crash

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result as AnyResult;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use airouter_core::{ConfigError, ModelRegistry, RescanPort, RouterConfig};

use crate::scanner::PortScanner;
use crate::scheduler::DiscoveryScheduler;

/// How long `stop()` waits for the server before aborting it.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running router.
struct RouterHandle {
    /// Cancellation token for graceful shutdown.
    cancel_token: CancellationToken,
    /// Join handle for the HTTP server task.
    server_handle: JoinHandle<AnyResult<()>>,
    /// Join handle for the periodic scan loop.
    scan_handle: JoinHandle<()>,
    /// Address the router is bound to.
    bound_addr: SocketAddr,
    /// Registry the router serves from.
    registry: ModelRegistry,
}

/// Status of the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterStatus {
    /// Router is not running.
    Stopped,
    /// Router is running and listening.
    Running {
        /// Address the router is listening on.
        address: SocketAddr,
    },
    /// Router started but its server finished unexpectedly (not via cancellation).
    Crashed,
}

impl fmt::Display for RouterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Running { address } => write!(f, "Running on {address}"),
            Self::Crashed => write!(f, "Crashed"),
        }
    }
}

/// Error from supervisor operations.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// Router is already running.
    #[error("Router is already running on {0}")]
    AlreadyRunning(SocketAddr),

    /// Configuration was rejected before anything started.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Failed to bind to address.
    #[error("Failed to bind to {address}: {reason}")]
    BindFailed { address: String, reason: String },

    /// Router is not running.
    #[error("Router is not running")]
    NotRunning,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Supervisor for the discovery router.
///
/// # Example
///
/// ```ignore
/// let supervisor = RouterSupervisor::new();
/// let addr = supervisor.start(RouterConfig::default()).await?;
/// println!("Status: {}", supervisor.status().await);
/// supervisor.stop().await?;
/// ```
pub struct RouterSupervisor {
    /// Internal state protected by async mutex.
    handle: Mutex<Option<RouterHandle>>,
    /// Serializes `start()` calls; held across bind and the initial scan.
    starting: Mutex<()>,
}

impl Default for RouterSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterSupervisor {
    /// Create a new RouterSupervisor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
            starting: Mutex::new(()),
        }
    }

    /// Start the router.
    ///
    /// Binds to the configured address FIRST, runs the initial scan, then
    /// spawns the periodic scan loop and the HTTP server.
    ///
    /// The state lock is not held during bind or the initial scan, so
    /// `status()` and friends keep answering (`Stopped`) while a start is in
    /// progress. A second `start()` waits for the first to finish.
    ///
    /// # Errors
    ///
    /// Returns error if the config is invalid, the router is already
    /// running, or the bind fails.
    pub async fn start(&self, config: RouterConfig) -> Result<SocketAddr, SupervisorError> {
        config.validate()?;

        let _starting = self.starting.lock().await;

        // Check if there's an existing handle
        let previous = {
            let mut guard = self.handle.lock().await;
            match guard.take() {
                Some(old) if !old.server_handle.is_finished() => {
                    let addr = old.bound_addr;
                    *guard = Some(old);
                    return Err(SupervisorError::AlreadyRunning(addr));
                }
                other => other,
            }
        };
        if let Some(old) = previous {
            old.cancel_token.cancel();
            match old.server_handle.await {
                Ok(Ok(())) => debug!("Previous router task completed normally"),
                Ok(Err(e)) => warn!("Previous router task ended with error: {e}"),
                Err(e) => warn!("Previous router task panicked: {e}"),
            }
        }

        // Bind FIRST - get real address before spawning
        let bind_addr = config.bind_addr();
        let listener =
            TcpListener::bind(&bind_addr)
                .await
                .map_err(|e| SupervisorError::BindFailed {
                    address: bind_addr.clone(),
                    reason: e.to_string(),
                })?;

        let bound_addr = listener
            .local_addr()
            .map_err(|e| SupervisorError::Internal(format!("Failed to get local address: {e}")))?;

        info!("Router bound to {bound_addr}");

        let scanner = PortScanner::from_config(&config)
            .map_err(|e| SupervisorError::Internal(format!("Failed to build HTTP client: {e}")))?;
        let registry = ModelRegistry::new();
        let scheduler = Arc::new(DiscoveryScheduler::new(
            Arc::new(scanner),
            registry.clone(),
            config.scan_interval,
        ));

        // Registry is populated before the first request is accepted.
        scheduler.run_scan().await;

        let cancel_token = CancellationToken::new();
        let scan_handle = scheduler.start_periodic(cancel_token.clone());

        let cancel_clone = cancel_token.clone();
        let server_registry = registry.clone();
        let rescan: Arc<dyn RescanPort> = scheduler;

        let server_handle: JoinHandle<AnyResult<()>> = tokio::spawn(async move {
            debug!(addr = %bound_addr, "Router task starting");
            airouter_proxy::serve(listener, server_registry, rescan, cancel_clone).await
        });

        *self.handle.lock().await = Some(RouterHandle {
            cancel_token,
            server_handle,
            scan_handle,
            bound_addr,
            registry,
        });

        Ok(bound_addr)
    }

    /// Stop the router.
    ///
    /// Sends cancellation signal and waits for the server to finish.
    /// If it doesn't stop within 5 seconds, it will be aborted.
    ///
    /// # Errors
    ///
    /// Returns error if not running or if the server task panicked/errored.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let mut guard = self.handle.lock().await;

        let Some(handle) = guard.take() else {
            return Err(SupervisorError::NotRunning);
        };

        info!("Stopping router on {}", handle.bound_addr);

        handle.cancel_token.cancel();

        if let Err(e) = handle.scan_handle.await {
            warn!("Scan loop ended abnormally: {e}");
        }

        let mut join = handle.server_handle;

        match tokio::time::timeout(STOP_TIMEOUT, &mut join).await {
            Ok(Ok(Ok(()))) => {
                info!("Router stopped cleanly");
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                error!("Router task ended with error: {e}");
                Err(SupervisorError::Internal(format!("Router error: {e}")))
            }
            Ok(Err(join_err)) => {
                error!("Router task panicked: {join_err}");
                Err(SupervisorError::Internal(format!(
                    "Task panicked: {join_err}"
                )))
            }
            Err(_) => {
                // Timed out - abort the task (we still own it)
                warn!("Router stop timed out; aborting task");
                join.abort();
                Err(SupervisorError::Internal(
                    "Router stop timed out; task aborted".into(),
                ))
            }
        }
    }

    /// Get the current status of the router.
    ///
    /// - Clean stop (cancelled + finished) -> Stopped
    /// - Crash (not cancelled but finished) -> Crashed
    /// - Running (not finished) -> Running
    pub async fn status(&self) -> RouterStatus {
        let mut guard = self.handle.lock().await;

        let Some(handle) = guard.as_ref() else {
            return RouterStatus::Stopped;
        };

        if handle.server_handle.is_finished() {
            let was_cancelled = handle.cancel_token.is_cancelled();
            if let Some(finished) = guard.take() {
                finished.cancel_token.cancel();
            }

            if was_cancelled {
                RouterStatus::Stopped
            } else {
                warn!("Detected crashed router, cleaning up handle");
                RouterStatus::Crashed
            }
        } else {
            RouterStatus::Running {
                address: handle.bound_addr,
            }
        }
    }

    /// Get the bound address if running.
    pub async fn bound_address(&self) -> Option<SocketAddr> {
        let guard = self.handle.lock().await;
        guard
            .as_ref()
            .filter(|h| !h.server_handle.is_finished())
            .map(|h| h.bound_addr)
    }

    /// Registry of the running router, if any.
    pub async fn registry(&self) -> Option<ModelRegistry> {
        let guard = self.handle.lock().await;
        guard.as_ref().map(|h| h.registry.clone())
    }
}

impl fmt::Debug for RouterSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterSupervisor").finish()
    }
}
