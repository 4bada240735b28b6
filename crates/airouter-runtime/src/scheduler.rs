//! Discovery scheduling: initial, periodic and on-demand scans.
//!
//! Scans are not serialized. If a periodic scan and an on-demand scan
//! overlap, whichever publishes last defines the registry, even if it
//! started first.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use airouter_core::{BackendScanPort, ModelRegistry, RegistrySnapshot, RescanPort};

/// Drives the scanner and publishes each completed scan to the registry.
#[derive(Debug, Clone)]
pub struct DiscoveryScheduler {
    scanner: Arc<dyn BackendScanPort>,
    registry: ModelRegistry,
    interval: Duration,
}

impl DiscoveryScheduler {
    /// Create a scheduler publishing into `registry` every `interval`.
    pub fn new(
        scanner: Arc<dyn BackendScanPort>,
        registry: ModelRegistry,
        interval: Duration,
    ) -> Self {
        Self {
            scanner,
            registry,
            interval,
        }
    }

    /// The registry this scheduler publishes into.
    #[must_use]
    pub const fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Run one full scan and replace the registry with its result.
    pub async fn run_scan(&self) -> Arc<RegistrySnapshot> {
        let results = self.scanner.scan().await;
        let published = self.registry.replace(RegistrySnapshot::from_scan(results));
        info!(
            models = published.len(),
            "Scan complete. Registered {} models",
            published.len()
        );
        published
    }

    /// Spawn the background rescan loop.
    ///
    /// The first scan happens one interval from now (the initial scan is
    /// the caller's job). The loop exits when `cancel` fires; a scan that
    /// is in flight at that point is dropped without publishing.
    pub fn start_periodic(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let scheduler = self.clone();

        tokio::spawn(async move {
            let period = scheduler.interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!(interval = ?period, "Starting periodic discovery");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = scheduler.run_scan() => {}
                            () = cancel.cancelled() => break,
                        }
                    }
                    () = cancel.cancelled() => break,
                }
            }

            debug!("Periodic discovery cancelled");
        })
    }
}

#[async_trait]
impl RescanPort for DiscoveryScheduler {
    async fn rescan(&self) -> Arc<RegistrySnapshot> {
        debug!("On-demand rescan requested");
        self.run_scan().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use airouter_core::{BackendAddress, BackendModels};

    fn backend(port: u16, id: &str) -> BackendModels {
        BackendModels {
            address: BackendAddress::new("localhost", port),
            model_ids: vec![id.to_string()],
        }
    }

    /// Scanner returning queued results, each after its own delay.
    #[derive(Debug, Default)]
    struct ScriptedScanner {
        script: Mutex<VecDeque<(Duration, Vec<BackendModels>)>>,
        calls: AtomicUsize,
    }

    impl ScriptedScanner {
        fn push(&self, delay: Duration, results: Vec<BackendModels>) {
            self.script.lock().unwrap().push_back((delay, results));
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BackendScanPort for ScriptedScanner {
        async fn scan(&self) -> Vec<BackendModels> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some((delay, results)) => {
                    tokio::time::sleep(delay).await;
                    results
                }
                None => Vec::new(),
            }
        }
    }

    fn scheduler(scanner: &Arc<ScriptedScanner>, interval: Duration) -> DiscoveryScheduler {
        DiscoveryScheduler::new(scanner.clone(), ModelRegistry::new(), interval)
    }

    #[tokio::test]
    async fn test_run_scan_publishes_snapshot() {
        let scanner = Arc::new(ScriptedScanner::default());
        scanner.push(Duration::ZERO, vec![backend(8081, "modelA"), backend(8083, "modelB")]);
        let scheduler = scheduler(&scanner, Duration::from_secs(60));

        let published = scheduler.run_scan().await;

        assert_eq!(published.model_ids(), vec!["modelA", "modelB"]);
        assert_eq!(
            scheduler.registry().lookup("modelB").map(|a| a.port()),
            Some(8083)
        );
    }

    #[tokio::test]
    async fn test_rescan_replaces_previous_snapshot() {
        let scanner = Arc::new(ScriptedScanner::default());
        scanner.push(Duration::ZERO, vec![backend(8081, "gone")]);
        scanner.push(Duration::ZERO, vec![backend(8082, "fresh")]);
        let scheduler = scheduler(&scanner, Duration::from_secs(60));

        scheduler.run_scan().await;
        let published = scheduler.rescan().await;

        assert_eq!(published.model_ids(), vec!["fresh"]);
        assert!(scheduler.registry().lookup("gone").is_none());
        assert_eq!(scanner.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_scan_runs_every_interval_until_cancelled() {
        let scanner = Arc::new(ScriptedScanner::default());
        let scheduler = scheduler(&scanner, Duration::from_secs(60));
        let cancel = CancellationToken::new();

        let handle = scheduler.start_periodic(cancel.clone());

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(scanner.calls(), 0, "no scan before the first interval");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(scanner.calls(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(scanner.calls(), 2);

        cancel.cancel();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(scanner.calls(), 2, "no scans after cancellation");
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_scans_last_publish_wins() {
        let scanner = Arc::new(ScriptedScanner::default());
        // Started first but finishes last.
        scanner.push(Duration::from_secs(5), vec![backend(8081, "slow")]);
        scanner.push(Duration::from_secs(1), vec![backend(8082, "fast")]);
        let scheduler = scheduler(&scanner, Duration::from_secs(60));

        let slow = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run_scan().await })
        };
        tokio::task::yield_now().await;
        let fast = scheduler.rescan().await;
        assert_eq!(fast.model_ids(), vec!["fast"]);
        assert_eq!(scheduler.registry().snapshot().model_ids(), vec!["fast"]);

        slow.await.unwrap();
        assert_eq!(scheduler.registry().snapshot().model_ids(), vec!["slow"]);
    }

    #[tokio::test]
    async fn test_readers_see_previous_snapshot_during_scan() {
        let scanner = Arc::new(ScriptedScanner::default());
        scanner.push(Duration::ZERO, vec![backend(8081, "m")]);
        scanner.push(Duration::from_millis(200), vec![backend(8082, "m")]);
        let scheduler = scheduler(&scanner, Duration::from_secs(60));
        scheduler.run_scan().await;

        let in_flight = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run_scan().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The slow scan has not published yet; the old snapshot is intact.
        assert_eq!(
            scheduler.registry().lookup("m").map(|a| a.port()),
            Some(8081)
        );

        in_flight.await.unwrap();
        assert_eq!(
            scheduler.registry().lookup("m").map(|a| a.port()),
            Some(8082)
        );
    }
}
