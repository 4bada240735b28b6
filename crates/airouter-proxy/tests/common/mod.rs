//! Shared helpers for airouter-proxy integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use airouter_core::{
    BackendAddress, BackendModels, ModelRegistry, RegistrySnapshot, RescanPort,
};

/// Host the fake backends bind to.
pub const TEST_HOST: &str = "127.0.0.1";

/// Serve `app` on an ephemeral local port and return the port.
pub async fn spawn_backend(app: Router) -> u16 {
    let listener = TcpListener::bind((TEST_HOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

/// A port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind((TEST_HOST, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Snapshot with one backend per `(port, model_id)` pair.
pub fn snapshot(entries: &[(u16, &str)]) -> RegistrySnapshot {
    RegistrySnapshot::from_scan(entries.iter().map(|(port, id)| BackendModels {
        address: BackendAddress::new(TEST_HOST, *port),
        model_ids: vec![(*id).to_string()],
    }))
}

/// Rescan trigger that publishes a fixed snapshot and counts calls.
#[derive(Debug)]
pub struct FakeRescan {
    registry: ModelRegistry,
    next: RegistrySnapshot,
    calls: AtomicUsize,
}

impl FakeRescan {
    /// A rescan that publishes `next` into `registry` each time it runs.
    pub fn publishing(registry: &ModelRegistry, next: RegistrySnapshot) -> Arc<Self> {
        Arc::new(Self {
            registry: registry.clone(),
            next,
            calls: AtomicUsize::new(0),
        })
    }

    /// A rescan that finds nothing.
    pub fn empty(registry: &ModelRegistry) -> Arc<Self> {
        Self::publishing(registry, RegistrySnapshot::empty())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RescanPort for FakeRescan {
    async fn rescan(&self) -> Arc<RegistrySnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.registry.replace(self.next.clone())
    }
}
