//! Model registry: the published mapping from model id to backend.
//!
//! A [`RegistrySnapshot`] is built completely from one scan and then
//! published through [`ModelRegistry::replace`], which swaps a single
//! `Arc`. Readers clone the current `Arc` and work on that snapshot, so
//! they never see a half-built map and never wait for a scan.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;

use super::backend::{BackendAddress, BackendModels, ModelEntry};

/// Immutable result of one completed scan.
///
/// Entries keep the order in which ids were first seen. When two backends
/// report the same id, the later one replaces the address in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    entries: Vec<ModelEntry>,
    index: HashMap<String, usize>,
}

impl RegistrySnapshot {
    /// An empty snapshot (the state before the first scan).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from probe results, in the order given.
    pub fn from_scan<I>(results: I) -> Self
    where
        I: IntoIterator<Item = BackendModels>,
    {
        let mut snapshot = Self::default();
        for backend in results {
            for model_id in backend.model_ids {
                snapshot.insert(model_id, backend.address.clone());
            }
        }
        snapshot
    }

    fn insert(&mut self, model_id: String, address: BackendAddress) {
        if let Some(&pos) = self.index.get(&model_id) {
            self.entries[pos].address = address;
        } else {
            self.index.insert(model_id.clone(), self.entries.len());
            self.entries.push(ModelEntry { model_id, address });
        }
    }

    /// Exact lookup by model id.
    #[must_use]
    pub fn lookup(&self, model_id: &str) -> Option<&BackendAddress> {
        self.index
            .get(model_id)
            .map(|&pos| &self.entries[pos].address)
    }

    /// All entries in enumeration order.
    #[must_use]
    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Known model ids in enumeration order.
    #[must_use]
    pub fn model_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.model_id.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared handle to the current [`RegistrySnapshot`].
///
/// Cloning the handle is cheap; all clones publish to and read from the
/// same slot. Whichever `replace` call lands last is what readers see.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    current: Arc<watch::Sender<Arc<RegistrySnapshot>>>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// Create a registry holding an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::with_snapshot(RegistrySnapshot::empty())
    }

    /// Create a registry pre-populated with `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: RegistrySnapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(snapshot));
        Self {
            current: Arc::new(tx),
        }
    }

    /// Atomically publish a new snapshot, returning the published `Arc`.
    pub fn replace(&self, snapshot: RegistrySnapshot) -> Arc<RegistrySnapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.current.borrow())
    }

    /// Exact lookup against the current snapshot.
    #[must_use]
    pub fn lookup(&self, model_id: &str) -> Option<BackendAddress> {
        self.current.borrow().lookup(model_id).cloned()
    }

    /// Full listing of the current snapshot.
    #[must_use]
    pub fn all_entries(&self) -> Vec<ModelEntry> {
        self.current.borrow().entries().to_vec()
    }

    /// Receiver notified on every `replace`.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<RegistrySnapshot>> {
        self.current.subscribe()
    }
}
