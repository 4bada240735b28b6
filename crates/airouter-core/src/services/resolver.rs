//! Model name resolution.
//!
//! Resolution order, stopping at the first hit:
//! 1. exact id in the current snapshot
//! 2. substring match in either direction, first in enumeration order
//! 3. forced rescan, then exact id again (no second fuzzy pass)

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{BackendAddress, ModelRegistry, RegistrySnapshot};
use crate::ports::RescanPort;

/// How a requested id was matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    /// Substring match against a registered id.
    Fuzzy { matched_id: String },
    /// Exact match found only after a forced rescan.
    AfterRescan,
}

/// A successfully resolved model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub address: BackendAddress,
    pub kind: MatchKind,
}

/// Errors from model resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No backend serves the requested model, even after a rescan.
    #[error("Model '{model}' not found. Available: {available:?}")]
    NotFound {
        model: String,
        available: Vec<String>,
    },
}

/// Resolves inbound model ids to backends.
///
/// Holds no state of its own beyond handles to the registry and the
/// rescan trigger.
#[derive(Debug, Clone)]
pub struct ModelResolver {
    registry: ModelRegistry,
    rescan: Arc<dyn RescanPort>,
}

impl ModelResolver {
    pub fn new(registry: ModelRegistry, rescan: Arc<dyn RescanPort>) -> Self {
        Self { registry, rescan }
    }

    /// Resolve `model_id`, rescanning once if nothing matches.
    pub async fn resolve(&self, model_id: &str) -> Result<Resolved, ResolveError> {
        let snapshot = self.registry.snapshot();

        if let Some(address) = snapshot.lookup(model_id) {
            return Ok(Resolved {
                address: address.clone(),
                kind: MatchKind::Exact,
            });
        }

        if let Some((matched_id, address)) = fuzzy_match(&snapshot, model_id) {
            info!(
                model = %model_id,
                matched = %matched_id,
                backend = %address,
                "Fuzzy match"
            );
            return Ok(Resolved {
                address: address.clone(),
                kind: MatchKind::Fuzzy {
                    matched_id: matched_id.to_string(),
                },
            });
        }

        debug!(model = %model_id, "No match in registry, forcing rescan");
        self.rescan.rescan().await;

        // Another scan may have published after ours; read the registry.
        let current = self.registry.snapshot();
        match current.lookup(model_id) {
            Some(address) => Ok(Resolved {
                address: address.clone(),
                kind: MatchKind::AfterRescan,
            }),
            None => Err(ResolveError::NotFound {
                model: model_id.to_string(),
                available: current.model_ids(),
            }),
        }
    }
}

/// First registered id that contains, or is contained in, `requested`.
pub(crate) fn fuzzy_match<'a>(
    snapshot: &'a RegistrySnapshot,
    requested: &str,
) -> Option<(&'a str, &'a BackendAddress)> {
    snapshot
        .entries()
        .iter()
        .find(|e| e.model_id.contains(requested) || requested.contains(e.model_id.as_str()))
        .map(|e| (e.model_id.as_str(), &e.address))
}
