//! Backend discovery by probing a port range.
//!
//! Every port in the range gets one `GET /v1/models` probe, all in
//! parallel. A backend counts as present only if it answers 200 with a
//! `data` array of objects carrying an `id`. Anything else (refused
//! connection, timeout, other status, malformed JSON) means the port is
//! absent for this scan; probe failures are logged, never returned.

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use airouter_core::{BackendAddress, BackendModels, BackendScanPort, RouterConfig};

/// Body of a backend's `/v1/models` response (only what we read).
#[derive(Debug, Deserialize)]
struct ModelListing {
    data: Vec<ListedModel>,
}

#[derive(Debug, Deserialize)]
struct ListedModel {
    id: String,
}

/// Why a single probe found nothing.
#[derive(Debug, Error)]
enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("malformed model listing: {0}")]
    Malformed(#[source] reqwest::Error),
}

/// Probes a contiguous range of local ports for inference backends.
#[derive(Debug, Clone)]
pub struct PortScanner {
    client: Client,
    host: String,
    ports: RangeInclusive<u16>,
}

impl PortScanner {
    /// Create a scanner for `host` over `ports`.
    ///
    /// `probe_timeout` bounds each probe from connect to the end of the body.
    pub fn new(
        host: impl Into<String>,
        ports: RangeInclusive<u16>,
        probe_timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(probe_timeout).build()?;
        Ok(Self {
            client,
            host: host.into(),
            ports,
        })
    }

    /// Create a scanner from the router configuration.
    pub fn from_config(config: &RouterConfig) -> reqwest::Result<Self> {
        Self::new(
            config.backend_host.clone(),
            config.port_range(),
            config.probe_timeout,
        )
    }

    /// Probe one port and return the model ids it serves.
    async fn probe(&self, port: u16) -> Result<Vec<String>, ProbeError> {
        let url = format!(
            "{}/v1/models",
            BackendAddress::new(self.host.clone(), port).base_url()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProbeError::Request)?;

        if response.status() != StatusCode::OK {
            return Err(ProbeError::Status(response.status()));
        }

        let listing: ModelListing = response.json().await.map_err(ProbeError::Malformed)?;
        Ok(listing.data.into_iter().map(|m| m.id).collect())
    }

    /// Probe every port concurrently and collect the live backends.
    ///
    /// Completes when the slowest probe finishes or times out. Results are
    /// in port order and only include ports reporting at least one model.
    pub async fn scan(&self) -> Vec<BackendModels> {
        info!(
            host = %self.host,
            start = *self.ports.start(),
            end = *self.ports.end(),
            "Scanning for backends"
        );

        let probes = self.ports.clone().map(|port| async move {
            let outcome = self.probe(port).await;
            (port, outcome)
        });

        let mut found = Vec::new();
        for (port, outcome) in join_all(probes).await {
            match outcome {
                Ok(model_ids) if !model_ids.is_empty() => {
                    for model_id in &model_ids {
                        info!(port, model = %model_id, "Found {model_id} on port {port}");
                    }
                    found.push(BackendModels {
                        address: BackendAddress::new(self.host.clone(), port),
                        model_ids,
                    });
                }
                Ok(_) => debug!(port, "Backend reported no models"),
                Err(e) => debug!(port, "No backend: {e}"),
            }
        }
        found
    }
}

#[async_trait]
impl BackendScanPort for PortScanner {
    async fn scan(&self) -> Vec<BackendModels> {
        Self::scan(self).await
    }
}
