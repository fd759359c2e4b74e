/*
[INPUT]:  Network configuration (bootstrap nodes, relay, RPC, timeouts)
[OUTPUT]: Memoized node-quorum connection and a configured reqwest client
[POS]:    HTTP layer - core threshold-network client
[UPDATE]: When connection semantics or endpoint layout change
*/

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::http::{PkpAuthError, Result};
use crate::types::{HandshakeRequest, HandshakeResponse};

/// Default bootstrap nodes for the threshold key-management network
const DEFAULT_BOOTSTRAP_URLS: &[&str] = &[
    "https://node-1.thresholdkey.network",
    "https://node-2.thresholdkey.network",
    "https://node-3.thresholdkey.network",
];
const DEFAULT_RELAY_URL: &str = "https://relay.thresholdkey.network";
const DEFAULT_RPC_URL: &str = "https://chain-rpc.thresholdkey.network";
const DEFAULT_PERMISSIONS_CONTRACT: &str = "0x60C1ddC8b9e38F730F0e7B70A2F84C1A98A69167";

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub bootstrap_urls: Vec<String>,
    pub relay_url: String,
    pub rpc_url: String,
    /// Address of the on-chain PKP permissions contract (scope reads)
    pub permissions_contract: String,
    /// Minimum node count required for a usable quorum
    pub min_node_count: usize,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bootstrap_urls: DEFAULT_BOOTSTRAP_URLS
                .iter()
                .map(|url| url.to_string())
                .collect(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            permissions_contract: DEFAULT_PERMISSIONS_CONTRACT.to_string(),
            min_node_count: 2,
            connect_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// A live connection to the network: the set of nodes that completed the
/// handshake within the quorum window.
#[derive(Debug, Clone)]
pub struct Connection {
    pub nodes: Vec<String>,
    pub connected_at: DateTime<Utc>,
}

/// Client for the threshold signing network.
///
/// Holds the single piece of shared mutable state in the engine: the
/// memoized connection. The slot mutex is held across the handshake so
/// concurrent initializers share one connection attempt instead of opening
/// N redundant quorum handshakes.
pub struct NetworkClient {
    http: Client,
    config: NetworkConfig,
    connection: tokio::sync::Mutex<Option<Arc<Connection>>>,
}

impl NetworkClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(NetworkConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: NetworkConfig) -> Result<Self> {
        if config.bootstrap_urls.is_empty() {
            return Err(PkpAuthError::Config(
                "at least one bootstrap node url is required".to_string(),
            ));
        }
        if config.min_node_count == 0 {
            return Err(PkpAuthError::Config(
                "min_node_count must be at least 1".to_string(),
            ));
        }
        for endpoint in config
            .bootstrap_urls
            .iter()
            .chain([&config.relay_url, &config.rpc_url])
        {
            url::Url::parse(endpoint)?;
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(PkpAuthError::Http)?;

        Ok(Self {
            http,
            config,
            connection: tokio::sync::Mutex::new(None),
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Connect to the network, reusing a live connection when present
    pub async fn connect(&self) -> Result<Arc<Connection>> {
        self.get_client().await
    }

    /// Lazy, memoized connection. A failed handshake leaves the memo slot
    /// empty so a later call retries cleanly.
    pub async fn get_client(&self) -> Result<Arc<Connection>> {
        let mut slot = self.connection.lock().await;
        if let Some(connection) = slot.as_ref() {
            return Ok(connection.clone());
        }
        let connection = self.handshake().await?;
        *slot = Some(connection.clone());
        Ok(connection)
    }

    /// Force a fresh connection, discarding the memoized one
    pub async fn reconnect(&self) -> Result<Arc<Connection>> {
        let mut slot = self.connection.lock().await;
        *slot = None;
        let connection = self.handshake().await?;
        *slot = Some(connection.clone());
        Ok(connection)
    }

    /// Handshake every bootstrap node concurrently; a usable connection
    /// needs `min_node_count` responders within `connect_timeout`.
    async fn handshake(&self) -> Result<Arc<Connection>> {
        let challenge = Uuid::new_v4().to_string();
        let attempts = self.config.bootstrap_urls.iter().map(|node| {
            let node = node.trim_end_matches('/').to_string();
            let challenge = challenge.clone();
            async move {
                let url = format!("{node}/web/handshake");
                let result: Result<HandshakeResponse> = self
                    .send_json(
                        self.http
                            .post(&url)
                            .json(&HandshakeRequest { challenge }),
                    )
                    .await;
                match result {
                    Ok(response) => {
                        debug!(node = %node, version = ?response.node_version, "handshake ok");
                        Some(node)
                    }
                    Err(e) => {
                        warn!(node = %node, error = %e, "handshake failed");
                        None
                    }
                }
            }
        });

        let timeout = self.config.connect_timeout;
        let nodes: Vec<String> = tokio::time::timeout(timeout, join_all(attempts))
            .await
            .map_err(|_| PkpAuthError::Timeout {
                duration: timeout.as_secs(),
            })?
            .into_iter()
            .flatten()
            .collect();

        if nodes.len() < self.config.min_node_count {
            return Err(PkpAuthError::NetworkUnavailable(format!(
                "{}/{} nodes answered the handshake (need {})",
                nodes.len(),
                self.config.bootstrap_urls.len(),
                self.config.min_node_count
            )));
        }

        debug!(nodes = nodes.len(), "network connection established");
        Ok(Arc::new(Connection {
            nodes,
            connected_at: Utc::now(),
        }))
    }

    /// Send a request and decode the JSON body, mapping non-2xx statuses to
    /// an API error carrying the response text.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PkpAuthError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}
