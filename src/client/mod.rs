//! Client module for the coordination store's keys API
//!
//! Provides the pieces the watch loop drives:
//! - [`KeysApi`] - Point read, long-poll watch and connection hygiene
//! - [`Client`] - HTTP implementation of [`KeysApi`]
//! - [`ClientBuilder`] - Configurable client construction
//! - [`Transport`] - Shared, injectable HTTP connection pool
//!
//! # Basic Usage
//! ```no_run
//! use watchlog::{Client, KeysApi};
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main(){
//!     let client = Client::builder(vec!["http://node1:2379".into()])
//!         .connect_timeout(Duration::from_secs(3))
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let response = client.get("/services").await.unwrap();
//!     println!("current index: {}", response.etcd_index);
//! }
//! ```

mod builder;
mod config;
mod error;
mod response;
mod transport;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use response::*;
pub use transport::*;

#[cfg(test)]
mod client_test;

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;
use url::Url;

use crate::constants::ETCD_INDEX_HEADER;
use crate::constants::KEYS_PREFIX;
use crate::constants::MEMBERS_PATH;
use crate::ClientError;
use crate::WatchCallError;

/// Operations the watch loop needs from the store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeysApi: Send + Sync + 'static {
    /// Non-watching read of `path`; the response carries the store's global index
    async fn get(
        &self,
        path: &str,
    ) -> std::result::Result<Response, ClientError>;

    /// Long-poll until a change at or after `index` is observed under `path`
    ///
    /// Returns [`WatchCallError::StoppedByUser`] once `stop` is cancelled.
    async fn raw_watch(
        &self,
        path: &str,
        index: u64,
        recursive: bool,
        stop: CancellationToken,
    ) -> std::result::Result<RawResponse, WatchCallError>;

    /// Drop every idle pooled connection of the underlying transport
    fn close_idle_connections(&self);
}

/// HTTP client for the store's v2 keys API
///
/// Created through the [`builder()`](Client::builder) method. Cheap to clone;
/// clones share endpoints and transport.
#[derive(Clone)]
pub struct Client {
    pub(super) inner: Arc<ClientInner>,
}

pub(super) struct ClientInner {
    pub(super) transport: Transport,
    /// Tried in order; the first member that answers is moved to the front
    pub(super) endpoints: ArcSwap<Vec<Url>>,
    pub(super) config: ClientConfig,
}

#[derive(Debug, Deserialize)]
struct MembersResponse {
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(default, rename = "clientURLs")]
    client_urls: Vec<String>,
}

impl Client {
    /// Create a configured client builder
    ///
    /// # Arguments
    /// * `endpoints` - Bootstrap store members, e.g. `http://127.0.0.1:2379`
    pub fn builder(endpoints: Vec<String>) -> ClientBuilder {
        ClientBuilder::new(endpoints)
    }

    /// Endpoints currently in use, preferred member first
    pub fn endpoints(&self) -> Vec<String> {
        self.inner.endpoints.load().iter().map(display_endpoint).collect()
    }

    pub fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Replace the endpoint list with the client URLs advertised by the cluster
    ///
    /// Members are probed in order; the first one that lists at least one
    /// client URL wins.
    pub async fn sync_cluster(&self) -> std::result::Result<(), ClientError> {
        let endpoints = self.inner.endpoints.load_full();
        for endpoint in endpoints.iter() {
            match self.fetch_members(endpoint).await {
                Ok(urls) if !urls.is_empty() => {
                    info!("cluster members discovered: {:?}", urls);
                    self.inner.endpoints.store(Arc::new(urls));
                    return Ok(());
                }
                Ok(_) => {
                    warn!("member list from {} carries no client urls", endpoint);
                }
                Err(e) => {
                    warn!("sync_cluster against {} failed: {:?}", endpoint, e);
                }
            }
        }
        Err(ClientError::ClusterUnreachable(self.endpoints().join(",")))
    }

    async fn fetch_members(
        &self,
        endpoint: &Url,
    ) -> std::result::Result<Vec<Url>, ClientError> {
        let url = api_url(endpoint, MEMBERS_PATH)?;
        let response = self
            .inner
            .transport
            .http()
            .get(url)
            .timeout(self.inner.config.request_timeout)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(ClientError::Status {
                endpoint: display_endpoint(endpoint),
                status,
            });
        }
        let body = response.bytes().await.map_err(|e| transport_error(endpoint, e))?;
        let members: MembersResponse = serde_json::from_slice(&body).map_err(|e| {
            ClientError::Decode(crate::DecodeError::Malformed {
                status,
                message: e.to_string(),
            })
        })?;

        let mut urls: Vec<Url> = Vec::new();
        for raw in members.members.iter().flat_map(|m| m.client_urls.iter()) {
            match parse_endpoint(raw) {
                Ok(url) if !urls.contains(&url) => urls.push(url),
                Ok(_) => {}
                Err(e) => warn!("ignoring advertised client url: {:?}", e),
            }
        }
        Ok(urls)
    }

    fn read_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("recursive", "false".to_string()), ("sorted", "false".to_string())];
        if self.inner.config.consistency == Consistency::Strong {
            params.push(("quorum", "true".to_string()));
        }
        params
    }

    fn watch_params(
        index: u64,
        recursive: bool,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("wait", "true".to_string()),
            ("waitIndex", index.to_string()),
            ("recursive", recursive.to_string()),
        ]
    }

    /// Issue the request against each endpoint until one answers below HTTP 500
    async fn send(
        &self,
        path: &str,
        params: &[(&'static str, String)],
        timeout: Option<Duration>,
    ) -> std::result::Result<RawResponse, ClientError> {
        let endpoints = self.inner.endpoints.load_full();
        let mut last_err = ClientError::NoEndpoints;
        for (position, endpoint) in endpoints.iter().enumerate() {
            match self.send_to(endpoint, path, params, timeout).await {
                Ok(raw) => {
                    if position > 0 {
                        self.promote(endpoint);
                    }
                    return Ok(raw);
                }
                Err(e) => {
                    debug!("request {} to {} failed: {:?}", path, endpoint, e);
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    async fn send_to(
        &self,
        endpoint: &Url,
        path: &str,
        params: &[(&'static str, String)],
        timeout: Option<Duration>,
    ) -> std::result::Result<RawResponse, ClientError> {
        let url = api_url(endpoint, &keys_path(path))?;
        let mut request = self.inner.transport.http().get(url).query(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| transport_error(endpoint, e))?;
        let status = response.status().as_u16();
        if response.status().is_server_error() {
            return Err(ClientError::Status {
                endpoint: display_endpoint(endpoint),
                status,
            });
        }
        let etcd_index = response
            .headers()
            .get(ETCD_INDEX_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let body = response.bytes().await.map_err(|e| transport_error(endpoint, e))?;

        Ok(RawResponse {
            status,
            etcd_index,
            body,
        })
    }

    fn promote(
        &self,
        endpoint: &Url,
    ) {
        self.inner.endpoints.rcu(|current| {
            let mut reordered = current.as_ref().clone();
            if let Some(position) = reordered.iter().position(|u| u == endpoint) {
                let preferred = reordered.remove(position);
                reordered.insert(0, preferred);
            }
            reordered
        });
    }
}

#[async_trait]
impl KeysApi for Client {
    async fn get(
        &self,
        path: &str,
    ) -> std::result::Result<Response, ClientError> {
        let raw = self
            .send(path, &self.read_params(), Some(self.inner.config.request_timeout))
            .await?;
        Ok(raw.unmarshal()?)
    }

    async fn raw_watch(
        &self,
        path: &str,
        index: u64,
        recursive: bool,
        stop: CancellationToken,
    ) -> std::result::Result<RawResponse, WatchCallError> {
        let params = Self::watch_params(index, recursive);
        tokio::select! {
            biased;
            _ = stop.cancelled() => Err(WatchCallError::StoppedByUser),
            result = self.send(path, &params, None) => result.map_err(WatchCallError::from),
        }
    }

    fn close_idle_connections(&self) {
        self.inner.transport.close_idle_connections();
    }
}

/// Validate a store endpoint: absolute `http`/`https` URL with a host
pub(crate) fn parse_endpoint(raw: &str) -> std::result::Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// `/v2/keys` path for a watched key; a missing leading slash is added
pub(crate) fn keys_path(path: &str) -> String {
    if path.starts_with('/') {
        format!("{KEYS_PREFIX}{path}")
    } else {
        format!("{KEYS_PREFIX}/{path}")
    }
}

fn api_url(
    endpoint: &Url,
    path: &str,
) -> std::result::Result<Url, ClientError> {
    let joined = format!("{}{}", display_endpoint(endpoint), path);
    Url::parse(&joined).map_err(|e| ClientError::InvalidEndpoint {
        endpoint: joined,
        reason: e.to_string(),
    })
}

fn display_endpoint(endpoint: &Url) -> String {
    endpoint.as_str().trim_end_matches('/').to_string()
}

fn transport_error(
    endpoint: &Url,
    e: reqwest::Error,
) -> ClientError {
    ClientError::Transport {
        endpoint: display_endpoint(endpoint),
        message: e.to_string(),
    }
}
