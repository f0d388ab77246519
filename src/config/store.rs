use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::client::parse_endpoint;
use crate::constants::DEFAULT_CONNECT_TIMEOUT_MS;
use crate::constants::DEFAULT_ENDPOINT;
use crate::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use crate::constants::DEFAULT_TCP_KEEPALIVE_MS;
use crate::Consistency;
use crate::Error;
use crate::Result;

/// Connection parameters for the coordination store
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// Bootstrap endpoints, e.g. `http://127.0.0.1:2379`
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Read consistency for point reads
    #[serde(default)]
    pub consistency: Consistency,

    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_in_ms: u64,

    /// TCP keepalive period in milliseconds
    #[serde(default = "default_tcp_keepalive")]
    pub tcp_keepalive_in_ms: u64,

    /// Point read timeout in milliseconds (long-polls are never timed out)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_in_ms: u64,

    /// Discover cluster members on startup
    #[serde(default = "default_sync_cluster")]
    pub sync_cluster: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            consistency: Consistency::default(),
            connect_timeout_in_ms: default_connect_timeout(),
            tcp_keepalive_in_ms: default_tcp_keepalive(),
            request_timeout_in_ms: default_request_timeout(),
            sync_cluster: default_sync_cluster(),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "store.endpoints must contain at least one endpoint".into(),
            )));
        }
        for endpoint in &self.endpoints {
            parse_endpoint(endpoint).map_err(|e| Error::Config(ConfigError::Message(e.to_string())))?;
        }

        if self.connect_timeout_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "store.connect_timeout_in_ms must be > 0".into(),
            )));
        }
        if self.request_timeout_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "store.request_timeout_in_ms must be > 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_endpoints() -> Vec<String> {
    vec![DEFAULT_ENDPOINT.to_string()]
}
fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}
fn default_tcp_keepalive() -> u64 {
    DEFAULT_TCP_KEEPALIVE_MS
}
fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}
fn default_sync_cluster() -> bool {
    true
}
