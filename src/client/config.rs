use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_CONNECT_TIMEOUT_MS;
use crate::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use crate::constants::DEFAULT_TCP_KEEPALIVE_MS;
use crate::StoreConfig;

/// Read consistency requested from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    /// Reads go through quorum (`quorum=true`)
    #[default]
    Strong,
    /// Reads may be served by any member from local state
    Weak,
}

/// Client configuration parameters for store connection management
///
/// # Key Configuration Areas
/// - Connection establishment (TCP handshake timeout)
/// - Dead peer detection (TCP keepalive)
/// - Point read lifecycle control
///
/// Long-poll watch requests deliberately carry no request timeout.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum time to wait for establishing a TCP connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// TCP keepalive period used to notice a vanished store member
    /// Default: 1 second
    pub tcp_keepalive: Duration,

    /// Maximum time to wait for a point read or membership probe
    /// Default: 3 seconds
    pub request_timeout: Duration,

    /// Default: strong
    pub consistency: Consistency,

    /// Replace the bootstrap endpoints with the cluster's advertised client URLs
    /// Default: true
    pub sync_cluster: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            tcp_keepalive: Duration::from_millis(DEFAULT_TCP_KEEPALIVE_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            consistency: Consistency::Strong,
            sync_cluster: true,
        }
    }
}

impl From<&StoreConfig> for ClientConfig {
    fn from(store: &StoreConfig) -> Self {
        Self {
            connect_timeout: Duration::from_millis(store.connect_timeout_in_ms),
            tcp_keepalive: Duration::from_millis(store.tcp_keepalive_in_ms),
            request_timeout: Duration::from_millis(store.request_timeout_in_ms),
            consistency: store.consistency,
            sync_cluster: store.sync_cluster,
        }
    }
}
