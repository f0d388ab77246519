use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use url::Url;

use super::parse_endpoint;
use super::Client;
use super::ClientConfig;
use super::ClientInner;
use super::Consistency;
use super::Transport;
use crate::ClientError;

pub struct ClientBuilder {
    config: ClientConfig,
    endpoints: Vec<String>,
    transport: Option<Transport>,
}

impl ClientBuilder {
    /// Create a new builder with default config and specified endpoints
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            config: ClientConfig::default(),
            endpoints,
            transport: None,
        }
    }

    /// Set connection timeout (default: 5s)
    pub fn connect_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set TCP keepalive period (default: 1s)
    pub fn tcp_keepalive(
        mut self,
        keepalive: Duration,
    ) -> Self {
        self.config.tcp_keepalive = keepalive;
        self
    }

    /// Set point read timeout (default: 3s). Watches are never timed out.
    pub fn request_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set read consistency (default: strong)
    pub fn consistency(
        mut self,
        consistency: Consistency,
    ) -> Self {
        self.config.consistency = consistency;
        self
    }

    /// Enable/disable cluster member discovery on build (default: enabled)
    pub fn sync_cluster(
        mut self,
        enable: bool,
    ) -> Self {
        self.config.sync_cluster = enable;
        self
    }

    /// Share an existing connection pool instead of creating a private one
    pub fn transport(
        mut self,
        transport: Transport,
    ) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Completely replaces the default configuration
    ///
    /// # Warning: Configuration Override
    /// This will discard all previous settings configured through individual
    /// methods like [`connect_timeout`](ClientBuilder::connect_timeout) or
    /// [`sync_cluster`](ClientBuilder::sync_cluster).
    ///
    /// # Example: Full Configuration
    /// ```ignore
    /// use watchlog::{ClientBuilder, ClientConfig};
    /// use std::time::Duration;
    ///
    /// let custom_config = ClientConfig {
    ///     connect_timeout: Duration::from_secs(2),
    ///     ..ClientConfig::default()
    /// };
    ///
    /// let builder = ClientBuilder::new(vec!["http://node1:2379".into()])
    ///     .set_config(custom_config);
    /// ```
    pub fn set_config(
        mut self,
        config: ClientConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Build the client with current configuration
    ///
    /// # Errors
    /// - [`ClientError::NoEndpoints`] / [`ClientError::InvalidEndpoint`] for bad endpoints
    /// - [`ClientError::ClusterUnreachable`] when cluster sync is enabled and no member answers
    pub async fn build(self) -> std::result::Result<Client, ClientError> {
        if self.endpoints.is_empty() {
            return Err(ClientError::NoEndpoints);
        }
        let endpoints = self
            .endpoints
            .iter()
            .map(|e| parse_endpoint(e))
            .collect::<std::result::Result<Vec<Url>, ClientError>>()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Transport::new(&self.config)?,
        };

        let client = Client {
            inner: Arc::new(ClientInner {
                transport,
                endpoints: ArcSwap::from_pointee(endpoints),
                config: self.config,
            }),
        };

        if client.inner.config.sync_cluster {
            client.sync_cluster().await?;
        }
        Ok(client)
    }
}
