use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tracing::debug;
use tracing::warn;

use super::ClientConfig;
use crate::ClientError;

/// Shared HTTP connection pool
///
/// Cloning a `Transport` yields another handle onto the same pool. Every
/// client built from one handle shares idle connections, and
/// [`close_idle_connections`](Transport::close_idle_connections) affects all
/// of them. Clients that must not interfere get their own `Transport`.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    http: ArcSwap<reqwest::Client>,
    connect_timeout: Duration,
    tcp_keepalive: Duration,
    idle_resets: AtomicU64,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, ClientError> {
        let http = Self::build_http(config.connect_timeout, config.tcp_keepalive)?;
        Ok(Self {
            inner: Arc::new(TransportInner {
                http: ArcSwap::from_pointee(http),
                connect_timeout: config.connect_timeout,
                tcp_keepalive: config.tcp_keepalive,
                idle_resets: AtomicU64::new(0),
            }),
        })
    }

    /// Current pool. Requests keep the pool they started on alive until they finish.
    pub(crate) fn http(&self) -> reqwest::Client {
        self.inner.http.load().as_ref().clone()
    }

    /// Discard every idle pooled connection
    ///
    /// The pool is replaced by a fresh one; in-flight requests finish on the
    /// connections they already hold, idle ones are closed when the old pool
    /// is released.
    pub fn close_idle_connections(&self) {
        match Self::build_http(self.inner.connect_timeout, self.inner.tcp_keepalive) {
            Ok(http) => {
                self.inner.http.store(Arc::new(http));
                let resets = self.inner.idle_resets.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(resets, "idle connections discarded");
            }
            Err(e) => {
                warn!("failed to rebuild http pool, keeping current one: {:?}", e);
            }
        }
    }

    /// Number of times idle connections have been discarded on this pool
    pub fn idle_resets(&self) -> u64 {
        self.inner.idle_resets.load(Ordering::Relaxed)
    }

    /// Whether two handles share one pool
    pub fn same_pool(
        &self,
        other: &Transport,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn build_http(
        connect_timeout: Duration,
        tcp_keepalive: Duration,
    ) -> std::result::Result<reqwest::Client, ClientError> {
        reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .tcp_keepalive(tcp_keepalive)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("connect_timeout", &self.inner.connect_timeout)
            .field("tcp_keepalive", &self.inner.tcp_keepalive)
            .field("idle_resets", &self.idle_resets())
            .finish()
    }
}
