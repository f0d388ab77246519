use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One-shot stop signal shared by a watch loop and whoever may stop it
///
/// Clones share the same state. Closing is idempotent: only the first
/// [`close`](StopGate::close) cancels the underlying token, any later call
/// is a no-op. Safe to close from several tasks concurrently.
#[derive(Clone, Debug, Default)]
pub struct StopGate {
    inner: Arc<StopGateInner>,
}

#[derive(Debug, Default)]
struct StopGateInner {
    stopped: AtomicBool,
    token: CancellationToken,
}

impl StopGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the gate. Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        if self
            .inner
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.inner.token.cancel();
        debug!("stop gate closed");
        true
    }

    pub fn is_closed(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Completes once the gate has been closed
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await
    }

    /// Token handed to long-poll calls so they can abort in flight
    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }
}
