use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::protected_raw_watch;
use super::ChangeEvent;
use super::StopGate;
use crate::constants::DEFAULT_EVENT_BUFFER_SIZE;
use crate::constants::DEFAULT_PANIC_BACKOFF_MS;
use crate::utils::time::now;
use crate::KeysApi;
use crate::RawResponse;
use crate::WatchCallError;
use crate::WatchConfig;
use crate::WatchError;

/// Tuning knobs of a watch loop
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub recursive: bool,
    pub event_buffer_size: usize,
    pub panic_backoff: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            panic_backoff: Duration::from_millis(DEFAULT_PANIC_BACKOFF_MS),
        }
    }
}

impl From<&WatchConfig> for WatchOptions {
    fn from(config: &WatchConfig) -> Self {
        Self {
            recursive: config.recursive,
            event_buffer_size: config.event_buffer_size.max(1),
            panic_backoff: Duration::from_millis(config.panic_backoff_in_ms),
        }
    }
}

/// Long-running watch over one path of the store
///
/// [`watch`](Watcher::watch) starts a background task that keeps a single
/// long-poll outstanding at all times and turns every observed change into a
/// [`ChangeEvent`]. Transient failures are retried forever; the channel only
/// closes when the watcher is stopped or a response cannot be decoded.
///
/// ```ignore
/// let watcher = Watcher::new(Arc::new(client), "/services", 0);
/// let mut events = watcher.watch();
/// while let Some(event) = events.recv().await {
///     println!("{event}");
/// }
/// if let Some(e) = watcher.err() {
///     eprintln!("watch failed: {e}");
/// }
/// ```
pub struct Watcher<C: KeysApi> {
    client: Arc<C>,
    path: String,
    index: u64,
    options: WatchOptions,
    gate: StopGate,
    err: Arc<Mutex<Option<WatchError>>>,
}

impl<C: KeysApi> Watcher<C> {
    /// `index` 0 means "start from the store's current index"
    pub fn new(
        client: Arc<C>,
        path: impl Into<String>,
        index: u64,
    ) -> Self {
        Self {
            client,
            path: path.into(),
            index,
            options: WatchOptions::default(),
            gate: StopGate::new(),
            err: Arc::new(Mutex::new(None)),
        }
    }

    pub fn from_config(
        client: Arc<C>,
        config: &WatchConfig,
    ) -> Self {
        Self::new(client, config.path.clone(), config.start_index).with_options(WatchOptions::from(config))
    }

    pub fn with_options(
        mut self,
        options: WatchOptions,
    ) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Spawn the watch loop and hand back its event stream
    ///
    /// Must be called from within a tokio runtime. Each call starts an
    /// independent loop sharing this watcher's stop gate and error slot.
    pub fn watch(&self) -> mpsc::Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel(self.options.event_buffer_size.max(1));
        let watch_loop = WatchLoop {
            client: self.client.clone(),
            path: self.path.clone(),
            next_index: self.index,
            options: self.options.clone(),
            gate: self.gate.clone(),
            err: self.err.clone(),
            tx,
        };
        tokio::spawn(watch_loop.run());
        rx
    }

    /// Terminal error of the loop. `None` after a clean stop.
    ///
    /// Only meaningful once the event channel has closed.
    pub fn err(&self) -> Option<WatchError> {
        self.err.lock().clone()
    }

    /// Stop the loop. Safe to call repeatedly and from several tasks.
    pub fn close(&self) {
        if self.gate.close() {
            info!(path = %self.path, "watcher closed");
        }
    }

    /// Handle that can stop this watcher from elsewhere (e.g. a signal handler)
    pub fn stop_gate(&self) -> StopGate {
        self.gate.clone()
    }
}

/// What one long-poll attempt produced, from the loop's point of view
enum Outcome {
    Stopped,
    Panicked(WatchCallError),
    Empty,
    Retry(WatchCallError),
    Decoded(RawResponse),
}

impl From<std::result::Result<RawResponse, WatchCallError>> for Outcome {
    fn from(result: std::result::Result<RawResponse, WatchCallError>) -> Self {
        match result {
            Err(WatchCallError::StoppedByUser) => Outcome::Stopped,
            Err(e @ WatchCallError::Panicked(_)) => Outcome::Panicked(e),
            Err(e) => Outcome::Retry(e),
            Ok(raw) if raw.is_empty() => Outcome::Empty,
            Ok(raw) => Outcome::Decoded(raw),
        }
    }
}

struct WatchLoop<C: KeysApi> {
    client: Arc<C>,
    path: String,
    next_index: u64,
    options: WatchOptions,
    gate: StopGate,
    err: Arc<Mutex<Option<WatchError>>>,
    tx: mpsc::Sender<ChangeEvent>,
}

impl<C: KeysApi> WatchLoop<C> {
    async fn run(mut self) {
        if let Err(e) = self.poll_loop().await {
            error!("watch on {} failed: {}", self.path, e);
            self.err.lock().get_or_insert(e);
        }
        debug!(path = %self.path, next_index = self.next_index, "watch loop exited");
        // tx drops here and closes the channel
    }

    async fn poll_loop(&mut self) -> std::result::Result<(), WatchError> {
        if self.next_index == 0 {
            match self.discover_index().await? {
                Some(index) => self.next_index = index,
                None => return Ok(()),
            }
        }

        loop {
            if self.gate.is_closed() {
                return Ok(());
            }

            trace!(path = %self.path, index = self.next_index, "long-poll");
            let result = protected_raw_watch(
                self.client.as_ref(),
                &self.path,
                self.next_index,
                self.options.recursive,
                self.gate.token(),
            )
            .await;
            let captured_at = now();

            match Outcome::from(result) {
                Outcome::Stopped => {
                    debug!(path = %self.path, "watch stopped by user");
                    return Ok(());
                }
                Outcome::Panicked(e) => {
                    warn!(
                        "long-poll at index {} panicked, retrying in {:?}: {}",
                        self.next_index, self.options.panic_backoff, e
                    );
                    tokio::select! {
                        biased;
                        _ = self.gate.cancelled() => return Ok(()),
                        _ = tokio::time::sleep(self.options.panic_backoff) => {}
                    }
                }
                Outcome::Empty => {
                    debug!(index = self.next_index, "empty long-poll response, resetting idle connections");
                    self.client.close_idle_connections();
                }
                Outcome::Retry(e) => {
                    debug!("long-poll at index {} failed, retrying: {}", self.next_index, e);
                    self.client.close_idle_connections();
                }
                Outcome::Decoded(raw) => {
                    let response = raw.unmarshal().map_err(|source| WatchError::Decode {
                        path: self.path.clone(),
                        index: self.next_index,
                        source,
                    })?;
                    let event = ChangeEvent::from_response(self.next_index, captured_at, response);
                    let next_index = event.next_index();
                    let modified_index = event.modified_index;

                    tokio::select! {
                        biased;
                        _ = self.gate.cancelled() => return Ok(()),
                        sent = self.tx.send(event) => {
                            if sent.is_err() {
                                debug!(path = %self.path, "event receiver dropped, stopping");
                                return Ok(());
                            }
                        }
                    }
                    match next_index {
                        Some(next_index) => self.next_index = self.next_index.max(next_index),
                        None => {
                            return Err(WatchError::IndexExhausted {
                                path: self.path.clone(),
                                modified_index,
                            })
                        }
                    }
                }
            }
        }
    }

    /// Current global index of the store, or `None` if stopped while reading it
    async fn discover_index(&self) -> std::result::Result<Option<u64>, WatchError> {
        let response = tokio::select! {
            biased;
            _ = self.gate.cancelled() => return Ok(None),
            response = self.client.get(&self.path) => response,
        };
        let response = response.map_err(|source| WatchError::Discovery {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path, index = response.etcd_index, "starting watch from current index");
        Ok(Some(response.etcd_index))
    }
}
