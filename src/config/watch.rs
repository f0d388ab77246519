use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_EVENT_BUFFER_SIZE;
use crate::constants::DEFAULT_PANIC_BACKOFF_MS;
use crate::constants::DEFAULT_WATCH_PATH;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchConfig {
    /// Key path to watch
    #[serde(default = "default_path")]
    pub path: String,

    /// Index to resume from; 0 discovers the current index with a point read
    #[serde(default)]
    pub start_index: u64,

    /// Watch descendants of `path` too
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    /// Pending events buffered before the watch loop blocks on a slow consumer
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,

    /// Fixed delay before retrying a long-poll that panicked, in milliseconds
    #[serde(default = "default_panic_backoff")]
    pub panic_backoff_in_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            start_index: 0,
            recursive: default_recursive(),
            event_buffer_size: default_event_buffer_size(),
            panic_backoff_in_ms: default_panic_backoff(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message("watch.path cannot be empty".into())));
        }
        if self.event_buffer_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.event_buffer_size must be > 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_path() -> String {
    DEFAULT_WATCH_PATH.to_string()
}
fn default_recursive() -> bool {
    true
}
fn default_event_buffer_size() -> usize {
    DEFAULT_EVENT_BUFFER_SIZE
}
fn default_panic_backoff() -> u64 {
    DEFAULT_PANIC_BACKOFF_MS
}
