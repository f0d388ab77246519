// -
// Store HTTP API

/// Header carrying the store's global logical index
pub(crate) const ETCD_INDEX_HEADER: &str = "X-Etcd-Index";

pub(crate) const KEYS_PREFIX: &str = "/v2/keys";
pub(crate) const MEMBERS_PATH: &str = "/v2/members";

// -
// Defaults

pub const DEFAULT_ENDPOINT: &str = "http://localhost:2379";
pub const DEFAULT_WATCH_PATH: &str = "/";

/// Capacity of the event channel handed to consumers
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Delay before retrying a long-poll that panicked
pub const DEFAULT_PANIC_BACKOFF_MS: u64 = 250;

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_TCP_KEEPALIVE_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;
