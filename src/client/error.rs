use serde::Deserialize;
use serde::Serialize;

/// Error document returned by the store for a failed request
///
/// ```json
/// {"errorCode":401,"message":"The event in requested index is outdated and cleared","cause":"the requested history has been cleared [1008/4]","index":2007}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{error_code}: {message} ({cause}) [{index}]")]
pub struct EtcdError {
    #[serde(rename = "errorCode")]
    pub error_code: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub cause: String,
    /// Store's global index when the error was produced
    #[serde(default)]
    pub index: u64,
}

impl EtcdError {
    /// The requested watch index fell out of the store's event history.
    /// A new watch has to start from a fresh point read.
    pub fn is_event_index_cleared(&self) -> bool {
        self.error_code == error_code::EVENT_INDEX_CLEARED
    }
}

/// Error codes used by the store's keys API
pub mod error_code {
    pub const KEY_NOT_FOUND: u32 = 100;
    pub const TEST_FAILED: u32 = 101;
    pub const NOT_FILE: u32 = 102;
    pub const NOT_DIR: u32 = 104;
    pub const NODE_EXIST: u32 = 105;
    pub const ROOT_R_ONLY: u32 = 107;
    pub const DIR_NOT_EMPTY: u32 = 108;
    pub const UNAUTHORIZED: u32 = 110;

    pub const PREV_VALUE_REQUIRED: u32 = 201;
    pub const TTL_NAN: u32 = 202;
    pub const INDEX_NAN: u32 = 203;
    pub const INVALID_FIELD: u32 = 209;
    pub const INVALID_FORM: u32 = 210;

    pub const RAFT_INTERNAL: u32 = 300;
    pub const LEADER_ELECT: u32 = 301;

    pub const WATCHER_CLEARED: u32 = 400;
    pub const EVENT_INDEX_CLEARED: u32 = 401;
}
