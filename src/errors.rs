//! Watchlog Error Hierarchy
//!
//! Errors are split by who gets to see them:
//! - [`Error`]: everything the binary can report before exiting
//! - [`WatchError`]: the terminal error a [`Watcher`](crate::Watcher) records
//! - [`WatchCallError`]: the outcome of one long-poll attempt, absorbed by the
//!   watch loop and never surfaced to callers

use std::path::PathBuf;

use config::ConfigError;

use crate::client::EtcdError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store client construction or request failures
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The watch loop halted on an unrecoverable error
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// Event encoders failed to open or write their destination
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Process level I/O failures (e.g. signal registration)
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Store index carried by a terminal watch error, if any
    pub fn store_index(&self) -> Option<u64> {
        match self {
            Error::Watch(e) => e.store_index(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Client was built without any endpoint
    #[error("At least one endpoint required")]
    NoEndpoints,

    /// Endpoint is not an absolute http(s) URL
    #[error("Invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// No endpoint answered the cluster membership probe
    #[error("Unable to communicate with etcd cluster {0:?}")]
    ClusterUnreachable(String),

    /// Connection refused, reset, timed out, or the body could not be read
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// Server side failure (HTTP 5xx)
    #[error("Unexpected HTTP status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Setup(String),

    /// Response arrived but could not be turned into a store response
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    /// The store answered with its own error document
    #[error(transparent)]
    Store(#[from] EtcdError),

    /// The body is not the JSON shape we expect
    #[error("Malformed response body (HTTP {status}): {message}")]
    Malformed { status: u16, message: String },
}

impl DecodeError {
    /// Store error attached to this failure, if the store produced one
    pub fn store_error(&self) -> Option<&EtcdError> {
        match self {
            DecodeError::Store(e) => Some(e),
            DecodeError::Malformed { .. } => None,
        }
    }
}

/// Terminal error of a watch loop. Recorded once, then the event channel closes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WatchError {
    /// Initial point read used to discover the starting index failed
    #[error("Failed to discover current index of {path}: {source}")]
    Discovery {
        path: String,
        #[source]
        source: ClientError,
    },

    /// A long-poll response could not be decoded
    #[error("Failed to decode watch response for {path} at index {index}: {source}")]
    Decode {
        path: String,
        index: u64,
        #[source]
        source: DecodeError,
    },

    /// A delivered event carried the largest representable index, so there
    /// is nothing left to resume from
    #[error("Cannot resume watch on {path} after modified index {modified_index}")]
    IndexExhausted { path: String, modified_index: u64 },
}

impl WatchError {
    /// Last logical index reported by the store, when the cause carries one
    pub fn store_index(&self) -> Option<u64> {
        let decode = match self {
            WatchError::Discovery {
                source: ClientError::Decode(e),
                ..
            } => e,
            WatchError::Decode { source, .. } => source,
            WatchError::Discovery { .. } | WatchError::IndexExhausted { .. } => return None,
        };
        decode.store_error().map(|e| e.index)
    }
}

/// Outcome of a single failed long-poll attempt
#[derive(Debug, thiserror::Error)]
pub enum WatchCallError {
    /// The stop signal fired while the request was in flight
    #[error("Watch stopped by user")]
    StoppedByUser,

    /// The client library panicked; converted by the panic-safe adapter
    #[error(transparent)]
    Panicked(#[from] PanicError),

    /// A panic whose payload carried no message
    #[error("unknown recover error: {0}")]
    UnknownRecovery(String),

    #[error("Watch request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Watch request to {endpoint} returned HTTP status {status}")]
    Status { endpoint: String, status: u16 },
}

impl From<ClientError> for WatchCallError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Transport { endpoint, message } => WatchCallError::Transport { endpoint, message },
            ClientError::Status { endpoint, status } => WatchCallError::Status { endpoint, status },
            other => WatchCallError::Transport {
                endpoint: String::new(),
                message: other.to_string(),
            },
        }
    }
}

/// Panic raised inside the store client and caught at the call boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Recovered panic in watch call: {message}")]
pub struct PanicError {
    pub message: String,
}

impl PanicError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Error creating {kind} output file {path}: {source}")]
    Create {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing {kind} output: {source}")]
    Write {
        kind: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Error encoding event: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
