use bytes::Bytes;
use serde::Deserialize;
use serde::Serialize;

use super::EtcdError;
use crate::DecodeError;

/// A key or directory in the store's hierarchical keyspace
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Absent for the root directory
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub dir: bool,
    /// Direct children; only populated for directories
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub created_index: u64,
    #[serde(default)]
    pub modified_index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

/// Decoded store response for a read or a watch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub action: String,
    #[serde(default)]
    pub node: Node,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_node: Option<Node>,
    /// Global logical index taken from the response header
    #[serde(skip)]
    pub etcd_index: u64,
}

/// Undecoded response of a single HTTP exchange with the store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    pub status: u16,
    pub etcd_index: u64,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(
        status: u16,
        etcd_index: u64,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            status,
            etcd_index,
            body: body.into(),
        }
    }

    /// Zero-length body. The store returns these when it drops a long-poll.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body into a [`Response`]
    ///
    /// # Errors
    /// - [`DecodeError::Store`] when the store answered with an error document
    /// - [`DecodeError::Malformed`] when the body is not valid JSON of either shape
    pub fn unmarshal(&self) -> std::result::Result<Response, DecodeError> {
        if self.is_success() {
            let mut response: Response = serde_json::from_slice(&self.body).map_err(|e| self.malformed(e))?;
            response.etcd_index = self.etcd_index;
            Ok(response)
        } else {
            let store_error: EtcdError = serde_json::from_slice(&self.body).map_err(|e| self.malformed(e))?;
            Err(DecodeError::Store(store_error))
        }
    }

    fn malformed(
        &self,
        e: serde_json::Error,
    ) -> DecodeError {
        DecodeError::Malformed {
            status: self.status,
            message: e.to_string(),
        }
    }
}
