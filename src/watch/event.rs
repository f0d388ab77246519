use std::fmt;

use chrono::DateTime;
use chrono::Local;
use serde::Deserialize;
use serde::Serialize;

use crate::utils::time::format_timestamp;
use crate::Response;

/// One observed change (or subtree snapshot) under the watched path
///
/// `modified_index` is what the watch loop resumes from; `resume_index` only
/// records which request produced the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Index the producing long-poll was issued from
    pub resume_index: u64,
    /// Store's global index when the response was produced
    pub store_index: u64,
    /// Taken when the long-poll returned, not when the event was delivered
    pub captured_at: DateTime<Local>,
    pub action: String,
    pub key: String,
    pub value: String,
    pub created_index: u64,
    pub modified_index: u64,
    /// Direct children of the node; 0 for a leaf
    pub child_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_value: Option<String>,
}

impl ChangeEvent {
    pub(crate) fn from_response(
        resume_index: u64,
        captured_at: DateTime<Local>,
        response: Response,
    ) -> Self {
        let Response {
            action,
            node,
            prev_node,
            etcd_index,
        } = response;

        Self {
            resume_index,
            store_index: etcd_index,
            captured_at,
            action,
            child_count: node.nodes.len(),
            key: node.key,
            value: node.value,
            created_index: node.created_index,
            modified_index: node.modified_index,
            prev_value: prev_node.map(|n| n.value),
        }
    }

    /// Index the next long-poll has to resume from after this event.
    /// `None` once the store's index space is exhausted.
    pub fn next_index(&self) -> Option<u64> {
        self.modified_index.checked_add(1)
    }
}

/// Fixed-width single line used by the human readable log
impl fmt::Display for ChangeEvent {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{:<29} {}->{} {:<16} {} {} {} {}",
            format_timestamp(&self.captured_at),
            self.resume_index,
            self.store_index,
            self.action,
            self.key,
            self.value,
            self.created_index,
            self.modified_index
        )?;
        if self.child_count > 0 {
            write!(f, " ({})", self.child_count)?;
        }
        Ok(())
    }
}
