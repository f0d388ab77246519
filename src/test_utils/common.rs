use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::client::error_code;
use crate::RawResponse;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

pub fn event_body(
    action: &str,
    key: &str,
    value: &str,
    created_index: u64,
    modified_index: u64,
) -> String {
    json!({
        "action": action,
        "node": {
            "key": key,
            "value": value,
            "createdIndex": created_index,
            "modifiedIndex": modified_index,
        }
    })
    .to_string()
}

/// Successful long-poll answer for a single `set` of `key`
pub fn raw_set(
    etcd_index: u64,
    key: &str,
    value: &str,
    modified_index: u64,
) -> RawResponse {
    RawResponse::new(200, etcd_index, event_body("set", key, value, modified_index, modified_index))
}

/// The zero-length body the store sends when it drops a long-poll
pub fn raw_empty() -> RawResponse {
    RawResponse::new(200, 0, "")
}

pub fn raw_store_error(
    status: u16,
    error_code: u32,
    message: &str,
    index: u64,
) -> RawResponse {
    let body = json!({
        "errorCode": error_code,
        "message": message,
        "cause": "",
        "index": index,
    });
    RawResponse::new(status, index, body.to_string())
}

pub fn raw_event_index_cleared(index: u64) -> RawResponse {
    raw_store_error(
        400,
        error_code::EVENT_INDEX_CLEARED,
        "The event in requested index is outdated and cleared",
        index,
    )
}
