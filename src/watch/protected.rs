use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::KeysApi;
use crate::PanicError;
use crate::RawResponse;
use crate::WatchCallError;

/// Run one long-poll inside a panic recovery boundary
///
/// Some client stacks panic when a request is torn down while a watch is
/// being cancelled. Such a panic is returned as
/// [`WatchCallError::Panicked`] instead of unwinding into the watch loop.
/// A panic never escapes this call.
pub async fn protected_raw_watch<C>(
    client: &C,
    path: &str,
    index: u64,
    recursive: bool,
    stop: CancellationToken,
) -> std::result::Result<RawResponse, WatchCallError>
where
    C: KeysApi + ?Sized,
{
    let call = async move { client.raw_watch(path, index, recursive, stop).await };
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let e = recovered(payload);
            warn!(index, "recovered from panic in raw_watch: {}", e);
            Err(e)
        }
    }
}

/// Error-shaped payloads (panic messages, boxed errors) become
/// [`WatchCallError::Panicked`]; anything else is an unknown recovery.
pub(crate) fn recovered(payload: Box<dyn Any + Send>) -> WatchCallError {
    let payload = match payload.downcast::<String>() {
        Ok(message) => return PanicError::new(*message).into(),
        Err(other) => other,
    };
    let payload = match payload.downcast::<&'static str>() {
        Ok(message) => return PanicError::new(*message).into(),
        Err(other) => other,
    };
    match payload.downcast::<Box<dyn std::error::Error + Send + Sync>>() {
        Ok(e) => PanicError::new(e.to_string()).into(),
        Err(other) => WatchCallError::UnknownRecovery(format!("{:?}", (*other).type_id())),
    }
}
