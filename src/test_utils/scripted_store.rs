use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::ClientError;
use crate::KeysApi;
use crate::RawResponse;
use crate::Response;
use crate::WatchCallError;

/// One scripted answer to a `raw_watch` call
pub enum Step {
    Respond(std::result::Result<RawResponse, WatchCallError>),
    /// Panic inside the call with the given message
    Panic(&'static str),
    /// Hang until the stop token fires
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String),
    Watch(u64),
    CloseIdle,
}

/// In-memory [`KeysApi`] that replays a fixed script of long-poll outcomes
///
/// Once the script is exhausted every further long-poll blocks until it is
/// cancelled. Every call is recorded with the (tokio) time it was made.
pub struct ScriptedStore {
    current_index: u64,
    get_error: Mutex<Option<ClientError>>,
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(Instant, StoreCall)>>,
}

impl ScriptedStore {
    pub fn new(
        current_index: u64,
        script: Vec<Step>,
    ) -> Self {
        Self {
            current_index,
            get_error: Mutex::new(None),
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_get_error(
        self,
        e: ClientError,
    ) -> Self {
        *self.get_error.lock() = Some(e);
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, StoreCall)> {
        self.calls.lock().clone()
    }

    /// Indexes of every long-poll issued so far, in order
    pub fn watch_indexes(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::Watch(index) => Some(index),
                _ => None,
            })
            .collect()
    }

    pub fn close_idle_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == StoreCall::CloseIdle).count()
    }

    pub fn remaining_steps(&self) -> usize {
        self.script.lock().len()
    }

    fn record(
        &self,
        call: StoreCall,
    ) {
        self.calls.lock().push((Instant::now(), call));
    }
}

#[async_trait]
impl KeysApi for ScriptedStore {
    async fn get(
        &self,
        path: &str,
    ) -> std::result::Result<Response, ClientError> {
        self.record(StoreCall::Get(path.to_string()));
        if let Some(e) = self.get_error.lock().clone() {
            return Err(e);
        }
        Ok(Response {
            action: "get".to_string(),
            etcd_index: self.current_index,
            ..Default::default()
        })
    }

    async fn raw_watch(
        &self,
        _path: &str,
        index: u64,
        _recursive: bool,
        stop: CancellationToken,
    ) -> std::result::Result<RawResponse, WatchCallError> {
        self.record(StoreCall::Watch(index));
        let step = self.script.lock().pop_front();
        match step {
            Some(Step::Respond(result)) => result,
            Some(Step::Panic(message)) => panic!("{}", message),
            Some(Step::Block) | None => {
                stop.cancelled().await;
                Err(WatchCallError::StoppedByUser)
            }
        }
    }

    fn close_idle_connections(&self) {
        self.record(StoreCall::CloseIdle);
    }
}
