//! In-process fake of the store's v2 HTTP API
use std::collections::HashMap;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::oneshot;
use tracing::debug;
use warp::http::StatusCode;
use warp::Filter;

pub const ETCD_INDEX_HEADER: &str = "X-Etcd-Index";

// upper bound for anything a test waits on
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Scripted answer to one long-poll
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Reply {
    Event { status: u16, index: u64, body: String },
    /// 200 with a zero-length body
    Empty,
    /// Never answer
    Hang,
}

#[allow(dead_code)]
impl Reply {
    pub fn set(
        key: &str,
        value: &str,
        modified_index: u64,
    ) -> Self {
        let body = json!({
            "action": "set",
            "node": {
                "key": key,
                "value": value,
                "createdIndex": modified_index,
                "modifiedIndex": modified_index,
            }
        });
        Reply::Event {
            status: 200,
            index: modified_index,
            body: body.to_string(),
        }
    }

    pub fn store_error(
        status: u16,
        error_code: u32,
        message: &str,
        index: u64,
    ) -> Self {
        let body = json!({
            "errorCode": error_code,
            "message": message,
            "cause": "",
            "index": index,
        });
        Reply::Event {
            status,
            index,
            body: body.to_string(),
        }
    }
}

struct State {
    current_index: u64,
    replies: Mutex<VecDeque<Reply>>,
    watches: Mutex<Vec<HashMap<String, String>>>,
    reads: Mutex<Vec<HashMap<String, String>>>,
    members: Mutex<Vec<String>>,
}

pub struct FakeEtcd {
    pub addr: SocketAddr,
    state: Arc<State>,
    shutdown: Option<oneshot::Sender<()>>,
}

#[allow(dead_code)]
impl FakeEtcd {
    /// Serve on an ephemeral local port; unscripted long-polls hang
    pub async fn start(
        current_index: u64,
        replies: Vec<Reply>,
    ) -> Self {
        let state = Arc::new(State {
            current_index,
            replies: Mutex::new(replies.into()),
            watches: Mutex::new(Vec::new()),
            reads: Mutex::new(Vec::new()),
            members: Mutex::new(Vec::new()),
        });

        let with_state = {
            let state = state.clone();
            warp::any().map(move || state.clone())
        };
        let members = warp::path!("v2" / "members")
            .and(with_state.clone())
            .map(|state: Arc<State>| {
                let members: Vec<_> = state
                    .members
                    .lock()
                    .iter()
                    .map(|url| json!({ "name": url, "clientURLs": [url] }))
                    .collect();
                warp::reply::json(&json!({ "members": members }))
            });
        let keys = warp::path("v2")
            .and(warp::path("keys"))
            .and(warp::path::tail())
            .and(warp::query::<HashMap<String, String>>())
            .and(with_state)
            .then(handle_keys);

        let (tx, rx) = oneshot::channel::<()>();
        let (addr, server) =
            warp::serve(members.or(keys)).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async move {
                let _ = rx.await;
            });
        tokio::spawn(server);

        state.members.lock().push(format!("http://{addr}"));
        debug!("fake etcd listening on {}", addr);
        Self {
            addr,
            state,
            shutdown: Some(tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_members(
        &self,
        members: Vec<String>,
    ) {
        *self.state.members.lock() = members;
    }

    /// Query parameters of every long-poll received so far
    pub fn watches(&self) -> Vec<HashMap<String, String>> {
        self.state.watches.lock().clone()
    }

    pub fn wait_indexes(&self) -> Vec<u64> {
        self.watches()
            .iter()
            .filter_map(|q| q.get("waitIndex").and_then(|i| i.parse().ok()))
            .collect()
    }

    pub fn reads(&self) -> Vec<HashMap<String, String>> {
        self.state.reads.lock().clone()
    }

    pub async fn wait_for_watches(
        &self,
        count: usize,
    ) {
        tokio::time::timeout(WAIT_TIMEOUT, async {
            while self.watches().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("long-polls did not arrive in time");
    }
}

impl Drop for FakeEtcd {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_keys(
    tail: warp::path::Tail,
    query: HashMap<String, String>,
    state: Arc<State>,
) -> warp::reply::Response {
    if query.get("wait").map(String::as_str) != Some("true") {
        state.reads.lock().push(query);
        let body = json!({
            "action": "get",
            "node": { "key": format!("/{}", tail.as_str()), "dir": true }
        });
        return respond(200, state.current_index, body.to_string());
    }

    state.watches.lock().push(query);
    let reply = state.replies.lock().pop_front().unwrap_or(Reply::Hang);
    match reply {
        Reply::Event { status, index, body } => respond(status, index, body),
        Reply::Empty => respond(200, state.current_index, String::new()),
        Reply::Hang => std::future::pending().await,
    }
}

fn respond(
    status: u16,
    index: u64,
    body: String,
) -> warp::reply::Response {
    warp::http::Response::builder()
        .status(StatusCode::from_u16(status).unwrap())
        .header("Content-Type", "application/json")
        .header(ETCD_INDEX_HEADER, index.to_string())
        .body(body.into())
        .unwrap()
}

/// Local address nothing listens on
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
