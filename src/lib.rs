//! # watchlog
//!
//! A resilient change-log watcher for etcd v2 style coordination stores.
//!
//! A single long-poll against the store is fragile: requests get dropped
//! with empty bodies, connections go stale, and some client stacks panic when
//! a request is torn down. [`Watcher`] hides all of that behind one
//! [`ChangeEvent`] channel that only closes when the watcher is stopped or a
//! response cannot be decoded.
//!
//! ```no_run
//! use std::sync::Arc;
//! use watchlog::{Client, Watcher};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let client = Client::builder(vec!["http://127.0.0.1:2379".into()])
//!         .build()
//!         .await
//!         .unwrap();
//!     let watcher = Watcher::new(Arc::new(client), "/services", 0);
//!
//!     let mut events = watcher.watch();
//!     while let Some(event) = events.recv().await {
//!         println!("{event}");
//!     }
//!     if let Some(e) = watcher.err() {
//!         eprintln!("watch failed: {e}");
//!     }
//! }
//! ```
mod cli;
mod client;
mod config;
mod errors;
mod output;
mod watch;

pub mod constants;
pub mod utils;

pub use cli::*;
pub use client::*;
pub use config::*;
pub use errors::*;
pub use output::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
