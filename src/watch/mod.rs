//! Resilient watch over a path of the coordination store
//!
//! - [`Watcher`] keeps a long-poll outstanding and streams [`ChangeEvent`]s
//! - [`protected_raw_watch`] turns client panics into ordinary errors
//! - [`StopGate`] is the one-shot stop signal shared with the loop
//!
//! The loop resumes from `modified_index + 1` of the last delivered event,
//! so a retry may repeat an event but never skips one.

mod event;
mod protected;
mod stop;
mod watcher;

pub use event::*;
pub use protected::protected_raw_watch;
pub use stop::*;
pub use watcher::*;
