//! Fakes and fixtures shared by the unit tests
mod common;
mod scripted_store;

pub use common::*;
pub use scripted_store::*;
