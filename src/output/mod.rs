//! Event encoders: a human readable log line and a JSON record per event
mod destination;
mod sink;

pub use destination::*;
pub use sink::*;
