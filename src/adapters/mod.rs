//! Adapters — implementations of the port traits for the outside world.

pub mod gpio;
pub mod http;
pub mod log_sink;
