//! Application layer: port traits, outbound events, and the relay service.

pub mod events;
pub mod ports;
pub mod service;
