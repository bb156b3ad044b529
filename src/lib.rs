//! Thermoguard library.
//!
//! Exposes the domain modules for integration testing and external
//! inspection. Hardware-specific code is guarded by the `rpi` feature
//! within the adapter modules.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod events;
pub mod forward;
pub mod reading;
pub mod safety;

pub mod adapters;
pub mod drivers;
pub mod store;

mod error;

pub use error::PersistError;
