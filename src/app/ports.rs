//! Port traits — the boundary between the relay controller and the world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RelayService (domain)
//! ```
//!
//! Driven adapters (GPIO, HTTP uplink, event sinks) implement these traits.
//! The [`RelayService`](super::service::RelayService) consumes them via
//! generics, so the domain core never touches hardware or sockets directly.

use core::fmt;

use crate::reading::Reading;

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// One digital output driving the relay coil, with readback.
///
/// Implementations must not block: a write is a pin set, a read is a pin
/// level query. Failures are reported, never panicked on — the actuator
/// layer folds them into an "observed unknown" diagnostic.
pub trait RelayPort {
    /// Drive the relay output high (`true`) or low (`false`).
    fn write(&mut self, on: bool) -> Result<(), HardwareError>;

    /// Read back the current output level.
    fn read(&mut self) -> Result<bool, HardwareError>;
}

// ───────────────────────────────────────────────────────────────
// Uplink port (driven adapter: domain → collector)
// ───────────────────────────────────────────────────────────────

/// Delivery of one reading to the remote collector.
///
/// `true` means the collector accepted the record (2xx). Every transport or
/// protocol failure is `false` — the forwarder retries on the next natural
/// trigger and never needs to distinguish failure modes.
pub trait UplinkPort {
    fn send(&mut self, reading: &Reading) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (the log today,
/// MQTT or a metrics pipeline later).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`RelayPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// GPIO set failed.
    WriteFailed,
    /// GPIO level query failed.
    ReadFailed,
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "GPIO write failed"),
            Self::ReadFailed => write!(f, "GPIO read failed"),
        }
    }
}
