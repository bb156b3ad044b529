//! Outbound application events.
//!
//! The [`RelayService`](super::service::RelayService) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them.

use chrono::{DateTime, Utc};

use crate::drivers::relay::Observed;
use crate::safety::RelayDecision;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service finished startup (carries the initial decision).
    Started(RelayDecision),

    /// A reading was ingested and stored.
    ReadingStored { channel: u32 },

    /// A reading arrived without a usable channel and was not stored.
    ReadingRejected,

    /// The motion sensor (re)armed the occupancy window.
    OccupancyTriggered { expires: DateTime<Utc> },

    /// The evaluator's decision changed and was applied to the relay.
    DecisionChanged {
        from: Option<RelayDecision>,
        to: RelayDecision,
        observed: Observed,
    },

    /// Records were delivered to the collector.
    Forwarded { records: usize, cursor: u64 },

    /// Delivery stopped with unsent records remaining in the log.
    ForwardStalled { cursor: u64 },
}
