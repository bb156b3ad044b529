//! Safety evaluator.
//!
//! Pure decision function from (occupancy, latest-store snapshot) to the
//! relay level. Checks run in strict priority order, first match wins:
//!
//! 1. occupancy window active → Off (human presence overrides everything);
//! 2. a required channel missing or stale → Off (silence is unsafe);
//! 3. a required channel below the control threshold → Off;
//! 4. otherwise → On.
//!
//! The function has no side effects; the actuator write it feeds is the
//! caller's job. A reading without a parseable timestamp counts as stale —
//! it cannot prove freshness.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::config::RelayConfig;
use crate::reading::Reading;

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayDecision {
    On,
    Off(OffReason),
}

impl RelayDecision {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Why the relay must be off. Carried for the event sink and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffReason {
    /// The occupancy window is active.
    Occupied,
    /// A required channel has no entry in the store.
    ChannelMissing(u32),
    /// A required channel's reading is older than the staleness horizon,
    /// or carries no timestamp at all.
    ChannelStale(u32),
    /// A required channel reports below the control threshold, or no
    /// temperature at all.
    BelowThreshold(u32),
}

impl fmt::Display for OffReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Occupied => write!(f, "occupancy window active"),
            Self::ChannelMissing(ch) => write!(f, "channel {ch} missing"),
            Self::ChannelStale(ch) => write!(f, "channel {ch} stale"),
            Self::BelowThreshold(ch) => write!(f, "channel {ch} below threshold"),
        }
    }
}

impl fmt::Display for RelayDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off(reason) => write!(f, "off ({reason})"),
        }
    }
}

/// Decide the relay level for the given occupancy state and store snapshot.
pub fn evaluate(
    occupied: bool,
    snapshot: &BTreeMap<u32, Reading>,
    config: &RelayConfig,
    now: DateTime<Utc>,
) -> RelayDecision {
    if occupied {
        return RelayDecision::Off(OffReason::Occupied);
    }

    let horizon = Duration::hours(i64::from(config.stale_horizon_hours));

    for &channel in &config.required_channels {
        let Some(reading) = snapshot.get(&channel) else {
            return RelayDecision::Off(OffReason::ChannelMissing(channel));
        };

        let fresh = reading
            .timestamp
            .is_some_and(|ts| now.signed_duration_since(ts) <= horizon);
        if !fresh {
            return RelayDecision::Off(OffReason::ChannelStale(channel));
        }

        match reading.temperature {
            Some(t) if t >= config.control_threshold => {}
            _ => return RelayDecision::Off(OffReason::BelowThreshold(channel)),
        }
    }

    RelayDecision::On
}
