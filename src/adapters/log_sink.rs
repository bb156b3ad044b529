//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to the
//! process log. A future MQTT or metrics adapter would implement the same
//! trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::drivers::relay::Observed;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

fn observed_str(observed: Observed) -> &'static str {
    match observed {
        Observed::Level(true) => "high",
        Observed::Level(false) => "low",
        Observed::Unknown => "unknown",
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(decision) => {
                info!("START | relay={decision}");
            }
            AppEvent::ReadingStored { channel } => {
                info!("READ  | channel={channel} stored");
            }
            AppEvent::ReadingRejected => {
                warn!("READ  | rejected (no channel)");
            }
            AppEvent::OccupancyTriggered { expires } => {
                info!("PIR   | occupied until {expires}");
            }
            AppEvent::DecisionChanged { from, to, observed } => {
                match from {
                    Some(from) => info!(
                        "RELAY | {from} -> {to}, pin {}",
                        observed_str(*observed)
                    ),
                    None => info!("RELAY | {to}, pin {}", observed_str(*observed)),
                }
            }
            AppEvent::Forwarded { records, cursor } => {
                info!("FWD   | {records} record(s) delivered, cursor={cursor}");
            }
            AppEvent::ForwardStalled { cursor } => {
                warn!("FWD   | delivery stalled, cursor={cursor}");
            }
        }
    }
}
