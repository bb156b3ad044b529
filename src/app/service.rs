//! Relay service — the application core.
//!
//! [`RelayService`] owns every piece of mutable state: the latest-reading
//! store, the occupancy window, the journal/cursor, the actuator's
//! remembered level, and the last decision. It is driven exclusively by the
//! single-consumer control queue, which is what serializes the ingestion
//! path against the motion interrupt. Hardware and network I/O flow through
//! port traits injected at call sites, so the whole service runs under test
//! with mock adapters and a temp directory.
//!
//! ```text
//!                  ┌───────────────────────────────┐ ──▶ EventSink
//!   ControlEvent ─▶│         RelayService          │
//!                  │ store · window · journal ·    │ ──▶ UplinkPort
//!     RelayPort ◀──│ evaluator · actuator          │
//!                  └───────────────────────────────┘
//! ```

use chrono::{Duration, Utc};
use log::{info, warn};

use crate::config::RelayConfig;
use crate::drivers::relay::RelayActuator;
use crate::forward;
use crate::reading::Reading;
use crate::safety::{self, RelayDecision};
use crate::store::journal::Journal;
use crate::store::latest::LatestStore;
use crate::store::occupancy::OccupancyWindow;

use super::events::AppEvent;
use super::ports::{EventSink, RelayPort, UplinkPort};

pub struct RelayService {
    config: RelayConfig,
    store: LatestStore,
    occupancy: OccupancyWindow,
    journal: Journal,
    actuator: RelayActuator,
    last_decision: Option<RelayDecision>,
}

impl RelayService {
    pub fn new(
        config: RelayConfig,
        store: LatestStore,
        occupancy: OccupancyWindow,
        journal: Journal,
    ) -> Self {
        Self {
            config,
            store,
            occupancy,
            journal,
            actuator: RelayActuator::new(),
            last_decision: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Startup sequence: settle the relay from persisted state, then replay
    /// the unsent backlog.
    pub fn start(
        &mut self,
        hw: &mut impl RelayPort,
        uplink: &mut impl UplinkPort,
        sink: &mut impl EventSink,
    ) {
        let decision = self.reevaluate(hw, sink);
        sink.emit(&AppEvent::Started(decision));
        info!("relay service started, relay {decision}");

        self.forward(uplink, sink);
    }

    // ── Event handlers ────────────────────────────────────────

    /// A complete reading block arrived: journal it, update the store,
    /// re-evaluate, attempt delivery.
    pub fn on_reading(
        &mut self,
        mut reading: Reading,
        hw: &mut impl RelayPort,
        uplink: &mut impl UplinkPort,
        sink: &mut impl EventSink,
    ) {
        let now = Utc::now();
        reading.relay = self.actuator.is_on();
        reading.occupied = self.occupancy.is_active(now);

        // Durable append first: a record the collector will ever see must
        // exist in the log. On failure the in-memory path still proceeds.
        if let Err(e) = self.journal.append(&reading) {
            warn!("journal append failed: {e}");
        }

        match self.store.upsert(reading.clone()) {
            Ok(()) => {
                if let Some(channel) = reading.channel {
                    sink.emit(&AppEvent::ReadingStored { channel });
                }
            }
            Err(e) => {
                warn!("reading not stored: {e}");
                sink.emit(&AppEvent::ReadingRejected);
            }
        }

        self.reevaluate(hw, sink);
        self.forward(uplink, sink);
    }

    /// Debounced motion edge: re-arm the occupancy window, re-evaluate.
    pub fn on_motion(&mut self, hw: &mut impl RelayPort, sink: &mut impl EventSink) {
        let now = Utc::now();
        let duration = Duration::hours(i64::from(self.config.occupancy_hours));
        let expires = self.occupancy.trigger(duration, now);
        info!("motion: occupancy window armed until {expires}");
        sink.emit(&AppEvent::OccupancyTriggered { expires });

        self.reevaluate(hw, sink);
    }

    /// Periodic tick: notice silent staleness, retry stalled deliveries.
    pub fn on_tick(
        &mut self,
        hw: &mut impl RelayPort,
        uplink: &mut impl UplinkPort,
        sink: &mut impl EventSink,
    ) {
        self.reevaluate(hw, sink);
        if self.journal.cursor() < self.journal.len() {
            self.forward(uplink, sink);
        }
    }

    // ── Evaluation ────────────────────────────────────────────

    /// Run the evaluator over current state and apply the result.
    pub fn reevaluate(
        &mut self,
        hw: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) -> RelayDecision {
        let now = Utc::now();
        let occupied = self.occupancy.is_active(now);
        let decision = safety::evaluate(occupied, self.store.snapshot(), &self.config, now);

        let outcome = self.actuator.apply(decision.is_on(), hw);

        if self.last_decision != Some(decision) {
            info!("relay decision: {decision}");
            sink.emit(&AppEvent::DecisionChanged {
                from: self.last_decision,
                to: decision,
                observed: outcome.observed,
            });
            self.last_decision = Some(decision);
        }
        decision
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn decision(&self) -> Option<RelayDecision> {
        self.last_decision
    }

    pub fn relay_is_on(&self) -> bool {
        self.actuator.is_on()
    }

    pub fn forward_cursor(&self) -> u64 {
        self.journal.cursor()
    }

    pub fn log_len(&self) -> u64 {
        self.journal.len()
    }

    // ── Internal ──────────────────────────────────────────────

    fn forward(&mut self, uplink: &mut impl UplinkPort, sink: &mut impl EventSink) {
        let outcome = forward::flush(&mut self.journal, uplink);
        if outcome.sent > 0 {
            sink.emit(&AppEvent::Forwarded {
                records: outcome.sent,
                cursor: self.journal.cursor(),
            });
        }
        if outcome.stalled {
            sink.emit(&AppEvent::ForwardStalled {
                cursor: self.journal.cursor(),
            });
        }
    }
}
