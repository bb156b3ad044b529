//! Mock adapters for integration tests.
//!
//! Record every port interaction so tests can assert on the full history
//! without touching real GPIO or the network.

#![allow(dead_code)] // not every test crate uses every helper

use thermoguard::app::events::AppEvent;
use thermoguard::app::ports::{EventSink, HardwareError, RelayPort, UplinkPort};
use thermoguard::reading::Reading;

// ── MockRelay ─────────────────────────────────────────────────

/// Relay pin double: counts writes, remembers the driven level.
pub struct MockRelay {
    pub writes: usize,
    level: Option<bool>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockRelay {
    pub fn new() -> Self {
        Self {
            writes: 0,
            level: None,
            fail_writes: false,
        }
    }

    pub fn level(&self) -> Option<bool> {
        self.level
    }
}

impl RelayPort for MockRelay {
    fn write(&mut self, on: bool) -> Result<(), HardwareError> {
        if self.fail_writes {
            return Err(HardwareError::WriteFailed);
        }
        self.writes += 1;
        self.level = Some(on);
        Ok(())
    }

    fn read(&mut self) -> Result<bool, HardwareError> {
        self.level.ok_or(HardwareError::ReadFailed)
    }
}

// ── MockUplink ────────────────────────────────────────────────

/// Collector double: accepts or refuses everything, records acceptances.
pub struct MockUplink {
    accept: bool,
    pub sent: Vec<Reading>,
    pub attempts: usize,
}

#[allow(dead_code)]
impl MockUplink {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            sent: Vec::new(),
            attempts: 0,
        }
    }

    pub fn refusing() -> Self {
        Self {
            accept: false,
            sent: Vec::new(),
            attempts: 0,
        }
    }
}

impl UplinkPort for MockUplink {
    fn send(&mut self, reading: &Reading) -> bool {
        self.attempts += 1;
        if self.accept {
            self.sent.push(reading.clone());
        }
        self.accept
    }
}

// ── CapturingSink ─────────────────────────────────────────────

pub struct CapturingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CapturingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl EventSink for CapturingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
