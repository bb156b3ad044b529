//! Relay actuator with software-remembered state.
//!
//! The evaluator re-runs on every event, so the actuator must be idempotent
//! under repeated identical requests: a request matching the remembered
//! state performs no hardware write, only a readback for diagnostics.
//!
//! Hardware failures never escalate. A failed write leaves the remembered
//! state untouched so the next evaluation retries the level; a failed
//! readback reports [`Observed::Unknown`].

use log::warn;

use crate::app::ports::RelayPort;

/// Pin level seen on readback, if the hardware answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    Level(bool),
    Unknown,
}

/// Result of one [`RelayActuator::apply`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// The level that was requested.
    pub desired: bool,
    /// Whether a hardware write actually happened.
    pub wrote: bool,
    /// Pin level read back after the (possibly skipped) write.
    pub observed: Observed,
}

pub struct RelayActuator {
    /// Last level successfully written, `None` until the first write.
    last_applied: Option<bool>,
}

impl RelayActuator {
    pub fn new() -> Self {
        Self { last_applied: None }
    }

    /// Drive the relay to `desired`, deduplicating repeat requests.
    pub fn apply(&mut self, desired: bool, hw: &mut impl RelayPort) -> ApplyOutcome {
        let mut wrote = false;

        if self.last_applied != Some(desired) {
            match hw.write(desired) {
                Ok(()) => {
                    self.last_applied = Some(desired);
                    wrote = true;
                }
                Err(e) => {
                    // Remembered state stays put: the next trigger retries.
                    warn!("relay write failed ({e}), observed unknown");
                    return ApplyOutcome {
                        desired,
                        wrote: false,
                        observed: Observed::Unknown,
                    };
                }
            }
        }

        let observed = match hw.read() {
            Ok(level) => Observed::Level(level),
            Err(e) => {
                warn!("relay readback failed ({e}), observed unknown");
                Observed::Unknown
            }
        };

        ApplyOutcome {
            desired,
            wrote,
            observed,
        }
    }

    /// Last level successfully written, as stamped onto ingested readings.
    pub fn is_on(&self) -> bool {
        self.last_applied == Some(true)
    }
}

impl Default for RelayActuator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::HardwareError;

    /// Counts writes and can be told to fail.
    struct FakePin {
        level: bool,
        writes: usize,
        fail_writes: bool,
        fail_reads: bool,
    }

    impl FakePin {
        fn new() -> Self {
            Self {
                level: false,
                writes: 0,
                fail_writes: false,
                fail_reads: false,
            }
        }
    }

    impl RelayPort for FakePin {
        fn write(&mut self, on: bool) -> Result<(), HardwareError> {
            if self.fail_writes {
                return Err(HardwareError::WriteFailed);
            }
            self.level = on;
            self.writes += 1;
            Ok(())
        }

        fn read(&mut self) -> Result<bool, HardwareError> {
            if self.fail_reads {
                return Err(HardwareError::ReadFailed);
            }
            Ok(self.level)
        }
    }

    #[test]
    fn repeat_request_writes_once() {
        let mut pin = FakePin::new();
        let mut relay = RelayActuator::new();

        let first = relay.apply(true, &mut pin);
        let second = relay.apply(true, &mut pin);

        assert!(first.wrote);
        assert!(!second.wrote);
        assert_eq!(pin.writes, 1);
        assert_eq!(second.observed, Observed::Level(true));
    }

    #[test]
    fn level_change_writes_again() {
        let mut pin = FakePin::new();
        let mut relay = RelayActuator::new();

        relay.apply(true, &mut pin);
        relay.apply(false, &mut pin);
        relay.apply(true, &mut pin);

        assert_eq!(pin.writes, 3);
    }

    #[test]
    fn failed_write_is_retried_next_time() {
        let mut pin = FakePin::new();
        let mut relay = RelayActuator::new();

        pin.fail_writes = true;
        let out = relay.apply(true, &mut pin);
        assert_eq!(out.observed, Observed::Unknown);
        assert!(!relay.is_on());

        pin.fail_writes = false;
        let out = relay.apply(true, &mut pin);
        assert!(out.wrote, "write must be retried after a failure");
        assert!(relay.is_on());
    }

    #[test]
    fn failed_readback_reports_unknown_without_blocking() {
        let mut pin = FakePin::new();
        pin.fail_reads = true;
        let mut relay = RelayActuator::new();

        let out = relay.apply(true, &mut pin);
        assert!(out.wrote);
        assert_eq!(out.observed, Observed::Unknown);
        assert!(relay.is_on());
    }
}
