//! GPIO adapter: relay output and PIR motion input.
//!
//! ## Dual-target design
//!
//! With the `rpi` feature: real Raspberry Pi pins via rppal. The motion
//! input registers a rising-edge async interrupt with a 200 ms debounce —
//! the debounce is the driver's responsibility, so the control queue sees
//! at most one event per physical trigger. Dropping the pins releases them
//! (rppal resets pin state on drop), which is what makes shutdown release
//! deterministic on every exit path.
//!
//! Without the feature: an in-memory simulated relay so the daemon and the
//! whole test suite run on any host.

use crate::app::ports::{HardwareError, RelayPort};

#[cfg(feature = "rpi")]
pub use rpi::{MotionSensor, RelayPin};

#[cfg(feature = "rpi")]
mod rpi {
    use std::time::Duration;

    use log::info;
    use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};

    use crate::app::ports::{HardwareError, RelayPort};
    use crate::events::{ControlEvent, EventProducer};

    const MOTION_DEBOUNCE: Duration = Duration::from_millis(200);

    /// Relay coil output.
    pub struct RelayPin {
        pin: OutputPin,
    }

    impl RelayPin {
        pub fn open(bcm_pin: u8) -> anyhow::Result<Self> {
            let pin = Gpio::new()?.get(bcm_pin)?.into_output_low();
            info!("relay output on GPIO {bcm_pin}");
            Ok(Self { pin })
        }
    }

    impl RelayPort for RelayPin {
        fn write(&mut self, on: bool) -> Result<(), HardwareError> {
            if on {
                self.pin.set_high();
            } else {
                self.pin.set_low();
            }
            Ok(())
        }

        fn read(&mut self) -> Result<bool, HardwareError> {
            Ok(self.pin.is_set_high())
        }
    }

    /// PIR motion input. Holds the pin alive; dropping it unregisters the
    /// interrupt and releases the line.
    pub struct MotionSensor {
        _pin: InputPin,
    }

    impl MotionSensor {
        /// Register a debounced rising-edge interrupt that produces
        /// [`ControlEvent::Motion`] into the control queue.
        pub fn watch(bcm_pin: u8, producer: EventProducer) -> anyhow::Result<Self> {
            let mut pin = Gpio::new()?.get(bcm_pin)?.into_input_pulldown();
            pin.set_async_interrupt(Trigger::RisingEdge, Some(MOTION_DEBOUNCE), move |_| {
                producer.send(ControlEvent::Motion);
            })?;
            info!("motion input on GPIO {bcm_pin} (rising edge, 200 ms debounce)");
            Ok(Self { _pin: pin })
        }
    }
}

/// In-memory relay for hosts without GPIO. Tracks the driven level and logs
/// transitions so a dev run on a laptop shows the same decision stream.
pub struct SimRelay {
    level: bool,
}

impl SimRelay {
    pub fn new() -> Self {
        Self { level: false }
    }
}

impl Default for SimRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayPort for SimRelay {
    fn write(&mut self, on: bool) -> Result<(), HardwareError> {
        if self.level != on {
            log::info!("sim relay -> {}", if on { "ON" } else { "OFF" });
        }
        self.level = on;
        Ok(())
    }

    fn read(&mut self) -> Result<bool, HardwareError> {
        Ok(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_relay_reads_back_written_level() {
        let mut relay = SimRelay::new();
        assert_eq!(relay.read(), Ok(false));
        relay.write(true).unwrap();
        assert_eq!(relay.read(), Ok(true));
        relay.write(false).unwrap();
        assert_eq!(relay.read(), Ok(false));
    }
}
