//! Relay and status-indicator driver.
//!
//! One digital output switches the load relay, a second drives the status
//! indicator LED. Generic over `embedded-hal` [`OutputPin`]s so the same
//! driver runs against real GPIO on target and in-memory pins in tests and
//! simulation.
//!
//! This is a dumb actuator: polarity decisions (output inversion, the
//! indicator being the relay's complement) belong to the control service.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::ports::ActuatorPort;

pub struct RelayDriver<R, I> {
    relay: R,
    indicator: I,
    /// Last level written to the relay pin.
    relay_level: bool,
}

impl<R: OutputPin, I: OutputPin> RelayDriver<R, I> {
    /// Take ownership of the two output pins, driving both low.
    pub fn new(mut relay: R, mut indicator: I) -> Self {
        if relay.set_low().is_err() {
            warn!("relay pin write failed at init");
        }
        if indicator.set_low().is_err() {
            warn!("indicator pin write failed at init");
        }
        Self {
            relay,
            indicator,
            relay_level: false,
        }
    }

    pub fn level(&self) -> bool {
        self.relay_level
    }
}

impl<R: OutputPin, I: OutputPin> ActuatorPort for RelayDriver<R, I> {
    fn set_relay(&mut self, level: bool) {
        if self.relay.set_state(PinState::from(level)).is_err() {
            warn!("relay pin write failed");
            return;
        }
        self.relay_level = level;
    }

    fn set_indicator(&mut self, level: bool) {
        if self.indicator.set_state(PinState::from(level)).is_err() {
            warn!("indicator pin write failed");
        }
    }

    fn relay_level(&self) -> bool {
        self.relay_level
    }
}
