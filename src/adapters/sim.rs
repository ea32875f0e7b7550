//! Simulation adapters for running the control loop on the host.
//!
//! A first-order thermal model stands in for the room, a quantized reading
//! of it stands in for the temperature sensor, and published properties go
//! to the log while the latest value of each is retained for inspection.

use core::convert::Infallible;
use core::fmt::Write as _;

use embedded_hal::digital::OutputPin;
use heapless::{FnvIndexMap, String};
use log::info;

use crate::app::ports::{ActuatorPort, PropertySink, SensorPort};
use crate::app::properties::PropertyValue;
use crate::drivers::relay::RelayDriver;

// ───────────────────────────────────────────────────────────────
// Thermal plant model
// ───────────────────────────────────────────────────────────────

/// First-order room model: the temperature relaxes towards the heater
/// asymptote while heating, and towards ambient otherwise.
pub struct SimRoom {
    temperature_c: f32,
    ambient_c: f32,
    heater_asymptote_c: f32,
    time_constant_s: f32,
}

impl SimRoom {
    pub fn new(ambient_c: f32, heater_asymptote_c: f32, time_constant_s: f32) -> Self {
        Self {
            temperature_c: ambient_c,
            ambient_c,
            heater_asymptote_c,
            time_constant_s,
        }
    }

    /// Advance the model by `dt_secs` with the heater on or off.
    pub fn step(&mut self, dt_secs: f32, heating: bool) {
        let target = if heating {
            self.heater_asymptote_c
        } else {
            self.ambient_c
        };
        let alpha = dt_secs / (self.time_constant_s + dt_secs);
        self.temperature_c += (target - self.temperature_c) * alpha;
    }

    pub fn temperature_c(&self) -> f32 {
        self.temperature_c
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated hardware (SensorPort + ActuatorPort)
// ───────────────────────────────────────────────────────────────

/// Sensor resolution of the simulated probe (1/16 degree, DS18B20-like).
const SENSOR_STEP_C: f32 = 1.0 / 16.0;

/// In-memory digital output pin.
pub struct SimPin {
    level: bool,
}

impl SimPin {
    pub fn new() -> Self {
        Self { level: false }
    }
}

impl Default for SimPin {
    fn default() -> Self {
        Self::new()
    }
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level = true;
        Ok(())
    }
}

/// One struct playing both hardware roles, like a board support package:
/// the simulated room is heated through the real relay driver running on
/// in-memory pins.
pub struct SimHardware {
    room: SimRoom,
    relay: RelayDriver<SimPin, SimPin>,
    last_sample: Option<f32>,
}

impl SimHardware {
    pub fn new(room: SimRoom) -> Self {
        Self {
            room,
            relay: RelayDriver::new(SimPin::new(), SimPin::new()),
            last_sample: None,
        }
    }

    /// Advance the plant; heat flows while the relay is driven high.
    pub fn step_room(&mut self, dt_secs: f32) {
        let heating = self.relay.level();
        self.room.step(dt_secs, heating);
    }

    pub fn room_temperature_c(&self) -> f32 {
        self.room.temperature_c()
    }
}

impl SensorPort for SimHardware {
    fn request_sample(&mut self) {
        let raw = self.room.temperature_c();
        self.last_sample = Some((raw / SENSOR_STEP_C).round() * SENSOR_STEP_C);
    }

    fn read_last_value(&mut self) -> Option<f32> {
        self.last_sample
    }
}

impl ActuatorPort for SimHardware {
    fn set_relay(&mut self, level: bool) {
        self.relay.set_relay(level);
    }

    fn set_indicator(&mut self, level: bool) {
        self.relay.set_indicator(level);
    }

    fn relay_level(&self) -> bool {
        self.relay.relay_level()
    }
}

// ───────────────────────────────────────────────────────────────
// Property sink (PropertySink)
// ───────────────────────────────────────────────────────────────

const MAX_PROPERTIES: usize = 32;

/// Logs every publication and retains the latest value per property,
/// the way a telemetry broker would retain the last message per topic.
pub struct LogPropertySink {
    retained: FnvIndexMap<String<24>, String<16>, MAX_PROPERTIES>,
}

impl LogPropertySink {
    pub fn new() -> Self {
        Self {
            retained: FnvIndexMap::new(),
        }
    }

    /// Latest retained value of a property, if it was ever published.
    pub fn retained(&self, property: &str) -> Option<&str> {
        self.retained
            .iter()
            .find(|(k, _)| k.as_str() == property)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over all retained (property, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.retained.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for LogPropertySink {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySink for LogPropertySink {
    fn publish(&mut self, property: &str, value: PropertyValue) {
        info!("publish {property} = {value}");

        let mut key = String::<24>::new();
        let mut val = String::<16>::new();
        if write!(key, "{property}").is_err() || write!(val, "{value}").is_err() {
            // Oversized names/values are log-only.
            return;
        }
        let _ = self.retained.insert(key, val);
    }
}
