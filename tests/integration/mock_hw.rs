//! Mock hardware adapters for integration tests.
//!
//! Record every actuator call and publication so tests can assert on the
//! full command history without touching real GPIO or a real transport.

use relaystat::app::ports::{ActuatorPort, PropertySink, SensorPort};
use relaystat::app::properties::PropertyValue;

// ── MockHardware (SensorPort + ActuatorPort) ──────────────────

pub struct MockHardware {
    /// Value returned by every sensor read; `None` simulates a dead probe.
    pub sample: Option<f32>,
    pub sample_requests: usize,
    /// Every level ever written to the relay pin, in order.
    pub relay_writes: Vec<bool>,
    pub indicator_writes: Vec<bool>,
    relay_level: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            sample: None,
            sample_requests: 0,
            relay_writes: Vec::new(),
            indicator_writes: Vec::new(),
            relay_level: false,
        }
    }

    pub fn with_sample(value: f32) -> Self {
        let mut hw = Self::new();
        hw.sample = Some(value);
        hw
    }

    pub fn last_relay_level(&self) -> Option<bool> {
        self.relay_writes.last().copied()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn request_sample(&mut self) {
        self.sample_requests += 1;
    }

    fn read_last_value(&mut self) -> Option<f32> {
        self.sample
    }
}

impl ActuatorPort for MockHardware {
    fn set_relay(&mut self, level: bool) {
        self.relay_level = level;
        self.relay_writes.push(level);
    }

    fn set_indicator(&mut self, level: bool) {
        self.indicator_writes.push(level);
    }

    fn relay_level(&self) -> bool {
        self.relay_level
    }
}

// ── RecordingSink (PropertySink) ──────────────────────────────

pub struct RecordingSink {
    /// Every publication in order, formatted as the remote side sees it.
    pub published: Vec<(String, String)>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self {
            published: Vec::new(),
        }
    }

    /// Most recent value published for a property.
    pub fn last(&self, property: &str) -> Option<&str> {
        self.published
            .iter()
            .rev()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Number of times a property was published.
    pub fn count(&self, property: &str) -> usize {
        self.published.iter().filter(|(p, _)| p == property).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySink for RecordingSink {
    fn publish(&mut self, property: &str, value: PropertyValue) {
        self.published.push((property.to_string(), value.to_string()));
    }
}
