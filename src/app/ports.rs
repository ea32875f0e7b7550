//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (the sensor driver, the relay hardware, the telemetry
//! transport) implement these traits. The
//! [`ControlService`](super::service::ControlService) consumes them at call
//! sites, so the domain core never touches hardware directly and can be
//! exercised with mock adapters.

use super::properties::PropertyValue;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the process-value sensor.
///
/// The contract is non-blocking: [`request_sample`](Self::request_sample)
/// triggers an acquisition and [`read_last_value`](Self::read_last_value)
/// hands back whatever the driver last acquired. `None` means no usable
/// reading is available; the caller treats that as "no new sample" and lets
/// its staleness fallback take over rather than feeding bad data into the
/// control state.
pub trait SensorPort {
    /// Trigger an acquisition.
    fn request_sample(&mut self);

    /// Latest acquired value, if any.
    fn read_last_value(&mut self) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the relay and its companion indicator.
///
/// Levels are electrical: the domain resolves logical-state inversion
/// before calling in, and drives the indicator as the complement of the
/// relay by board convention.
pub trait ActuatorPort {
    /// Drive the relay output pin.
    fn set_relay(&mut self, level: bool);

    /// Drive the status indicator pin.
    fn set_indicator(&mut self, level: bool);

    /// Current electrical level of the relay pin.
    fn relay_level(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Property sink (driven adapter: domain → telemetry / remote config)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the telemetry / remote-configuration layer.
///
/// The domain publishes named property values through this port; the
/// adapter on the other side decides where they go (serial log, MQTT
/// topic, BLE characteristic). Inbound writes arrive separately through
/// [`ControlService::handle_remote_write`](super::service::ControlService::handle_remote_write).
pub trait PropertySink {
    fn publish(&mut self, property: &str, value: PropertyValue);
}
