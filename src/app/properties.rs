//! Remote-configuration property registry.
//!
//! Every runtime-tunable parameter is exposed as a named property. Inbound
//! writes are dispatched through a static table mapping each name to its
//! parser, validation and target setter, so the whole surface is
//! enumerable and testable instead of living in a chain of string
//! comparisons. Names are matched case-insensitively; unknown names are
//! ignored without error.
//!
//! Parsing and range validation happen here, before any setter is reached:
//! the control algorithms themselves never see malformed tuning input.

use core::fmt;

use crate::error::WriteError;

use super::ports::{ActuatorPort, PropertySink};
use super::service::ControlService;

// ───────────────────────────────────────────────────────────────
// Property values
// ───────────────────────────────────────────────────────────────

/// A typed property value, as published to the telemetry layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Float(f32),
    Uint(u32),
    Bool(bool),
    Text(&'static str),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatch table
// ───────────────────────────────────────────────────────────────

/// What an accepted write republishes: `Some` for the canonical parsed
/// value, `None` when the handler already published through its own path
/// (the `on` relay override).
pub(crate) type Applied = Option<PropertyValue>;

pub(crate) type ApplyFn = fn(
    &mut ControlService,
    &mut dyn ActuatorPort,
    &mut dyn PropertySink,
    &str,
) -> Result<Applied, WriteError>;

/// One writable property: canonical name plus its apply handler.
pub struct PropertyEntry {
    /// Canonical (lowercase) property name.
    pub name: &'static str,
    pub(crate) apply: ApplyFn,
}

/// Every property the remote side may write, in publication order.
pub static PROPERTIES: &[PropertyEntry] = &[
    PropertyEntry { name: "on", apply: apply_on },
    PropertyEntry { name: "setpoint", apply: apply_setpoint },
    PropertyEntry { name: "propband", apply: apply_prop_band },
    PropertyEntry { name: "integraltime", apply: apply_integral_time },
    PropertyEntry { name: "derivativetime", apply: apply_derivative_time },
    PropertyEntry { name: "initialintegral", apply: apply_initial_integral },
    PropertyEntry { name: "maxinterval", apply: apply_max_interval },
    PropertyEntry { name: "updateseconds", apply: apply_update_seconds },
    PropertyEntry { name: "derivativesmooth", apply: apply_derivative_smooth },
    PropertyEntry { name: "auto", apply: apply_auto },
    PropertyEntry { name: "manualpower", apply: apply_manual_power },
    PropertyEntry { name: "cycletime", apply: apply_cycle_time },
    PropertyEntry { name: "deadtime", apply: apply_dead_time },
    PropertyEntry { name: "invert", apply: apply_invert },
    PropertyEntry { name: "fallbackpower", apply: apply_fallback_power },
    PropertyEntry { name: "maxupdateinterval", apply: apply_max_update_interval },
];

/// Find a writable property by name, case-insensitively.
pub fn lookup(name: &str) -> Option<&'static PropertyEntry> {
    PROPERTIES.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}

// ───────────────────────────────────────────────────────────────
// Value parsers
// ───────────────────────────────────────────────────────────────

fn parse_float(raw: &str) -> Result<f32, WriteError> {
    let v: f32 = raw.trim().parse().map_err(|_| WriteError::InvalidValue)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(WriteError::InvalidValue)
    }
}

fn parse_non_negative(raw: &str) -> Result<f32, WriteError> {
    let v = parse_float(raw)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(WriteError::OutOfRange)
    }
}

fn parse_fraction(raw: &str) -> Result<f32, WriteError> {
    let v = parse_float(raw)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(WriteError::OutOfRange)
    }
}

fn parse_u32(raw: &str) -> Result<u32, WriteError> {
    raw.trim().parse().map_err(|_| WriteError::InvalidValue)
}

/// Lenient boolean: accepts `true`/`false` and `1`/`0`.
fn parse_bool(raw: &str) -> Result<bool, WriteError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") || raw == "1" {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
        Ok(false)
    } else {
        Err(WriteError::InvalidValue)
    }
}

/// Strict boolean for the relay override: exactly `true` or `false`.
fn parse_switch(raw: &str) -> Result<bool, WriteError> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(WriteError::InvalidValue),
    }
}

// ───────────────────────────────────────────────────────────────
// Apply handlers
// ───────────────────────────────────────────────────────────────

fn apply_on(
    svc: &mut ControlService,
    hw: &mut dyn ActuatorPort,
    sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let on = parse_switch(raw)?;
    svc.force_relay(on, hw, sink);
    Ok(None)
}

fn apply_setpoint(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_float(raw)?;
    svc.config.setpoint = v;
    svc.pid.set_setpoint(v);
    Ok(Some(PropertyValue::Float(v)))
}

fn apply_prop_band(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_non_negative(raw)?;
    svc.config.prop_band = v;
    svc.pid.set_prop_band(v);
    Ok(Some(PropertyValue::Float(v)))
}

fn apply_integral_time(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_non_negative(raw)?;
    svc.config.integral_time = v;
    svc.pid.set_integral_time(v);
    Ok(Some(PropertyValue::Float(v)))
}

fn apply_derivative_time(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_non_negative(raw)?;
    svc.config.derivative_time = v;
    svc.pid.set_derivative_time(v);
    Ok(Some(PropertyValue::Float(v)))
}

fn apply_initial_integral(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_fraction(raw)?;
    svc.config.initial_integral = v;
    svc.pid.set_initial_integral(v);
    Ok(Some(PropertyValue::Float(v)))
}

fn apply_max_interval(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_u32(raw)?;
    svc.config.max_interval = v;
    svc.pid.set_max_interval(v);
    Ok(Some(PropertyValue::Uint(v)))
}

fn apply_update_seconds(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_u32(raw)?;
    svc.config.update_seconds = v;
    Ok(Some(PropertyValue::Uint(v)))
}

fn apply_derivative_smooth(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_non_negative(raw)?;
    svc.config.derivative_smooth = v;
    svc.pid.set_derivative_smoothing(v);
    Ok(Some(PropertyValue::Float(v)))
}

fn apply_auto(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_bool(raw)?;
    svc.config.mode_auto = v;
    svc.pid.set_auto_mode(v);
    Ok(Some(PropertyValue::Bool(v)))
}

fn apply_manual_power(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_fraction(raw)?;
    svc.config.manual_power = v;
    svc.pid.set_manual_power(v);
    Ok(Some(PropertyValue::Float(v)))
}

fn apply_cycle_time(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_u32(raw)?;
    // The cycle must be non-empty after dead-time compensation.
    if v == 0 || v <= svc.config.dead_time {
        return Err(WriteError::OutOfRange);
    }
    svc.config.cycle_time = v;
    svc.timeprop.set_cycle_time(v);
    Ok(Some(PropertyValue::Uint(v)))
}

fn apply_dead_time(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_u32(raw)?;
    if v >= svc.config.cycle_time {
        return Err(WriteError::OutOfRange);
    }
    svc.config.dead_time = v;
    svc.timeprop.set_dead_time(v);
    Ok(Some(PropertyValue::Uint(v)))
}

fn apply_invert(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_bool(raw)?;
    svc.config.invert_output = v;
    svc.timeprop.set_invert(v);
    Ok(Some(PropertyValue::Bool(v)))
}

fn apply_fallback_power(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_fraction(raw)?;
    svc.config.fallback_power = v;
    svc.timeprop.set_fallback_power(v);
    Ok(Some(PropertyValue::Float(v)))
}

fn apply_max_update_interval(
    svc: &mut ControlService,
    _hw: &mut dyn ActuatorPort,
    _sink: &mut dyn PropertySink,
    raw: &str,
) -> Result<Applied, WriteError> {
    let v = parse_u32(raw)?;
    svc.config.max_update_interval = v;
    svc.timeprop.set_max_update_interval(v);
    Ok(Some(PropertyValue::Uint(v)))
}
