//! System configuration parameters
//!
//! All tunable parameters for the thermostat control loop. Values are
//! compiled-in boot defaults; every one of them can be changed at runtime
//! through the remote property interface. Nothing is persisted — a restart
//! returns the device to these values.

use serde::{Deserialize, Serialize};

/// Core control-loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    // --- PID ---
    /// Target process value (degrees C for a heating loop)
    pub setpoint: f32,
    /// Proportional band in process units. The range of process value over
    /// which the power output spans 0 to full power. 0 gives bang-bang.
    pub prop_band: f32,
    /// Integral time constant (seconds). 0 disables the integral term.
    pub integral_time: f32,
    /// Derivative time constant (seconds). 0 disables the derivative term.
    pub derivative_time: f32,
    /// Boot-time preset for the integral term, as a power fraction (0-1).
    /// An estimate of the steady-state power needed to hold the setpoint.
    pub initial_integral: f32,
    /// Maximum seconds expected between process-value samples before the
    /// controller falls back to `manual_power`. 0 disables the check and
    /// runs the algorithm on every sample.
    pub max_interval: u32,
    /// How often to run the PID algorithm (seconds), or 0 to run it each
    /// time a new process value arrives.
    pub update_seconds: u32,
    /// Low-pass filter factor for the derivative term; the filter time
    /// constant is `derivative_time / smooth_factor`. 0 disables filtering.
    pub derivative_smooth: f32,
    /// true = auto (closed loop), false = manual (`manual_power` output)
    pub mode_auto: bool,
    /// Power output in manual mode and in the stale-sensor fallback (0-1)
    pub manual_power: f32,

    // --- Time-proportioning output ---
    /// Relay cycle time (seconds). Must be > 0.
    pub cycle_time: u32,
    /// Actuator action time (seconds), subtracted from each on-pulse.
    pub dead_time: u32,
    /// Invert the electrical sense of the relay output.
    pub invert_output: bool,
    /// Power fraction used when no fresh power demand arrives in time (0-1)
    pub fallback_power: f32,
    /// Maximum seconds allowed between power updates before falling back
    /// to `fallback_power`. 0 disables the fallback.
    pub max_update_interval: u32,

    // --- Timing ---
    /// Sensor sampling interval (seconds)
    pub sensor_interval_secs: u32,
    /// Control tick interval (milliseconds) — the `scheduled_tick` cadence
    pub tick_interval_ms: u32,
    /// Button poll interval (milliseconds). Must stay below half the
    /// shortest press the debouncer has to catch (90 ms).
    pub button_poll_ms: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            // PID
            setpoint: 19.5,
            prop_band: 5.0,
            integral_time: 1800.0,
            derivative_time: 15.0,
            initial_integral: 0.5,
            max_interval: 300,
            update_seconds: 0,
            derivative_smooth: 3.0,
            mode_auto: true,
            manual_power: 0.0,

            // Time-proportioning
            cycle_time: 60,
            dead_time: 0,
            invert_output: false,
            fallback_power: 0.0,
            max_update_interval: 120,

            // Timing
            sensor_interval_secs: 60,
            tick_interval_ms: 1000,
            button_poll_ms: 20,
        }
    }
}
