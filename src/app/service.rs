//! Control service — the hexagonal core.
//!
//! [`ControlService`] owns the PID controller, the time-proportioning
//! converter and the manual-override debouncer, and schedules their
//! execution. It exposes a clean, hardware-agnostic API; all I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────────┐ ──▶ PropertySink
//!                 │       ControlService        │
//! ActuatorPort ◀──│  PID · Timeprop · Button    │
//!                 └────────────────────────────┘
//! ```
//!
//! Everything runs on one logical thread: the fixed-rate
//! [`scheduled_tick`](ControlService::scheduled_tick), the faster
//! [`poll_button`](ControlService::poll_button) and the remote-write
//! handler are strictly serialized by the caller's poll loop, so no
//! locking is needed anywhere in the core.

use log::{debug, info, warn};

use crate::config::ControlConfig;
use crate::control::pid::PidController;
use crate::control::timeprop::TimepropConverter;
use crate::drivers::button::{ButtonDebouncer, ButtonEvent};

use super::ports::{ActuatorPort, PropertySink, SensorPort};
use super::properties::{self, PropertyValue};

/// The control service orchestrates the whole closed loop.
pub struct ControlService {
    /// Live configuration, kept in step with the components as remote
    /// writes land (for read-back and cross-parameter validation).
    pub(super) config: ControlConfig,
    pub(super) pid: PidController,
    pub(super) timeprop: TimepropConverter,
    button: ButtonDebouncer,

    /// Current logical actuator state.
    relay_on: bool,
    /// When the actuator last changed state (tick clock domain).
    last_change_secs: u32,
    /// When the last usable process value arrived.
    last_pv_update_secs: u32,
    /// Recompute the PID output on the next tick regardless of cadence.
    run_pid_now: bool,
    /// Modulo counter for the timed-update cadence (`update_seconds`).
    tick_counter: u32,
    /// Timestamp of the most recent scheduled tick; transitions triggered
    /// between ticks (button, remote override) are stamped with this.
    last_tick_secs: u32,
    /// When the sensor was last polled. `None` forces a poll on the first
    /// tick after start.
    last_sensor_poll_secs: Option<u32>,
}

impl ControlService {
    /// Construct the service from configuration, opening the first relay
    /// cycle at `now_secs`. Call [`start`](Self::start) next.
    pub fn new(config: ControlConfig, now_secs: u32) -> Self {
        let pid = PidController::new(
            config.setpoint,
            config.prop_band,
            config.integral_time,
            config.derivative_time,
            config.initial_integral,
            config.max_interval,
            config.derivative_smooth,
            config.mode_auto,
            config.manual_power,
        );
        let timeprop = TimepropConverter::new(
            config.cycle_time,
            config.dead_time,
            config.invert_output,
            config.fallback_power,
            config.max_update_interval,
            now_secs,
        );

        Self {
            config,
            pid,
            timeprop,
            button: ButtonDebouncer::new(),
            relay_on: false,
            last_change_secs: now_secs,
            last_pv_update_secs: now_secs,
            run_pid_now: false,
            tick_counter: 0,
            last_tick_secs: now_secs,
            last_sensor_poll_secs: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the device: drive the actuator to its boot state and
    /// publish every tunable's boot value so the remote side sees the
    /// full parameter set.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl PropertySink) {
        self.apply_actuator_state(false, hw, sink);

        sink.publish("unit", PropertyValue::Text("c"));
        sink.publish("setpoint", PropertyValue::Float(self.config.setpoint));
        sink.publish("propband", PropertyValue::Float(self.config.prop_band));
        sink.publish("integraltime", PropertyValue::Float(self.config.integral_time));
        sink.publish("derivativetime", PropertyValue::Float(self.config.derivative_time));
        sink.publish("initialintegral", PropertyValue::Float(self.config.initial_integral));
        sink.publish("maxinterval", PropertyValue::Uint(self.config.max_interval));
        sink.publish("updateseconds", PropertyValue::Uint(self.config.update_seconds));
        sink.publish("derivativesmooth", PropertyValue::Float(self.config.derivative_smooth));
        sink.publish("auto", PropertyValue::Bool(self.config.mode_auto));
        sink.publish("manualpower", PropertyValue::Float(self.config.manual_power));
        sink.publish("cycletime", PropertyValue::Uint(self.config.cycle_time));
        sink.publish("deadtime", PropertyValue::Uint(self.config.dead_time));
        sink.publish("invert", PropertyValue::Bool(self.config.invert_output));
        sink.publish("fallbackpower", PropertyValue::Float(self.config.fallback_power));
        sink.publish("maxupdateinterval", PropertyValue::Uint(self.config.max_update_interval));

        info!("control service started, setpoint {}", self.config.setpoint);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one scheduling tick. Expected at a fixed cadence, nominally
    /// once per second.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn scheduled_tick(
        &mut self,
        now_secs: u32,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl PropertySink,
    ) {
        self.last_tick_secs = now_secs;

        // 1. Sample the sensor on its own (slower) schedule.
        if self.sensor_poll_due(now_secs) {
            self.last_sensor_poll_secs = Some(now_secs);
            hw.request_sample();
            match hw.read_last_value() {
                Some(value) if value.is_finite() => {
                    sink.publish("degrees", PropertyValue::Float(value));
                    self.new_process_value(value, now_secs);
                }
                // No usable reading: leave the control state untouched and
                // let the staleness clock run towards the fallback.
                _ => warn!("sensor returned no usable sample"),
            }
        }

        // 2. Decide whether to recompute the power demand this tick.
        let timed_update_due = self.config.update_seconds != 0 && {
            let due = self.tick_counter % self.config.update_seconds == 0;
            self.tick_counter = self.tick_counter.wrapping_add(1);
            due
        };
        let pv_stale =
            now_secs.wrapping_sub(self.last_pv_update_secs) > self.config.max_interval;

        if self.run_pid_now || pv_stale || timed_update_due {
            self.run_pid_now = false;
            let power = self.pid.tick(now_secs);
            debug!("pid power {power:.3} at {now_secs}s");
            sink.publish("power", PropertyValue::Float(power));
            self.timeprop.set_power(power, now_secs);
        }

        // 3. Always advance the converter and track the binary demand.
        let demand = self.timeprop.tick(now_secs);
        if demand != self.relay_on {
            self.transition(demand, now_secs, hw, sink);
        }
    }

    /// Feed a new process value into the controller.
    ///
    /// Normally called from the tick's own sensor poll, but also usable
    /// directly when the process value arrives from elsewhere.
    pub fn new_process_value(&mut self, value: f32, now_secs: u32) {
        debug!("new pv {value} at {now_secs}s");
        self.last_pv_update_secs = now_secs;
        self.pid.set_process_value(value, now_secs);
        if self.config.update_seconds == 0 {
            self.run_pid_now = true;
        }
    }

    // ── Manual override ───────────────────────────────────────

    /// Poll the override button with the raw pin level (active-low).
    ///
    /// Must be called at least once per ~45 ms to catch the shortest
    /// qualifying press. A qualifying press toggles the actuator exactly
    /// once.
    pub fn poll_button(
        &mut self,
        now_ms: u32,
        raw_level: bool,
        hw: &mut impl ActuatorPort,
        sink: &mut impl PropertySink,
    ) {
        let pressed = !raw_level;
        if let Some(ButtonEvent::Toggle) = self.button.poll(now_ms, pressed) {
            let target = !self.relay_on;
            info!("button toggle, switch {}", if target { "on" } else { "off" });
            self.transition(target, self.last_tick_secs, hw, sink);
        }
    }

    /// Drive the actuator to a requested logical state (remote `on`
    /// write). A no-op state is still confirmed back to the remote side.
    pub(super) fn force_relay(
        &mut self,
        on: bool,
        hw: &mut dyn ActuatorPort,
        sink: &mut dyn PropertySink,
    ) {
        if on == self.relay_on {
            sink.publish("on", PropertyValue::Bool(on));
            return;
        }
        self.transition(on, self.last_tick_secs, hw, sink);
    }

    // ── Remote parameter writes ───────────────────────────────

    /// Apply a remote property write.
    ///
    /// Unknown names are ignored; malformed or out-of-range values are
    /// rejected without applying or republishing anything. An accepted
    /// value is republished and schedules an immediate PID recompute so
    /// the new tuning takes effect without waiting for the next sample.
    pub fn handle_remote_write(
        &mut self,
        name: &str,
        value: &str,
        hw: &mut impl ActuatorPort,
        sink: &mut impl PropertySink,
    ) {
        let Some(entry) = properties::lookup(name) else {
            debug!("ignoring write to unknown property '{name}'");
            return;
        };

        match (entry.apply)(self, &mut *hw, &mut *sink, value) {
            Ok(applied) => {
                if let Some(v) = applied {
                    sink.publish(entry.name, v);
                }
                self.run_pid_now = true;
                info!("property {} <- {}", entry.name, value);
            }
            Err(e) => warn!("rejected write {}='{}': {e}", entry.name, value),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current logical actuator state.
    pub fn relay_on(&self) -> bool {
        self.relay_on
    }

    /// Clone of the live configuration (for read-back).
    pub fn current_config(&self) -> ControlConfig {
        self.config.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    fn sensor_poll_due(&self, now_secs: u32) -> bool {
        match self.last_sensor_poll_secs {
            None => true,
            Some(last) => {
                now_secs.wrapping_sub(last) >= self.config.sensor_interval_secs
            }
        }
    }

    /// Record a state change: apply it to the hardware, publish the new
    /// state, and publish how long the previous state was held.
    fn transition(
        &mut self,
        on: bool,
        now_secs: u32,
        hw: &mut dyn ActuatorPort,
        sink: &mut dyn PropertySink,
    ) {
        let held = now_secs.wrapping_sub(self.last_change_secs);
        info!(
            "switch {} at {now_secs}s (previous state held {held}s)",
            if on { "on" } else { "off" }
        );
        self.apply_actuator_state(on, hw, sink);
        sink.publish("statetime", PropertyValue::Uint(held));
        self.relay_on = on;
        self.last_change_secs = now_secs;
    }

    /// Drive the output pins for a logical state and report it.
    ///
    /// The relay pin carries the (possibly inverted) electrical level; the
    /// indicator is its complement by board convention.
    fn apply_actuator_state(
        &self,
        on: bool,
        hw: &mut dyn ActuatorPort,
        sink: &mut dyn PropertySink,
    ) {
        let level = if self.timeprop.invert() { !on } else { on };
        hw.set_relay(level);
        hw.set_indicator(!level);
        sink.publish("on", PropertyValue::Bool(on));
        sink.publish("state", PropertyValue::Uint(u32::from(on)));
    }
}
