//! Time-proportioning duty-cycle converter.
//!
//! Turns a continuous power fraction into an on/off signal for a relay-type
//! actuator by varying how much of a fixed-length cycle is spent on. The
//! demanded power is latched at each cycle boundary, so output changes are
//! realised at most once per cycle.
//!
//! Dead-time compensation shortens each on-pulse by the actuator's action
//! time. If the power demand stops being refreshed, the converter swaps in
//! a configured fallback power at the next cycle boundary.

/// Converts a power fraction into a binary actuation signal.
pub struct TimepropConverter {
    // Parameters
    /// Cycle length in seconds. Must be > 0.
    cycle_time: u32,
    /// Actuator action time in seconds, subtracted from each on-pulse.
    dead_time: u32,
    /// Swap the electrical sense of the output at the point of application.
    invert: bool,
    /// Power used when the demand goes stale.
    fallback_power: f32,
    /// Max seconds between power updates before the fallback engages.
    /// 0 disables the fallback.
    max_update_interval: u32,

    // State
    power: f32,
    last_power_update_secs: u32,
    cycle_start_secs: u32,
    /// On-duration latched for the active cycle, in `[0, cycle_time]`.
    on_time_secs: u32,
}

impl TimepropConverter {
    /// Create the converter and open the first cycle at `now_secs`.
    pub fn new(
        cycle_time: u32,
        dead_time: u32,
        invert: bool,
        fallback_power: f32,
        max_update_interval: u32,
        now_secs: u32,
    ) -> Self {
        Self {
            cycle_time,
            dead_time,
            invert,
            fallback_power,
            max_update_interval,
            power: 0.0,
            last_power_update_secs: now_secs,
            cycle_start_secs: now_secs,
            on_time_secs: 0,
        }
    }

    /// Store a new power demand. The output does not change until the next
    /// cycle boundary computed by [`tick`](Self::tick).
    pub fn set_power(&mut self, power: f32, now_secs: u32) {
        self.power = power.clamp(0.0, 1.0);
        self.last_power_update_secs = now_secs;
    }

    /// Advance the converter to `now_secs` and return the logical demand.
    ///
    /// At each cycle boundary the latest power (or the fallback, if the
    /// demand is stale) is converted to an on-duration:
    /// `clamp(round(power * cycle_time) - dead_time, 0, cycle_time)`.
    /// Within a cycle the output is a pure function of the elapsed time and
    /// that latched duration.
    pub fn tick(&mut self, now_secs: u32) -> bool {
        if now_secs.wrapping_sub(self.cycle_start_secs) >= self.cycle_time {
            self.cycle_start_secs = now_secs;

            let power = if self.max_update_interval != 0
                && now_secs.wrapping_sub(self.last_power_update_secs) > self.max_update_interval
            {
                self.fallback_power.clamp(0.0, 1.0)
            } else {
                self.power
            };

            let on = (power * self.cycle_time as f32).round() as i64 - i64::from(self.dead_time);
            self.on_time_secs = on.clamp(0, i64::from(self.cycle_time)) as u32;
        }

        now_secs.wrapping_sub(self.cycle_start_secs) < self.on_time_secs
    }

    /// Whether the electrical output is inverted relative to the logical
    /// demand. Applied by the caller when driving the actuator.
    pub fn invert(&self) -> bool {
        self.invert
    }

    // ── Live-tunable setters ──────────────────────────────────

    pub fn set_cycle_time(&mut self, cycle_time: u32) {
        self.cycle_time = cycle_time;
    }

    pub fn set_dead_time(&mut self, dead_time: u32) {
        self.dead_time = dead_time;
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    pub fn set_fallback_power(&mut self, fallback_power: f32) {
        self.fallback_power = fallback_power;
    }

    pub fn set_max_update_interval(&mut self, max_update_interval: u32) {
        self.max_update_interval = max_update_interval;
    }

    pub fn cycle_time(&self) -> u32 {
        self.cycle_time
    }

    pub fn dead_time(&self) -> u32 {
        self.dead_time
    }
}
