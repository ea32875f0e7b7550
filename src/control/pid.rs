//! Proportional-band PID controller.
//!
//! Converts (setpoint, process value, time) into a power fraction in
//! `[0, 1]`. Gains are expressed in process-engineering terms rather than
//! raw coefficients: a proportional band in process units, and integral /
//! derivative time constants in seconds. Every parameter is live-tunable
//! without disturbing the accumulated state, so the loop can be adjusted
//! remotely while it runs.
//!
//! ## Fail-safe behaviour
//!
//! If no process value arrives within `max_interval` seconds the controller
//! stops trusting its state and outputs `manual_power` instead. The same
//! output is used in manual mode and before the first sample arrives.

/// PID controller with proportional-band parameterisation.
pub struct PidController {
    // Parameters
    setpoint: f32,
    prop_band: f32,
    /// Integral time constant (seconds). 0 disables the integral term.
    t_integral: f32,
    /// Derivative time constant (seconds). 0 disables the derivative term.
    t_derivative: f32,
    /// Integral preset applied at initialise/reset, as a power fraction.
    initial_integral: f32,
    /// Max seconds between samples before the fallback engages. 0 disables.
    max_interval: u32,
    /// Derivative low-pass factor; filter time constant is
    /// `t_derivative / smooth_factor`. 0 disables filtering.
    smooth_factor: f32,
    mode_auto: bool,
    manual_power: f32,

    // State
    pv: f32,
    last_sample_secs: Option<u32>,
    /// Accumulated integral in process units, clamped to `[0, prop_band]`
    /// so its power contribution stays within `[0, 1]`.
    integral: f32,
    prev_error: f32,
    /// Smoothed rate of change of the error (process units per second).
    derivative: f32,
}

impl PidController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        setpoint: f32,
        prop_band: f32,
        t_integral: f32,
        t_derivative: f32,
        initial_integral: f32,
        max_interval: u32,
        smooth_factor: f32,
        mode_auto: bool,
        manual_power: f32,
    ) -> Self {
        let mut pid = Self {
            setpoint,
            prop_band,
            t_integral,
            t_derivative,
            initial_integral,
            max_interval,
            smooth_factor,
            mode_auto,
            manual_power,
            pv: 0.0,
            last_sample_secs: None,
            integral: 0.0,
            prev_error: 0.0,
            derivative: 0.0,
        };
        pid.reset();
        pid
    }

    /// Discard accumulated state and re-seed the integral from
    /// `initial_integral`. The preset is scaled by the proportional band so
    /// that the integral contribution at boot equals the configured power
    /// fraction.
    pub fn reset(&mut self) {
        self.integral = self.initial_integral * self.prop_band.max(0.0);
        self.prev_error = 0.0;
        self.derivative = 0.0;
        self.last_sample_secs = None;
    }

    /// Record a new process-value sample taken at `now_secs`.
    ///
    /// Updates the integral accumulator by `error * dt / t_integral` and the
    /// smoothed derivative estimate. Does not produce an output — call
    /// [`tick`](Self::tick) for that.
    pub fn set_process_value(&mut self, value: f32, now_secs: u32) {
        let error = self.setpoint - value;

        if let Some(last) = self.last_sample_secs {
            let dt = now_secs.wrapping_sub(last) as f32;
            if dt > 0.0 {
                if self.t_integral > 0.0 {
                    self.integral += error * dt / self.t_integral;
                    // Windup clamp: contribution stays within [0, 1].
                    self.integral = self.integral.clamp(0.0, self.prop_band.max(0.0));
                }

                let raw_derivative = (error - self.prev_error) / dt;
                if self.t_derivative > 0.0 && self.smooth_factor > 0.0 {
                    // Single-pole low-pass at t_derivative / smooth_factor.
                    let tc = self.t_derivative / self.smooth_factor;
                    let alpha = dt / (tc + dt);
                    self.derivative += (raw_derivative - self.derivative) * alpha;
                } else {
                    self.derivative = raw_derivative;
                }
            }
        }

        self.pv = value;
        self.prev_error = error;
        self.last_sample_secs = Some(now_secs);
    }

    /// Compute the power demand at `now_secs`. Returns a fraction in
    /// `[0, 1]`.
    pub fn tick(&self, now_secs: u32) -> f32 {
        let fallback = self.manual_power.clamp(0.0, 1.0);

        // No sample yet, or the sensor has gone quiet: fail safe.
        let Some(last) = self.last_sample_secs else {
            return fallback;
        };
        if self.max_interval != 0 && now_secs.wrapping_sub(last) > self.max_interval {
            return fallback;
        }

        if !self.mode_auto {
            return fallback;
        }

        // Setpoint may have moved since the sample arrived.
        let error = self.setpoint - self.pv;

        if self.prop_band == 0.0 {
            // Degenerate proportional band: bang-bang on the error sign.
            return if error > 0.0 { 1.0 } else { 0.0 };
        }

        let proportional = error / self.prop_band;
        let integral = self.integral / self.prop_band;
        let derivative = self.t_derivative * self.derivative / self.prop_band;

        (proportional + integral - derivative).clamp(0.0, 1.0)
    }

    // ── Live-tunable setters ──────────────────────────────────
    //
    // None of these reset the integral or derivative history; a running
    // loop keeps its accumulated state across retunes.

    pub fn set_setpoint(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    pub fn set_prop_band(&mut self, prop_band: f32) {
        self.prop_band = prop_band;
    }

    pub fn set_integral_time(&mut self, t_integral: f32) {
        self.t_integral = t_integral;
    }

    pub fn set_derivative_time(&mut self, t_derivative: f32) {
        self.t_derivative = t_derivative;
    }

    /// Takes effect at the next [`reset`](Self::reset), not immediately.
    pub fn set_initial_integral(&mut self, initial_integral: f32) {
        self.initial_integral = initial_integral;
    }

    pub fn set_max_interval(&mut self, max_interval: u32) {
        self.max_interval = max_interval;
    }

    pub fn set_derivative_smoothing(&mut self, smooth_factor: f32) {
        self.smooth_factor = smooth_factor;
    }

    pub fn set_auto_mode(&mut self, mode_auto: bool) {
        self.mode_auto = mode_auto;
    }

    pub fn set_manual_power(&mut self, manual_power: f32) {
        self.manual_power = manual_power;
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    pub fn is_auto(&self) -> bool {
        self.mode_auto
    }
}
