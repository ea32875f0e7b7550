//! Relaystat host simulation — main entry point.
//!
//! Runs the full control loop against a simulated room at accelerated
//! time: 1 Hz scheduling ticks, a sensor poll every simulated minute, and
//! button polling at 20 ms, exactly the cadences a real device would use.
//! Mid-run the simulation scripts a remote setpoint change and a manual
//! button override to show both input paths end to end.
//!
//! ```text
//!  SimHardware ──▶ ┌────────────────────────────┐ ──▶ LogPropertySink
//!  (room model)    │       ControlService        │    (log + retained)
//!              ◀── │  PID · Timeprop · Button    │
//!                  └────────────────────────────┘
//! ```
//!
//! Usage: `relaystat-sim [simulated-seconds]` (default 7200).

use anyhow::{Context, Result};
use log::info;

use relaystat::adapters::sim::{LogPropertySink, SimHardware, SimRoom};
use relaystat::app::service::ControlService;
use relaystat::config::ControlConfig;

/// Ambient temperature of the simulated room (degrees C).
const SIM_AMBIENT_C: f32 = 16.0;
/// Temperature the room would reach with the heater held on.
const SIM_HEATER_ASYMPTOTE_C: f32 = 45.0;
/// Thermal time constant of the room (seconds).
const SIM_TIME_CONSTANT_S: f32 = 2400.0;

/// Simulated press duration for the scripted manual override (ms).
const SIM_PRESS_MS: u32 = 200;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let duration_secs: u32 = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid simulated duration '{arg}'"))?,
        None => 7200,
    };

    let config = ControlConfig::default();
    info!(
        "relaystat sim v{}: {duration_secs}s simulated, setpoint {}",
        env!("CARGO_PKG_VERSION"),
        config.setpoint
    );

    let mut hw = SimHardware::new(SimRoom::new(
        SIM_AMBIENT_C,
        SIM_HEATER_ASYMPTOTE_C,
        SIM_TIME_CONSTANT_S,
    ));
    let mut sink = LogPropertySink::new();
    let mut service = ControlService::new(config, 0);
    service.start(&mut hw, &mut sink);

    let mut on_seconds: u64 = 0;

    for now_secs in 0..duration_secs {
        // Plant physics for the elapsed second, then the control tick.
        hw.step_room(1.0);
        service.scheduled_tick(now_secs, &mut hw, &mut sink);

        // Button polling at 20 ms within the simulated second. The pin
        // idles high (active-low switch); the scripted press pulls it low
        // for SIM_PRESS_MS halfway through the run.
        let press_window = now_secs == duration_secs / 2;
        for slot in 0..50u32 {
            let now_ms = now_secs.wrapping_mul(1000).wrapping_add(slot * 20);
            let raw_level = !(press_window && slot * 20 < SIM_PRESS_MS);
            service.poll_button(now_ms, raw_level, &mut hw, &mut sink);
        }

        // Scripted remote retune a third of the way in.
        if now_secs == duration_secs / 3 {
            service.handle_remote_write("setpoint", "21", &mut hw, &mut sink);
        }

        if service.relay_on() {
            on_seconds += 1;
        }
    }

    info!(
        "simulation done: room {:.2} C, relay duty {:.1}%",
        hw.room_temperature_c(),
        100.0 * on_seconds as f64 / f64::from(duration_secs.max(1))
    );
    for (property, value) in sink.iter() {
        info!("retained {property} = {value}");
    }

    Ok(())
}
