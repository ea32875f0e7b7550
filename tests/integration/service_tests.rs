//! End-to-end tests for [`ControlService`] against mock hardware.

use relaystat::app::service::ControlService;
use relaystat::config::ControlConfig;

use crate::mock_hw::{MockHardware, RecordingSink};

/// Default config with the controller pinned to manual mode at the given
/// power, which makes the demanded duty cycle deterministic.
fn manual_config(manual_power: f32) -> ControlConfig {
    ControlConfig {
        mode_auto: false,
        manual_power,
        ..ControlConfig::default()
    }
}

fn started(
    config: ControlConfig,
    now: u32,
    sample: Option<f32>,
) -> (ControlService, MockHardware, RecordingSink) {
    let mut hw = MockHardware::new();
    hw.sample = sample;
    let mut sink = RecordingSink::new();
    let mut service = ControlService::new(config, now);
    service.start(&mut hw, &mut sink);
    (service, hw, sink)
}

/// Simulate one full button press of `held_ms`, polled every 20 ms.
/// The pin is active-low: pressed = raw low.
fn press_button(
    service: &mut ControlService,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    start_ms: u32,
    held_ms: u32,
) {
    let mut t = start_ms;
    while t.wrapping_sub(start_ms) < held_ms {
        service.poll_button(t, false, hw, sink);
        t = t.wrapping_add(20);
    }
    service.poll_button(start_ms.wrapping_add(held_ms), true, hw, sink);
}

// ── Duty cycling ──────────────────────────────────────────────

#[test]
fn half_power_cycles_thirty_of_sixty_seconds() {
    // cycle 60 s, dead time 0, fixed 50% power.
    let (mut service, mut hw, mut sink) = started(manual_config(0.5), 0, Some(19.5));

    let mut states = Vec::new();
    for t in 0..240u32 {
        service.scheduled_tick(t, &mut hw, &mut sink);
        states.push(service.relay_on());
    }

    // First cycle has no latched demand yet; from the second boundary on,
    // 30 s on then 30 s off, repeating.
    for (t, on) in states.iter().enumerate().skip(60) {
        let phase = (t as u32) % 60;
        assert_eq!(*on, phase < 30, "unexpected relay state at t={t}");
    }
}

#[test]
fn state_change_publishes_held_duration() {
    // 90 s cycle at 50% power, service booted at t=10: the converter's
    // first boundary lands at t=100 (on for 45 s) and the relay drops out
    // again at t=145.
    let config = ControlConfig {
        cycle_time: 90,
        ..manual_config(0.5)
    };
    let (mut service, mut hw, mut sink) = started(config, 10, Some(19.5));

    let mut transitions = Vec::new();
    let mut prev = service.relay_on();
    for t in 10..=150u32 {
        service.scheduled_tick(t, &mut hw, &mut sink);
        if service.relay_on() != prev {
            prev = service.relay_on();
            transitions.push((t, prev, sink.last("statetime").unwrap().to_string()));
        }
    }

    assert_eq!(
        transitions,
        vec![
            (100, true, "90".to_string()),
            (145, false, "45".to_string()),
        ]
    );
}

// ── Manual override button ────────────────────────────────────

#[test]
fn qualifying_press_toggles_exactly_once() {
    let (mut service, mut hw, mut sink) = started(ControlConfig::default(), 0, None);
    service.scheduled_tick(0, &mut hw, &mut sink);
    assert!(!service.relay_on());

    let relay_writes_before = hw.relay_writes.len();
    press_button(&mut service, &mut hw, &mut sink, 1000, 200);
    assert!(service.relay_on(), "press must toggle the relay on");
    assert_eq!(hw.relay_writes.len(), relay_writes_before + 1);

    // A stuck-released pin produces no further toggles.
    for t in 0..10u32 {
        service.poll_button(1300 + t * 20, true, &mut hw, &mut sink);
    }
    assert!(service.relay_on());

    // A second qualifying press toggles back off.
    press_button(&mut service, &mut hw, &mut sink, 2000, 200);
    assert!(!service.relay_on());
}

#[test]
fn out_of_window_presses_are_ignored() {
    let (mut service, mut hw, mut sink) = started(ControlConfig::default(), 0, None);
    service.scheduled_tick(0, &mut hw, &mut sink);

    press_button(&mut service, &mut hw, &mut sink, 1000, 50);
    assert!(!service.relay_on(), "50 ms is contact bounce");

    press_button(&mut service, &mut hw, &mut sink, 3000, 901);
    assert!(!service.relay_on(), "901 ms is past the inclusive window");

    press_button(&mut service, &mut hw, &mut sink, 6000, 900);
    assert!(service.relay_on(), "900 ms is still within the window");
}

#[test]
fn manual_override_yields_to_next_duty_decision() {
    // With zero demand the converter asks for off every tick; a manual
    // toggle holds only until the next duty decision.
    let (mut service, mut hw, mut sink) = started(ControlConfig::default(), 0, None);
    service.scheduled_tick(0, &mut hw, &mut sink);

    press_button(&mut service, &mut hw, &mut sink, 1000, 200);
    assert!(service.relay_on());

    service.scheduled_tick(1, &mut hw, &mut sink);
    assert!(!service.relay_on());
}

// ── Startup publication ───────────────────────────────────────

#[test]
fn start_publishes_boot_parameter_set() {
    let (_service, _hw, sink) = started(ControlConfig::default(), 0, None);

    assert_eq!(sink.last("unit"), Some("c"));
    assert_eq!(sink.last("on"), Some("false"));
    assert_eq!(sink.last("state"), Some("0"));
    assert_eq!(sink.last("setpoint"), Some("19.5"));
    assert_eq!(sink.last("propband"), Some("5"));
    assert_eq!(sink.last("integraltime"), Some("1800"));
    assert_eq!(sink.last("cycletime"), Some("60"));
    assert_eq!(sink.last("maxupdateinterval"), Some("120"));
    assert_eq!(sink.last("auto"), Some("true"));
}

#[test]
fn sensor_runs_on_its_own_schedule() {
    let (mut service, mut hw, mut sink) = started(ControlConfig::default(), 0, Some(19.5));
    for t in 0..=180u32 {
        service.scheduled_tick(t, &mut hw, &mut sink);
    }
    // Polled at t=0, 60, 120, 180.
    assert_eq!(hw.sample_requests, 4);
    assert_eq!(sink.count("degrees"), 4);
}

// ── Remote writes ─────────────────────────────────────────────

#[test]
fn remote_setpoint_write_applies_and_republishes() {
    let (mut service, mut hw, mut sink) = started(ControlConfig::default(), 0, Some(19.5));
    service.scheduled_tick(0, &mut hw, &mut sink);

    service.handle_remote_write("SetPoint", "21", &mut hw, &mut sink);
    assert!((service.current_config().setpoint - 21.0).abs() < 1e-6);
    assert_eq!(sink.last("setpoint"), Some("21"));

    // The retune recomputes without waiting for a new sample:
    // error 1.5 over a band of 5 plus the 0.5 integral preset.
    service.scheduled_tick(1, &mut hw, &mut sink);
    assert_eq!(sink.last("power"), Some("0.8"));
}

#[test]
fn malformed_or_out_of_range_writes_are_rejected_silently() {
    let (mut service, mut hw, mut sink) = started(ControlConfig::default(), 0, None);
    let published_before = sink.published.len();

    service.handle_remote_write("setpoint", "warm", &mut hw, &mut sink);
    service.handle_remote_write("manualpower", "1.5", &mut hw, &mut sink);
    service.handle_remote_write("cycletime", "0", &mut hw, &mut sink);
    service.handle_remote_write("deadtime", "60", &mut hw, &mut sink);
    service.handle_remote_write("frequency", "50", &mut hw, &mut sink);

    assert_eq!(sink.published.len(), published_before, "nothing republished");
    let config = service.current_config();
    assert!((config.setpoint - 19.5).abs() < 1e-6);
    assert!((config.manual_power - 0.0).abs() < 1e-6);
    assert_eq!(config.cycle_time, 60);
    assert_eq!(config.dead_time, 0);
}

#[test]
fn remote_on_write_drives_the_relay() {
    let (mut service, mut hw, mut sink) = started(ControlConfig::default(), 0, None);
    service.scheduled_tick(0, &mut hw, &mut sink);

    service.handle_remote_write("on", "true", &mut hw, &mut sink);
    assert!(service.relay_on());
    assert_eq!(sink.last("on"), Some("true"));
    assert_eq!(hw.last_relay_level(), Some(true));

    // Same-state write confirms without another pin write.
    let writes = hw.relay_writes.len();
    service.handle_remote_write("on", "true", &mut hw, &mut sink);
    assert_eq!(hw.relay_writes.len(), writes);
    assert_eq!(sink.last("on"), Some("true"));

    // The switch payload is strict: only literal true/false.
    service.handle_remote_write("on", "1", &mut hw, &mut sink);
    assert!(service.relay_on(), "malformed payload leaves the state alone");
}

#[test]
fn inverted_output_swaps_electrical_sense() {
    let (mut service, mut hw, mut sink) = started(ControlConfig::default(), 0, None);
    service.scheduled_tick(0, &mut hw, &mut sink);

    service.handle_remote_write("invert", "true", &mut hw, &mut sink);
    service.handle_remote_write("on", "true", &mut hw, &mut sink);

    assert!(service.relay_on(), "logical state is on");
    assert_eq!(hw.last_relay_level(), Some(false), "electrical level is inverted");
    assert_eq!(hw.indicator_writes.last(), Some(&true));
}

// ── Fail-safe behaviour ───────────────────────────────────────

#[test]
fn stale_process_value_forces_manual_power() {
    let config = ControlConfig {
        manual_power: 1.0,
        ..ControlConfig::default()
    };
    let (mut service, mut hw, mut sink) = started(config, 0, Some(19.5));

    // One good sample at t=0, then the probe dies.
    service.scheduled_tick(0, &mut hw, &mut sink);
    hw.sample = None;

    for t in 1..=420u32 {
        service.scheduled_tick(t, &mut hw, &mut sink);
    }

    // Past max_interval (300 s) the PID emits the fallback power, and the
    // next cycle boundary latches a full-on duty cycle.
    assert_eq!(sink.last("power"), Some("1"));
    assert!(service.relay_on(), "fallback power must drive the relay on");
}
