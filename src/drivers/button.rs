//! Polled pushbutton debouncer for the manual override switch.
//!
//! ## Hardware
//!
//! Active-low momentary switch with external pull-up. No interrupts: the
//! main loop samples the pin and feeds the raw level into [`poll`] at a
//! fixed cadence. The poll period must stay under ~45 ms so a press at the
//! 90 ms lower bound is seen by at least two samples.
//!
//! ## Acceptance window
//!
//! A press qualifies when it is held between 90 ms and 900 ms, both ends
//! inclusive. Shorter is treated as contact bounce, longer as a deliberate
//! hold (reserved for other functions, e.g. factory reset). Each qualifying
//! press yields exactly one [`ButtonEvent::Toggle`], no matter how the poll
//! timing lands.
//!
//! [`poll`]: ButtonDebouncer::poll

/// Inclusive lower bound of the acceptance window (milliseconds).
const PRESS_MIN_MS: u32 = 90;
/// Inclusive upper bound of the acceptance window (milliseconds).
const PRESS_MAX_MS: u32 = 900;

/// Events emitted after press classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// A qualifying press was released: toggle the actuator once.
    Toggle,
}

/// Debounce state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Idle,
    Pressed { since_ms: u32 },
}

/// Press-window debouncer. One instance per physical button; all state
/// lives here so independent instances never interact.
pub struct ButtonDebouncer {
    state: DebounceState,
    /// Set once a press has produced its toggle; cleared on the next
    /// press edge. Guarantees at most one event per press.
    handled: bool,
}

impl ButtonDebouncer {
    pub fn new() -> Self {
        Self {
            state: DebounceState::Idle,
            handled: false,
        }
    }

    /// Feed one sample of the logical button level.
    ///
    /// `pressed` is true while the button is held (the caller resolves the
    /// active-low electrical sense). `now_ms` comes from a free-running
    /// millisecond counter; wraparound is handled.
    pub fn poll(&mut self, now_ms: u32, pressed: bool) -> Option<ButtonEvent> {
        match self.state {
            DebounceState::Idle => {
                if pressed {
                    self.state = DebounceState::Pressed { since_ms: now_ms };
                    self.handled = false;
                }
                None
            }
            DebounceState::Pressed { since_ms } => {
                if pressed {
                    return None;
                }
                self.state = DebounceState::Idle;

                let held_ms = now_ms.wrapping_sub(since_ms);
                if (PRESS_MIN_MS..=PRESS_MAX_MS).contains(&held_ms) && !self.handled {
                    self.handled = true;
                    return Some(ButtonEvent::Toggle);
                }
                None
            }
        }
    }

    /// Whether the button is currently in the pressed state.
    pub fn is_pressed(&self) -> bool {
        matches!(self.state, DebounceState::Pressed { .. })
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
