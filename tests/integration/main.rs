//! Integration tests for the control service → PID → converter → actuator
//! pipeline.
//!
//! These run on the host and verify the full closed loop — scheduling,
//! state transitions, manual override and remote writes — against mock
//! hardware, without any real peripherals.

mod mock_hw;
mod service_tests;
