//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter | Implements                 | Connects to                |
//! |---------|----------------------------|----------------------------|
//! | `time`  | monotonic clock source     | host `Instant`             |
//! | `sim`   | SensorPort, PropertySink   | simulated room + log output|

pub mod sim;
pub mod time;
