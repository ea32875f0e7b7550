//! Unified error types.
//!
//! The control algorithms themselves are infallible by construction —
//! malformed tuning input is rejected at the property-dispatch boundary
//! before it reaches a setter, and a rejected write is a local recovery,
//! never a fatal error. These types describe that boundary.

use core::fmt;

/// Why a remote property write was rejected.
///
/// Rejections are silent towards the remote side: the value is not applied
/// and nothing is republished. Locally they are logged at warn level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// The payload did not parse as the property's type.
    InvalidValue,
    /// The parsed value violates the property's range or a cross-parameter
    /// invariant (e.g. `dead_time < cycle_time`).
    OutOfRange,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue => write!(f, "value failed to parse"),
            Self::OutOfRange => write!(f, "value out of range"),
        }
    }
}
