//! Control algorithms — pure math, zero I/O.

pub mod pid;
pub mod timeprop;
