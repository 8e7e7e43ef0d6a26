//! Application core: pure domain logic, zero I/O.
//!
//! Wraps the [`RangeEngine`](crate::sensors::RangeEngine) in a service that
//! owns poll pacing and event fan-out. All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
