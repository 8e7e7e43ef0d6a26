//! StepAware range-perception library.
//!
//! Turns a stream of raw distance readings into a filtered distance, a
//! debounced movement direction and edge-triggered presence events for the
//! hazard-warning layer. Everything here is pure logic that runs the same
//! on the device and on the host; hardware drivers plug in through the
//! traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod sensors;

pub use app::service::PerceptionService;
pub use config::{PerceptionConfig, TriggerMode};
pub use error::{Error, Result, SensorError};
pub use sensors::RangeEngine;
