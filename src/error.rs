//! Unified error types for the range-perception core.
//!
//! The filtering pipeline itself never fails: missing readings are held over,
//! misconfiguration is clamped and outliers are absorbed. Errors only exist
//! at the edges, where a range-source adapter reports why a poll produced no
//! reading, or where a configuration blob cannot be parsed. All variants are
//! `Copy` so they can be logged and dropped without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The range source could not produce a reading.
    Sensor(SensorError),
    /// Configuration could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Reasons a range source returns no reading for a poll.
///
/// The engine treats every variant as "no valid reading this cycle"; the
/// distinction is for the adapter's own fault accounting and for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Pulse sent, no echo came back inside the listening window.
    NoEcho,
    /// The measurement did not complete in time.
    Timeout,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// Bus or register access to the sensor failed.
    BusFault,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEcho => write!(f, "no echo"),
            Self::Timeout => write!(f, "measurement timeout"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::BusFault => write!(f, "bus fault"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
