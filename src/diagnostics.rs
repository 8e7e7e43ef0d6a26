//! Runtime diagnostics for the range-perception core.
//!
//! - [`RawHistory`] keeps the most recent raw readings exactly as the range
//!   source delivered them (including zeros for missed echoes), so a support
//!   dump can show what the filter was fed.
//! - [`ChangeGate`] suppresses repeated log lines. Each engine owns its own
//!   gates; nothing here is shared between instances.

use heapless::HistoryBuffer;

use crate::config::RAW_HISTORY_SIZE;

/// Ring of the last [`RAW_HISTORY_SIZE`] raw readings.
pub struct RawHistory {
    readings: HistoryBuffer<u32, RAW_HISTORY_SIZE>,
    invalid: u32,
    total: u32,
}

impl Default for RawHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RawHistory {
    pub fn new() -> Self {
        Self {
            readings: HistoryBuffer::new(),
            invalid: 0,
            total: 0,
        }
    }

    pub fn record(&mut self, raw: u32, valid: bool) {
        self.readings.write(raw);
        self.total = self.total.saturating_add(1);
        if !valid {
            self.invalid = self.invalid.saturating_add(1);
        }
    }

    /// Most recent raw reading.
    pub fn latest(&self) -> Option<u32> {
        self.readings.recent().copied()
    }

    /// Retained readings, oldest first.
    pub fn oldest_first(&self) -> impl Iterator<Item = u32> + '_ {
        self.readings.oldest_ordered().copied()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.len() == 0
    }

    /// Readings seen since construction.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Invalid readings seen since construction.
    pub fn invalid(&self) -> u32 {
        self.invalid
    }
}

/// Lets a value through only when it differs from the last one let through.
#[derive(Debug, Default)]
pub struct ChangeGate<T> {
    last: Option<T>,
}

impl<T: PartialEq + Copy> ChangeGate<T> {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Returns `Some(value)` if it changed since the previous call.
    pub fn changed(&mut self, value: T) -> Option<T> {
        if self.last == Some(value) {
            return None;
        }
        self.last = Some(value);
        Some(value)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
