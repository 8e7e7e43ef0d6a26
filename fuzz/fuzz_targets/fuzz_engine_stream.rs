//! Fuzz target: `RangeEngine::update` over arbitrary reading streams
//!
//! The first byte picks the window size, the second the trigger mode; the
//! rest is consumed as little-endian `u16` distances.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Event count never decreases
//! - Filtered distance never exceeds the sensor maximum
//! - Window occupancy never exceeds the window size
//!
//! cargo fuzz run fuzz_engine_stream

#![no_main]

use libfuzzer_sys::fuzz_target;
use stepaware_range::{PerceptionConfig, RangeEngine, TriggerMode};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let (header, body) = data.split_at(2);

    let mut engine = RangeEngine::new(PerceptionConfig {
        sample_window_size: header[0],
        direction_trigger_mode: TriggerMode::from_raw(header[1]),
        ..PerceptionConfig::default()
    });

    let mut now = 0u32;
    let mut count = 0;
    for chunk in body.chunks_exact(2) {
        let raw = u32::from(u16::from_le_bytes([chunk[0], chunk[1]]));
        now = now.wrapping_add(60);
        let out = engine.update(raw, now);

        assert!(engine.event_count() >= count);
        count = engine.event_count();
        assert!(out.filtered_mm <= engine.config().max_distance_mm);
        assert!(engine.window().len() <= engine.window().size());
    }
});
