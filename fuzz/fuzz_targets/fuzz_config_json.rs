//! Fuzz target: `PerceptionConfig::from_json`
//!
//! Arbitrary bytes must either fail to parse or produce a configuration
//! that is already normalized.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use stepaware_range::PerceptionConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = PerceptionConfig::from_json(text) {
        assert_eq!(config.clone().normalized(), config);
        assert!(config.detection_threshold_mm <= config.max_distance_mm);
    }
});
