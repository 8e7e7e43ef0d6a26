//! Inbound commands to the perception service.
//!
//! These represent runtime reconfiguration requested by the outside world
//! (serial console, web UI, stored settings) that the
//! [`PerceptionService`](super::service::PerceptionService) applies between
//! polls.

use crate::config::{PerceptionConfig, TriggerMode};

#[derive(Debug, Clone, PartialEq)]
pub enum PerceptionCommand {
    /// Change the median window length (resets window and direction state).
    SetWindowSize(u8),

    SetDetectionThreshold(u32),

    SetDistanceRange { min_mm: u32, max_mm: u32 },

    SetDirectionSensitivity(u32),

    SetTriggerMode(TriggerMode),

    SetSampleInterval(u32),

    SetDirectionDetection(bool),

    /// Time (ms) a direction must persist before it is confirmed.
    SetDirectionStability(u32),

    /// Hot-swap the whole configuration.
    Replace(PerceptionConfig),
}
