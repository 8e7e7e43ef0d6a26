//! Walk-through scenarios: a person approaching from the far end of the
//! hallway, and a person walking away from the sensor.

use stepaware_range::app::events::PerceptionEvent;
use stepaware_range::sensors::direction::Direction;
use stepaware_range::sensors::presence::PresencePhase;
use stepaware_range::{PerceptionConfig, PerceptionService, TriggerMode};

use crate::mock_hw::{RecordingSink, ScriptedRange, SimClock};

const INTERVAL_MS: u32 = 60;

/// Run `trace` through a fresh service, one poll per reading.
fn replay(config: PerceptionConfig, trace: &[u32]) -> (PerceptionService, RecordingSink) {
    let mut svc = PerceptionService::new(config);
    let clock = SimClock::starting_at(0);
    let mut delay = clock.delay();
    let mut sink = RecordingSink::new();
    let mut range = ScriptedRange::once(trace.iter().copied());
    let polled = svc.run_cycles(&mut range, &clock, &mut sink, &mut delay, trace.len() as u32);
    assert_eq!(polled as usize, trace.len());
    (svc, sink)
}

/// 4 m down to 0.5 m in 250 mm steps, then standing still.
fn approach_trace() -> Vec<u32> {
    let mut trace: Vec<u32> = (0..15).map(|i| 4000 - 250 * i).collect();
    trace.extend([500; 6]);
    trace
}

#[test]
fn gradual_approach_triggers_once_in_band() {
    // Large hysteresis keeps the window from being re-seeded so the
    // approach is seen through the median alone.
    let config = PerceptionConfig {
        wipe_hysteresis_mm: 4000,
        ..PerceptionConfig::default()
    };
    let (svc, sink) = replay(config, &approach_trace());

    let crossings = sink.crossings();
    assert_eq!(crossings.len(), 1, "events: {:?}", sink.events);
    assert_eq!(
        *crossings[0],
        PerceptionEvent::ThresholdCrossed {
            distance_mm: 1500,
            direction: Direction::Approaching,
            count: 1,
            at_ms: 12 * INTERVAL_MS,
        }
    );

    // The phase that was active when the crossing fired.
    let crossing_at = sink
        .position(|e| matches!(e, PerceptionEvent::ThresholdCrossed { .. }))
        .unwrap();
    let last_phase = sink.events[..crossing_at]
        .iter()
        .rev()
        .find_map(|e| match e {
            PerceptionEvent::PhaseChanged { to, .. } => Some(*to),
            _ => None,
        });
    assert_eq!(last_phase, Some(PresencePhase::GradualApproach));

    // The phase is entered once, after the approach is confirmed.
    let phase_changes: Vec<_> = sink
        .events
        .iter()
        .filter(|e| matches!(e, PerceptionEvent::PhaseChanged { .. }))
        .collect();
    assert_eq!(
        phase_changes,
        vec![&PerceptionEvent::PhaseChanged {
            from: PresencePhase::Neutral,
            to: PresencePhase::GradualApproach
        }]
    );

    // Standing still in the band clears the gradual-approach trigger.
    assert_eq!(sink.clears(), 1);
    assert!(!svc.status().object_detected);
    assert_eq!(svc.status().filtered_mm, 500);
    assert_eq!(svc.engine().wipe_count(), 0);
}

#[test]
fn gradual_approach_with_wipe_converges_early() {
    let (svc, sink) = replay(PerceptionConfig::default(), &approach_trace());

    assert!(svc.engine().wipe_count() >= 1);
    let wiped_to = sink.events.iter().find_map(|e| match e {
        PerceptionEvent::Wiped { to_mm, .. } => Some(*to_mm),
        _ => None,
    });
    assert_eq!(wiped_to, Some(1500));
    assert!(!sink.crossings().is_empty());
    assert_eq!(svc.status().filtered_mm, 500);
}

/// 0.5 m out to 3 m in 250 mm steps.
fn recede_trace() -> Vec<u32> {
    (0..11).map(|i| 500 + 250 * i).collect()
}

#[test]
fn receding_walker_never_triggers_in_approaching_mode() {
    let (svc, sink) = replay(PerceptionConfig::default(), &recede_trace());

    assert!(sink.crossings().is_empty(), "events: {:?}", sink.events);
    assert_eq!(svc.status().direction, Direction::Receding);
    assert_eq!(svc.status().phase, PresencePhase::Neutral);
    assert!(sink.events.contains(&PerceptionEvent::PhaseChanged {
        from: PresencePhase::SuddenAppearance,
        to: PresencePhase::Neutral
    }));
}

#[test]
fn receding_walker_triggers_when_both_directions_count() {
    let config = PerceptionConfig {
        direction_trigger_mode: TriggerMode::Both,
        ..PerceptionConfig::default()
    };
    let (svc, sink) = replay(config, &recede_trace());

    let crossings = sink.crossings();
    assert_eq!(crossings.len(), 1, "events: {:?}", sink.events);
    assert!(matches!(
        crossings[0],
        PerceptionEvent::ThresholdCrossed {
            direction: Direction::Receding,
            ..
        }
    ));
    // Walked out of the band again.
    assert_eq!(sink.clears(), 1);
    assert!(!svc.status().object_detected);
}

#[test]
fn empty_hallway_stays_quiet() {
    let (svc, sink) = replay(PerceptionConfig::default(), &[3200; 40]);
    assert!(sink.crossings().is_empty());
    assert_eq!(sink.clears(), 0);
    assert_eq!(svc.status().direction, Direction::Stationary);
    assert_eq!(svc.status().phase, PresencePhase::Neutral);
}
