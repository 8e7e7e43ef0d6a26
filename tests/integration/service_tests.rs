//! Integration tests for the PerceptionService → RangeEngine → EventSink
//! pipeline, driven by scripted range traces.

use stepaware_range::app::commands::PerceptionCommand;
use stepaware_range::app::events::PerceptionEvent;
use stepaware_range::app::ports::ClockPort;
use stepaware_range::sensors::SensorStatus;
use stepaware_range::sensors::direction::Direction;
use stepaware_range::sensors::presence::{MotionEvent, PresencePhase};
use stepaware_range::{PerceptionConfig, PerceptionService, SensorError, TriggerMode};

use crate::mock_hw::{Reading, RecordingSink, ScriptedRange, SimClock};

fn service(window: u8, threshold: u32) -> PerceptionService {
    PerceptionService::new(PerceptionConfig {
        sample_window_size: window,
        detection_threshold_mm: threshold,
        ..PerceptionConfig::default()
    })
}

#[test]
fn run_cycles_polls_once_per_interval() {
    let mut svc = service(5, 1500);
    let clock = SimClock::starting_at(0);
    let mut delay = clock.delay();
    let mut sink = RecordingSink::new();
    let mut range = ScriptedRange::looping([2500u32]);

    let polled = svc.run_cycles(&mut range, &clock, &mut sink, &mut delay, 10);

    assert_eq!(polled, 10);
    assert_eq!(svc.poll_count(), 10);
    assert_eq!(range.position(), 10);
    assert_eq!(clock.now_ms(), 600);
    assert_eq!(delay.slept_ns, 600 * 1_000_000);
    assert_eq!(svc.status().filtered_mm, 2500);
}

#[test]
fn ticks_between_intervals_do_not_poll() {
    let mut svc = service(5, 1500);
    let clock = SimClock::starting_at(1_000);
    let mut sink = RecordingSink::new();
    let mut range = ScriptedRange::looping([2500u32]);

    assert!(svc.tick(&mut range, &clock, &mut sink));
    for _ in 0..5 {
        clock.advance(10);
        assert!(!svc.tick(&mut range, &clock, &mut sink));
    }
    clock.advance(10);
    assert!(svc.tick(&mut range, &clock, &mut sink));
    assert_eq!(range.position(), 2);
}

#[test]
fn sudden_appearance_through_the_service() {
    let mut svc = service(3, 800);
    let clock = SimClock::starting_at(0);
    let mut delay = clock.delay();
    let mut sink = RecordingSink::new();
    let mut range = ScriptedRange::once([2000u32, 2000, 2000, 300, 300, 300, 300, 300]);

    svc.start(&mut sink);
    svc.run_cycles(&mut range, &clock, &mut sink, &mut delay, 8);

    assert_eq!(sink.events[0], PerceptionEvent::Started(SensorStatus::default()));
    assert!(sink.events.contains(&PerceptionEvent::Wiped {
        from_mm: 2000,
        to_mm: 300
    }));
    assert!(sink.events.contains(&PerceptionEvent::DirectionChanged {
        from: Direction::Unknown,
        to: Direction::Approaching
    }));
    assert!(sink.events.contains(&PerceptionEvent::PhaseChanged {
        from: PresencePhase::Neutral,
        to: PresencePhase::SuddenAppearance
    }));

    // One person, one crossing: fired when the sudden-appearance phase is
    // entered, never cleared while they stand in the band.
    assert_eq!(sink.crossings().len(), 1, "events: {:?}", sink.events);
    assert_eq!(sink.clears(), 0);
    let last = sink.crossings().last().copied().cloned();
    match last {
        Some(PerceptionEvent::ThresholdCrossed {
            distance_mm,
            direction,
            count,
            at_ms,
        }) => {
            assert_eq!(distance_mm, 300);
            assert_eq!(direction, Direction::Approaching);
            assert_eq!(count, svc.status().event_count);
            assert_eq!(at_ms, 5 * 60);
        }
        other => panic!("expected a crossing, got {other:?}"),
    }

    let status = svc.status();
    assert!(status.object_detected);
    assert_eq!(status.phase, PresencePhase::SuddenAppearance);
    assert_eq!(status.last_event, MotionEvent::ThresholdCrossed);
}

#[test]
fn sensor_faults_hold_the_last_estimate() {
    let mut svc = service(3, 800);
    let clock = SimClock::starting_at(0);
    let mut delay = clock.delay();
    let mut sink = RecordingSink::new();
    let mut range = ScriptedRange::once([
        Reading::Distance(1200),
        Reading::Distance(1200),
        Reading::Distance(1200),
        Reading::Fault(SensorError::Timeout),
        Reading::Fault(SensorError::BusFault),
    ]);

    svc.run_cycles(&mut range, &clock, &mut sink, &mut delay, 7);

    assert_eq!(range.faults(), 4);
    assert_eq!(
        svc.engine().last_fault(),
        Some(stepaware_range::Error::Sensor(SensorError::NoEcho))
    );
    assert_eq!(svc.status().filtered_mm, 1200);
    assert_eq!(svc.engine().raw_history().invalid(), 4);
    assert!(sink.crossings().is_empty());
}

#[test]
fn replace_command_applies_new_window_and_threshold() {
    let mut svc = service(5, 1500);
    let clock = SimClock::starting_at(0);
    let mut sink = RecordingSink::new();
    let mut range = ScriptedRange::looping([2500u32]);
    svc.tick(&mut range, &clock, &mut sink);
    assert_eq!(svc.engine().window().len(), 1);

    svc.handle_command(PerceptionCommand::Replace(PerceptionConfig {
        sample_window_size: 9,
        detection_threshold_mm: 1000,
        direction_trigger_mode: TriggerMode::Both,
        ..PerceptionConfig::default()
    }));

    let cfg = svc.engine().config();
    assert_eq!(cfg.sample_window_size, 9);
    assert_eq!(cfg.detection_threshold_mm, 1000);
    assert_eq!(cfg.direction_trigger_mode, TriggerMode::Both);
    assert_eq!(svc.engine().window().len(), 0);
    assert_eq!(svc.status().filtered_mm, 0);
}

#[test]
fn out_of_range_commands_are_clamped() {
    let mut svc = service(5, 1500);
    svc.handle_command(PerceptionCommand::SetWindowSize(200));
    svc.handle_command(PerceptionCommand::SetDistanceRange {
        min_mm: 100,
        max_mm: 1000,
    });
    svc.handle_command(PerceptionCommand::SetSampleInterval(0));

    let cfg = svc.engine().config();
    assert_eq!(usize::from(cfg.sample_window_size), stepaware_range::config::MAX_SAMPLE_WINDOW_SIZE);
    assert_eq!(cfg.detection_threshold_mm, 1000);
    assert_eq!(cfg.sample_interval_ms, 1);
}

#[test]
fn log_sink_receives_every_event() {
    use stepaware_range::adapters::log_sink::LogEventSink;

    let mut svc = service(3, 800);
    let clock = SimClock::starting_at(0);
    let mut delay = clock.delay();
    let mut sink = LogEventSink::new();
    let mut range = ScriptedRange::once([2000u32, 2000, 2000, 300, 300, 300]);

    svc.start(&mut sink);
    svc.run_cycles(&mut range, &clock, &mut sink, &mut delay, 6);

    // Started, Wiped, DirectionChanged, PhaseChanged, ThresholdCrossed.
    assert_eq!(sink.emitted(), 5);
}
