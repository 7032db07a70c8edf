//! Integration tests for the MonitorService → latches → publisher →
//! connectivity pipeline, driven cycle by cycle against mock adapters.

use std::time::Duration;

use machmon::app::connectivity::ConnectionState;
use machmon::app::service::{MonitorService, Phase};
use machmon::config::{SystemConfig, TopicScheme};
use machmon::latch::{Condition, Edge, StateEvent};
use machmon::latch::sample::Sample;

use super::mock_hw::{MockConn, MockInputs, MockLink, RecordingDelay, mock_conn};

fn pair(topic: &str, payload: &str) -> (String, String) {
    (topic.to_owned(), payload.to_owned())
}

/// Service on an up link with both inputs LOW.
fn make_service() -> (MonitorService, MockInputs, MockConn, RecordingDelay) {
    let service = MonitorService::new(&SystemConfig::default()).unwrap();
    let inputs = MockInputs::new();
    let conn = mock_conn(MockLink::up());
    (service, inputs, conn, RecordingDelay::default())
}

fn booted() -> (MonitorService, MockInputs, MockConn, RecordingDelay) {
    let (mut svc, inputs, mut conn, mut delay) = make_service();
    svc.boot(&mut conn, &mut delay);
    delay.waits.clear();
    (svc, inputs, conn, delay)
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn boot_brings_up_session_and_enters_running() {
    let (mut svc, _inputs, mut conn, mut delay) = make_service();
    assert_eq!(svc.phase(), Phase::Booting);

    svc.boot(&mut conn, &mut delay);

    assert_eq!(svc.phase(), Phase::Running);
    assert_eq!(conn.state(), ConnectionState::SessionUp);
    assert_eq!(conn.session().connects, 1);
    assert!(delay.waits.is_empty());
}

#[test]
fn boot_waits_for_link_then_paces_session_at_five_seconds() {
    let mut svc = MonitorService::new(&SystemConfig::default()).unwrap();
    let mut conn = mock_conn(MockLink::down(3));
    conn.session_mut().fail_connects = 2;
    let mut delay = RecordingDelay::default();

    svc.boot(&mut conn, &mut delay);

    assert_eq!(conn.link().begins, 1);
    let (link_waits, session_waits) = delay.waits.split_at(3);
    assert!(link_waits.iter().all(|d| *d == Duration::from_secs(1)));
    assert_eq!(session_waits, &[Duration::from_secs(5); 2]);
    assert_eq!(conn.session().connects, 3);
}

// ── Edge sequences ────────────────────────────────────────────

#[test]
fn forward_on_hold_then_off_with_idle_on() {
    let (mut svc, mut io, mut conn, mut delay) = booted();

    io.set(true, false);
    let r = svc.cycle(&mut io, &mut conn, &mut delay);
    assert_eq!(r.events.as_slice(), &[StateEvent::new(Condition::Forward, Edge::On)]);
    assert_eq!(conn.session_mut().take(), vec![pair("fanuc/R01/ON", "true")]);

    let r = svc.cycle(&mut io, &mut conn, &mut delay);
    assert!(r.events.is_empty());
    assert!(conn.session_mut().take().is_empty());

    io.set(false, false);
    svc.cycle(&mut io, &mut conn, &mut delay);
    assert_eq!(
        conn.session_mut().take(),
        vec![pair("fanuc/R01/ON", "false"), pair("fanuc/R12/OFF", "true")]
    );
}

#[test]
fn idle_to_reverse_publishes_idle_off_and_reverse_on() {
    let (mut svc, mut io, mut conn, mut delay) = booted();

    io.set(false, false);
    svc.cycle(&mut io, &mut conn, &mut delay);
    assert_eq!(conn.session_mut().take(), vec![pair("fanuc/R12/OFF", "true")]);

    io.set(false, true);
    svc.cycle(&mut io, &mut conn, &mut delay);
    // Reverse is evaluated before idle.
    assert_eq!(
        conn.session_mut().take(),
        vec![pair("fanuc/R02/ON", "true"), pair("fanuc/R12/OFF", "false")]
    );
    assert!(svc.is_active(Condition::Reverse));
    assert!(!svc.is_active(Condition::Idle));
}

#[test]
fn both_lines_high_activates_reverse_only() {
    let (mut svc, mut io, mut conn, mut delay) = booted();
    io.set(true, true);
    svc.cycle(&mut io, &mut conn, &mut delay);
    assert_eq!(conn.session_mut().take(), vec![pair("fanuc/R02/ON", "true")]);
    assert!(!svc.is_active(Condition::Forward));
}

#[test]
fn distinct_scheme_publishes_forward_off_on_its_own_topic() {
    let config = SystemConfig {
        topic_scheme: TopicScheme::Distinct,
        ..SystemConfig::default()
    };
    let mut svc = MonitorService::new(&config).unwrap();
    let mut conn = mock_conn(MockLink::up());
    let mut io = MockInputs::new();
    let mut delay = RecordingDelay::default();
    svc.boot(&mut conn, &mut delay);

    io.set(true, false);
    svc.cycle(&mut io, &mut conn, &mut delay);
    io.set(true, true);
    svc.cycle(&mut io, &mut conn, &mut delay);
    assert_eq!(
        conn.session_mut().take(),
        vec![
            pair("fanuc/R01/ON", "true"),
            pair("fanuc/R01/OFF", "false"),
            pair("fanuc/R02/ON", "true"),
        ]
    );
}

#[test]
fn every_rule_gets_a_fresh_sample() {
    let (mut svc, mut io, mut conn, mut delay) = booted();
    svc.cycle(&mut io, &mut conn, &mut delay);
    assert_eq!(io.reads, 6);
}

#[test]
fn line_change_between_rule_samples_is_not_corrected() {
    let (mut svc, mut io, mut conn, mut delay) = booted();
    // Forward sees (H,L); B rises before the reverse and idle samples.
    io.glitches.push_back(Sample::from_bits(true, false));
    io.set(true, true);
    svc.cycle(&mut io, &mut conn, &mut delay);
    assert!(svc.is_active(Condition::Forward));
    assert!(svc.is_active(Condition::Reverse));

    // The next clean sample settles it.
    svc.cycle(&mut io, &mut conn, &mut delay);
    assert!(!svc.is_active(Condition::Forward));
}

// ── Failure handling ──────────────────────────────────────────

#[test]
fn failed_publish_is_dropped_and_later_edges_still_flow() {
    let (mut svc, mut io, mut conn, mut delay) = booted();
    conn.session_mut().fail_publishes = 1;

    io.set(true, false);
    let r = svc.cycle(&mut io, &mut conn, &mut delay);
    assert_eq!((r.delivered, r.failed), (0, 1));
    assert!(svc.is_active(Condition::Forward));
    assert!(conn.session_mut().take().is_empty());

    // Unchanged input: nothing retried.
    svc.cycle(&mut io, &mut conn, &mut delay);
    assert!(conn.session_mut().take().is_empty());

    io.set(false, true);
    svc.cycle(&mut io, &mut conn, &mut delay);
    assert_eq!(
        conn.session_mut().take(),
        vec![pair("fanuc/R01/ON", "false"), pair("fanuc/R02/ON", "true")]
    );
    assert_eq!(svc.dropped(), 1);
    assert_eq!(svc.delivered(), 2);
    assert_eq!(conn.session().attempts, 3);
}

#[test]
fn session_loss_attempts_edge_once_then_reconnects_without_replay() {
    let (mut svc, mut io, mut conn, mut delay) = booted();
    conn.session_mut().connected = false;
    conn.session_mut().fail_connects = 2;

    io.set(false, false);
    let r = svc.cycle(&mut io, &mut conn, &mut delay);
    assert_eq!(r.events.len(), 1);
    assert_eq!(r.failed, 1);
    assert!(r.reconnected);
    assert_eq!(svc.phase(), Phase::Running);
    assert_eq!(delay.waits, vec![Duration::from_secs(1); 2]);
    assert_eq!(conn.session_losses(), 1);

    // Back online: the lost idle ON is not re-announced.
    let r = svc.cycle(&mut io, &mut conn, &mut delay);
    assert!(r.events.is_empty());
    assert!(!r.reconnected);
    assert!(conn.session_mut().take().is_empty());
    assert!(svc.is_active(Condition::Idle));
}

#[test]
fn session_loss_with_link_down_rejoins_link_first() {
    let (mut svc, mut io, mut conn, mut delay) = booted();
    conn.session_mut().connected = false;
    conn.link_mut().associated = false;
    conn.link_mut().join_after = 1;

    let r = svc.cycle(&mut io, &mut conn, &mut delay);
    assert!(r.reconnected);
    assert_eq!(conn.link().begins, 1);
    assert_eq!(conn.state(), ConnectionState::SessionUp);
}

#[test]
fn housekeeping_runs_every_cycle() {
    let (mut svc, mut io, mut conn, mut delay) = booted();
    for _ in 0..4 {
        svc.cycle(&mut io, &mut conn, &mut delay);
    }
    assert_eq!(conn.session().polls, 4);
    assert_eq!(svc.cycles(), 4);
}

// ── Determinism ───────────────────────────────────────────────

#[test]
fn identical_histories_produce_identical_events() {
    let history = [
        (false, false),
        (true, false),
        (true, false),
        (true, true),
        (false, true),
        (false, false),
        (true, false),
    ];

    let run = || {
        let (mut svc, mut io, mut conn, mut delay) = booted();
        for &(a, b) in &history {
            io.set(a, b);
            svc.cycle(&mut io, &mut conn, &mut delay);
        }
        conn.session_mut().take()
    };

    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
}
