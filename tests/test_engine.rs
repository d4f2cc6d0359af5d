//! Engine-level integration tests: event routing, reconciliation effects,
//! input gating, and reset semantics, observed through a recording sink.

mod common;

use calview::{LogStream, PushEvent, SessionState, StatusCode};
use calview_harness::{fixtures, SinkEvent};

#[test]
fn bulk_dump_then_live_entries_keep_the_bounded_suffix() {
    let mut engine = common::test_engine();
    let sink = common::sink();

    // 25 historical entries into a 10-entry monitor buffer.
    engine.apply_log_dump(LogStream::Monitor, fixtures::entries(25), &sink);
    assert_eq!(engine.buffer(LogStream::Monitor).len(), 10);

    // Live entries keep evicting oldest-first.
    for n in 25..30 {
        engine.handle_event(fixtures::log_event(n), &sink);
    }
    let buffer = engine.buffer(LogStream::Monitor);
    assert_eq!(buffer.len(), 10);
    let messages: Vec<_> = buffer.iter().map(|e| e.message.clone()).collect();
    let expected: Vec<_> = (20..30).map(|n| format!("entry {n}")).collect();
    assert_eq!(messages, expected);

    // The command buffer was untouched.
    assert!(engine.buffer(LogStream::Command).is_empty());
}

#[test]
fn progress_event_emits_aggregate_status_and_refetch_in_order() {
    let mut engine = common::test_engine();
    let sink = common::sink();

    engine.handle_event(
        fixtures::progress_event(&[("zscan", "1", StatusCode::Running)]),
        &sink,
    );

    let events = sink.events();
    let agg = events
        .iter()
        .position(|e| matches!(e, SinkEvent::AggregateChanged(..)))
        .expect("aggregate effect missing");
    let status = events
        .iter()
        .position(|e| matches!(e, SinkEvent::StatusChanged(..)))
        .expect("status effect missing");
    let refetch = events
        .iter()
        .position(|e| matches!(e, SinkEvent::RefetchRequested(..)))
        .expect("refetch effect missing");
    assert!(agg < status && status < refetch);

    assert_eq!(
        sink.status_changes(),
        vec![("zscan".to_string(), "1".to_string(), StatusCode::Running)]
    );
}

#[test]
fn unchanged_terminal_snapshot_is_clean_but_running_stays_dirty() {
    let mut engine = common::test_engine();
    let sink = common::sink();

    engine.handle_event(
        fixtures::progress_event(&[
            ("zscan", "1", StatusCode::Complete),
            ("zscan", "2", StatusCode::Running),
        ]),
        &sink,
    );
    sink.clear();

    // Redundant delivery of the same table: only the running cell re-fires.
    engine.handle_event(
        fixtures::progress_event(&[
            ("zscan", "1", StatusCode::Complete),
            ("zscan", "2", StatusCode::Running),
        ]),
        &sink,
    );
    assert_eq!(
        sink.status_changes(),
        vec![("zscan".to_string(), "2".to_string(), StatusCode::Running)]
    );
}

#[test]
fn detector_aggregates_roll_up_across_processes() {
    let mut engine = common::test_engine();
    let sink = common::sink();

    engine.handle_event(
        fixtures::progress_event(&[
            ("zscan", "7", StatusCode::Complete),
            ("pedestal", "7", StatusCode::Complete),
            ("adc", "7", StatusCode::Pending),
            ("daq", "7", StatusCode::Pending),
        ]),
        &sink,
    );
    let agg = engine.reconcile().aggregate("7");
    assert_eq!((agg.total, agg.completed, agg.running_now), (4, 2, false));

    // One of the four starts running: running_now flips regardless of the
    // completed count.
    engine.handle_event(
        fixtures::progress_event(&[
            ("zscan", "7", StatusCode::Complete),
            ("pedestal", "7", StatusCode::Complete),
            ("adc", "7", StatusCode::Running),
            ("daq", "7", StatusCode::Pending),
        ]),
        &sink,
    );
    let agg = engine.reconcile().aggregate("7");
    assert_eq!((agg.total, agg.completed, agg.running_now), (4, 2, true));
}

#[test]
fn wait_user_entry_requests_one_prompt_and_gates_inputs() {
    let mut engine = common::test_engine();
    let sink = common::sink();

    engine.handle_event(PushEvent::State(SessionState::Idle), &sink);
    assert!(engine.session().inputs_enabled());

    engine.handle_event(PushEvent::State(SessionState::WaitUser), &sink);
    engine.handle_event(PushEvent::State(SessionState::WaitUser), &sink);
    assert_eq!(sink.prompt_requests().len(), 1, "one pull per transition");
    assert!(!engine.session().inputs_enabled());

    let epoch = sink.prompt_requests()[0];
    assert!(engine.apply_prompt(epoch, "insert next board", &sink));
    assert_eq!(sink.prompts_shown(), vec!["insert next board".to_string()]);
}

#[test]
fn prompt_resolving_after_the_state_moved_on_is_discarded() {
    let mut engine = common::test_engine();
    let sink = common::sink();

    engine.handle_event(PushEvent::State(SessionState::WaitUser), &sink);
    let epoch = sink.prompt_requests()[0];

    engine.handle_event(PushEvent::State(SessionState::ExecCmd), &sink);
    assert!(!engine.apply_prompt(epoch, "stale prompt", &sink));
    assert!(sink.prompts_shown().is_empty());
    assert_eq!(sink.count(|e| *e == SinkEvent::PromptHidden), 1);
}

#[test]
fn action_timeline_builds_from_status_events() {
    let mut engine = common::test_engine();
    let sink = common::sink();

    engine.handle_event(
        PushEvent::ActionStatus(fixtures::report("zscan", StatusCode::Pending, 1.0)),
        &sink,
    );
    engine.handle_event(
        PushEvent::ActionStatus(fixtures::report_with_progress(
            "zscan",
            StatusCode::Running,
            2.0,
            3,
            10,
        )),
        &sink,
    );

    let history = engine.history();
    let entry = history.latest().expect("latest action missing");
    assert_eq!(entry.name, "zscan");
    assert_eq!(entry.log.len(), 2);
    assert_eq!(history.progress_fraction(entry), Some((3, 10)));
    assert_eq!(sink.count(|e| matches!(e, SinkEvent::ActionUpdated(_))), 2);
}

#[test]
fn session_reset_drops_state_and_disables_inputs() {
    let mut engine = common::test_engine();
    let sink = common::sink();

    engine.handle_event(PushEvent::State(SessionState::Idle), &sink);
    engine.apply_log_dump(LogStream::Monitor, fixtures::entries(3), &sink);
    engine.handle_event(
        fixtures::progress_event(&[("zscan", "1", StatusCode::Complete)]),
        &sink,
    );
    engine.handle_event(
        PushEvent::ActionStatus(fixtures::report("zscan", StatusCode::Complete, 1.0)),
        &sink,
    );
    sink.clear();

    engine.handle_event(PushEvent::SessionReset, &sink);

    assert!(engine.buffer(LogStream::Monitor).is_empty());
    assert!(engine.reconcile().last_applied().is_empty());
    assert!(engine.history().entries().is_empty());
    assert_eq!(engine.session().state(), None);
    assert_eq!(sink.inputs(), vec![false]);

    // The same snapshot is fully dirty again after the reset.
    engine.handle_event(
        fixtures::progress_event(&[("zscan", "1", StatusCode::Complete)]),
        &sink,
    );
    assert_eq!(
        sink.status_changes(),
        vec![("zscan".to_string(), "1".to_string(), StatusCode::Complete)]
    );
}
