// Integration tests (native) for the flow state machine.
// These tests avoid wasm-specific functionality and exercise pure Rust logic
// so they can run under `cargo test` on the host.

use valentine_flow::{
    ControlPose, EvasionTag, FlowState, NoOutcome, STEPS, TIMER_DURATION_SECS, View, advance,
};

fn opened() -> FlowState {
    let mut s = FlowState::new();
    assert!(s.open());
    s
}

#[test]
fn negative_answer_advances_and_resets() {
    let mut s = opened();
    for i in 0..STEPS.len() - 1 {
        s.time_left = 3;
        s.pose.x = 123.0;
        s.pose.y = 45.0;
        assert_eq!(s.answer_no(), NoOutcome::Advanced { step: i + 1 });
        assert_eq!(s.view, View::Active { step: i + 1 });
        assert_eq!(s.time_left, TIMER_DURATION_SECS);
        assert_eq!(s.pose, ControlPose::origin());
    }
}

#[test]
fn countdown_expiry_is_identical_to_an_explicit_no() {
    let mut by_click = opened();
    let mut by_expiry = opened();

    by_click.answer_no();
    for _ in 0..TIMER_DURATION_SECS {
        by_expiry.tick_countdown();
    }

    assert_eq!(by_click.view, by_expiry.view);
    assert_eq!(by_click.time_left, by_expiry.time_left);
    assert_eq!(by_click.pose, by_expiry.pose);
}

#[test]
fn last_step_negative_ends_in_final_failure() {
    let mut s = opened();
    for _ in 0..STEPS.len() - 1 {
        s.answer_no();
    }
    assert_eq!(s.view, View::Active { step: STEPS.len() - 1 });
    assert_eq!(s.answer_no(), NoOutcome::Exhausted);
    assert_eq!(s.view, View::FinalFailure);
    // Further negatives and ticks are dropped, never wrapping to step 0.
    assert_eq!(s.answer_no(), NoOutcome::Ignored);
    assert_eq!(s.tick_countdown(), None);
    assert_eq!(s.view, View::FinalFailure);
}

#[test]
fn last_step_expiry_ends_in_final_failure() {
    let mut s = opened();
    for _ in 0..STEPS.len() - 1 {
        s.answer_no();
    }
    for _ in 0..TIMER_DURATION_SECS - 1 {
        assert_eq!(s.tick_countdown(), None);
    }
    assert_eq!(s.tick_countdown(), Some(NoOutcome::Exhausted));
    assert_eq!(s.view, View::FinalFailure);
}

#[test]
fn success_is_never_reached_through_the_negative_control() {
    let mut s = opened();
    loop {
        match s.answer_no() {
            NoOutcome::Advanced { .. } => assert_ne!(s.view, View::Success),
            NoOutcome::Exhausted => break,
            NoOutcome::Ignored => panic!("negative answer dropped mid-sequence"),
        }
    }
    assert_eq!(s.view, View::FinalFailure);
}

#[test]
fn success_return_restarts_at_step_zero_fully_reset() {
    let mut s = opened();
    s.answer_no();
    s.time_left = 2;
    s.pose.x = 77.0;
    assert!(s.succeed());
    assert_eq!(s.view, View::Success);

    assert!(s.success_return());
    assert_eq!(s.view, View::Active { step: 0 });
    assert_eq!(s.time_left, TIMER_DURATION_SECS);
    assert_eq!(s.pose, ControlPose::origin());
    assert!(s.flicker_visible);
}

#[test]
fn restart_from_final_failure_returns_to_intro() {
    let mut s = opened();
    while s.answer_no() != NoOutcome::Exhausted {}
    assert!(s.restart());
    assert_eq!(s.view, View::Intro);
    assert_eq!(s.time_left, TIMER_DURATION_SECS);
    // Restart is only valid from the final failure view.
    assert!(!s.restart());
}

#[test]
fn step_index_stays_in_range_for_the_whole_walk() {
    let mut s = opened();
    loop {
        if let View::Active { step } = s.view {
            assert!(step < STEPS.len());
        }
        if s.answer_no() == NoOutcome::Exhausted {
            break;
        }
    }
}

// Registry sanity checks.

#[test]
fn registry_has_five_steps_with_unique_ids_and_text() {
    assert_eq!(STEPS.len(), 5);
    let mut seen = std::collections::HashSet::new();
    for step in STEPS {
        assert!(seen.insert(step.id), "duplicate step id {}", step.id);
        assert!(!step.prompt.is_empty());
        assert!(!step.fail_caption.is_empty());
    }
}

#[test]
fn registry_assigns_the_expected_evasion_tags() {
    assert_eq!(STEPS[0].evasion, EvasionTag::Teleport);
    assert_eq!(STEPS[1].evasion, EvasionTag::Neutral);
    assert_eq!(STEPS[3].evasion, EvasionTag::Flicker);
    assert_eq!(STEPS[4].evasion, EvasionTag::Flee);
    // FadeOnApproach stays reserved: no registry step uses it.
    assert!(!STEPS.iter().any(|s| s.evasion == EvasionTag::FadeOnApproach));
}

#[test]
fn advance_exhausts_exactly_at_the_last_step() {
    assert_eq!(advance(0), Some(1));
    assert_eq!(advance(STEPS.len() - 2), Some(STEPS.len() - 1));
    assert_eq!(advance(STEPS.len() - 1), None);
}
