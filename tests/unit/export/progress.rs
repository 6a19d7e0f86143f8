use super::*;

#[test]
fn happy_path_transitions_are_legal() {
    use ExportState::*;
    let path = [Idle, LoadingSources, LayingOut, Drawing, Encoding, Done];
    for pair in path.windows(2) {
        assert!(pair[0].can_transition_to(pair[1]), "{pair:?}");
    }
}

#[test]
fn skips_reversals_and_terminal_exits_are_illegal() {
    use ExportState::*;
    assert!(!Idle.can_transition_to(Drawing));
    assert!(!Encoding.can_transition_to(Drawing));
    assert!(!Done.can_transition_to(Failed));
    assert!(!Failed.can_transition_to(Idle));
    assert!(!Done.can_transition_to(LoadingSources));
    for s in [Idle, LoadingSources, LayingOut, Drawing, Encoding] {
        assert!(s.can_transition_to(Failed));
    }
}

#[test]
fn tracker_rejects_illegal_transition_without_notifying() {
    let mut log = ExportEventLog::new();
    {
        let mut tracker = ProgressTracker::new(&mut log);
        tracker.transition(ExportState::LoadingSources).unwrap();
        assert!(tracker.transition(ExportState::Done).is_err());
        assert_eq!(tracker.state(), ExportState::LoadingSources);
    }
    assert_eq!(log.states(), [ExportState::LoadingSources]);
}

#[test]
fn progress_is_clamped_monotonic_and_completes_once() {
    let mut log = ExportEventLog::new();
    {
        let mut tracker = ProgressTracker::new(&mut log);
        tracker.transition(ExportState::LoadingSources).unwrap();
        tracker.report(ExportPhase::Loading, -0.5);
        tracker.report(ExportPhase::Loading, 0.25);
        tracker.report(ExportPhase::Loading, 0.1);
        tracker.report(ExportPhase::Drawing, f64::NAN);
        tracker.report(ExportPhase::Drawing, 0.6);
        tracker.report(ExportPhase::Encoding, 1.7);
        tracker.complete(ExportPhase::Encoding);
        assert_eq!(tracker.fraction(), 1.0);
    }
    assert_eq!(log.fractions(), [0.0, 0.25, 0.6, 1.0]);
}

#[test]
fn fail_is_terminal_and_silences_progress() {
    let mut log = ExportEventLog::new();
    {
        let mut tracker = ProgressTracker::new(&mut log);
        tracker.transition(ExportState::LoadingSources).unwrap();
        tracker.fail(&StripError::encode("boom"));
        tracker.fail(&StripError::encode("again"));
        tracker.report(ExportPhase::Encoding, 0.5);
        assert_eq!(tracker.state(), ExportState::Failed);
    }
    assert_eq!(
        log.states(),
        [ExportState::LoadingSources, ExportState::Failed]
    );
    assert!(log.fractions().is_empty());
}
