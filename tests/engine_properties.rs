// Session engine behaviour across all three modes, driven only through the public API.

use kubb_practice::modes::{PitchBoard, PitchPhase};
use kubb_practice::store::{SessionStore, SqliteSessionStore};
use kubb_practice::warning::{classify_feasibility, FeasibilityWarning};
use kubb_practice::{PracticeSession, SessionType, ThrowInput, ThrowType};

fn throw_all(session: &mut PracticeSession, outcomes: &[bool]) {
    for &hit in outcomes {
        let input = if hit {
            ThrowInput::hit()
        } else {
            ThrowInput::miss()
        };
        assert!(session.record_throw(input).is_some());
    }
}

#[test]
fn standard_rounds_hold_six_throws_and_count_every_one() {
    let mut session = PracticeSession::new(SessionType::Standard, 30, None);
    let outcomes = [true, false, true, true, false, true, false];
    throw_all(&mut session, &outcomes);

    assert_eq!(session.rounds.len(), 2);
    assert!(session.rounds[0].is_complete);
    assert_eq!(session.rounds[1].round_number, 2);
    assert_eq!(session.rounds[1].throws.len(), 1);

    for round in &session.rounds {
        assert_eq!(round.hits() + round.misses(), round.throws.len());
    }
    assert_eq!(session.total_batons, outcomes.len() as u32);
    assert!(session
        .rounds
        .iter()
        .flat_map(|r| &r.throws)
        .all(|t| t.throw_type == ThrowType::Kubb && t.baseline_number.is_none()));
}

#[test]
fn standard_baseline_clear_is_reported_on_the_sixth_throw() {
    let mut session = PracticeSession::new(SessionType::Standard, 30, None);
    throw_all(&mut session, &[true; 5]);

    let outcome = session.record_throw(ThrowInput::miss()).unwrap();
    assert!(outcome.round_completed);
    assert!(outcome.baseline_clear);
    assert!(!outcome.target_reached);
}

#[test]
fn standard_target_then_complete() {
    let mut session = PracticeSession::new(SessionType::Standard, 6, None);
    throw_all(&mut session, &[false; 5]);
    assert!(!session.complete_session());

    let outcome = session.record_throw(ThrowInput::hit()).unwrap();
    assert!(outcome.target_reached);
    assert!(session.complete_session());
    assert!(session.record_throw(ThrowInput::hit()).is_none());
    assert_eq!(session.total_batons, 6);
}

#[test]
fn around_the_pitch_switches_to_baseline_two_after_five_hits() {
    let mut session = PracticeSession::new(SessionType::AroundThePitch, 1, Some(21));
    throw_all(&mut session, &[true; 5]);

    let board = session.pitch_board().unwrap();
    assert_eq!(board.phase(), PitchPhase::ThrowingBaseline(2));

    let outcome = session.record_throw(ThrowInput::hit()).unwrap();
    assert_eq!(outcome.record.throw_type, ThrowType::Kubb);
    assert_eq!(outcome.record.baseline_number, Some(2));
}

#[test]
fn around_the_pitch_full_set_moves_to_other_baseline() {
    let mut session = PracticeSession::new(SessionType::AroundThePitch, 1, Some(21));
    throw_all(&mut session, &[true, true, true, false, false, false]);

    assert!(session.rounds[0].is_complete);
    let outcome = session.record_throw(ThrowInput::hit()).unwrap();
    assert_eq!(outcome.record.baseline_number, Some(2));
    assert_eq!(outcome.round_number, 2);
}

#[test]
fn around_the_pitch_king_throw_after_ten_kubbs() {
    let mut session = PracticeSession::new(SessionType::AroundThePitch, 1, Some(21));
    throw_all(&mut session, &[true; 10]);

    let miss = session.record_throw(ThrowInput::miss()).unwrap();
    assert_eq!(miss.record.throw_type, ThrowType::King);
    assert!(!miss.target_reached);

    let hit = session.record_throw(ThrowInput::hit()).unwrap();
    assert_eq!(hit.record.throw_type, ThrowType::King);
    assert!(hit.round_completed);
    assert!(hit.target_reached);

    // nothing left to throw at
    assert!(session.record_throw(ThrowInput::hit()).is_none());
    assert_eq!(session.total_batons, 12);
    assert_eq!(session.warning(), None);
    assert!(session.complete_session());
}

#[test]
fn around_the_pitch_warnings_follow_the_budget() {
    let perfect = PracticeSession::new(SessionType::AroundThePitch, 1, Some(11));
    assert_eq!(perfect.warning(), Some(FeasibilityWarning::PerfectRequired));

    let mut session = PracticeSession::new(SessionType::AroundThePitch, 1, Some(15));
    throw_all(&mut session, &[true, true, true, false]);
    assert_eq!(session.warning(), Some(FeasibilityWarning::Tight));

    throw_all(&mut session, &[false, false]);
    assert_eq!(session.warning(), Some(FeasibilityWarning::Critical));

    let mut exhausted = PracticeSession::new(SessionType::AroundThePitch, 1, Some(11));
    throw_all(&mut exhausted, &[false; 11]);
    assert_eq!(exhausted.warning(), Some(FeasibilityWarning::Exceeded));
    assert_eq!(
        classify_feasibility(11, 12, 0, false),
        Some(FeasibilityWarning::Exceeded)
    );

    let unbudgeted = PracticeSession::new(SessionType::AroundThePitch, 1, None);
    assert_eq!(unbudgeted.warning(), None);
}

#[test]
fn around_the_pitch_reset_restarts_the_attempt() {
    let mut session = PracticeSession::new(SessionType::AroundThePitch, 1, Some(21));
    throw_all(&mut session, &[true; 7]);
    assert_eq!(session.rounds.len(), 2);

    assert!(session.reset_current_round());
    assert_eq!(session.rounds.len(), 1);
    assert_eq!(session.rounds[0].round_number, 2);
    assert!(session.rounds[0].throws.is_empty());
    assert_eq!(session.total_batons, 0);
    assert_eq!(
        session.pitch_board().unwrap().phase(),
        PitchPhase::ThrowingBaseline(1)
    );
}

#[test]
fn pitch_board_replay_is_deterministic() {
    let mut session = PracticeSession::new(SessionType::AroundThePitch, 1, Some(21));
    throw_all(
        &mut session,
        &[true, false, true, true, true, true, false, false, true, true],
    );

    let first = PitchBoard::from_session(&session);
    let second = PitchBoard::from_session(&session);
    assert_eq!(first, second);
    assert_eq!(first.kubbs_down(), 7);
}

#[test]
fn restored_session_rebuilds_the_same_board() {
    let mut store = SqliteSessionStore::open_in_memory().unwrap();
    let mut session = PracticeSession::new(SessionType::AroundThePitch, 1, Some(21));
    store.create_session(&session).unwrap();
    throw_all(&mut session, &[true, true, false, true, true, true, true, false]);
    store.update_session(&session).unwrap();

    let restored = store.get_active_session().unwrap().unwrap();
    assert_eq!(restored.total_batons, session.total_batons);
    assert_eq!(restored.pitch_board(), session.pitch_board());
    assert_eq!(restored.warning(), session.warning());
}

#[test]
fn inkast_blast_round_ends_when_the_field_is_cleared() {
    let mut session = PracticeSession::new(SessionType::InkastBlast, 20, Some(10));
    let first = session.record_throw(ThrowInput::kubbs(4)).unwrap();
    assert_eq!(first.record.throw_type, ThrowType::MultiKubb);
    assert!(!first.round_completed);

    // only six were left standing
    let second = session.record_throw(ThrowInput::kubbs(9)).unwrap();
    assert_eq!(second.record.kubbs_hit, Some(6));
    assert!(second.round_completed);
    assert_eq!(session.total_kubbs, 10);

    let third = session.record_throw(ThrowInput::kubbs(10)).unwrap();
    assert_eq!(third.round_number, 2);
    assert!(third.target_reached);
}

#[test]
fn paused_session_ignores_throws() {
    let mut session = PracticeSession::new(SessionType::Standard, 30, None);
    assert!(session.pause_session());
    assert!(session.record_throw(ThrowInput::hit()).is_none());
    assert_eq!(session.total_batons, 0);

    assert!(session.resume_session());
    assert!(session.record_throw(ThrowInput::hit()).is_some());
}
