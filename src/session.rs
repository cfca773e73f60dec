use crate::modes::{rules_for, ModeRules, PitchBoard, ResetScope};
use crate::round::Round;
use crate::throws::{ThrowInput, ThrowRecord};
use crate::util::ratio;
use crate::warning::{classify_feasibility, FeasibilityWarning};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SessionType {
    Standard,
    AroundThePitch,
    InkastBlast,
}

impl SessionType {
    pub fn title(&self) -> &'static str {
        match self {
            SessionType::Standard => "8 Meter",
            SessionType::AroundThePitch => "Around the Pitch",
            SessionType::InkastBlast => "Inkast Blast",
        }
    }

    pub fn rules(&self) -> &'static dyn ModeRules {
        rules_for(*self)
    }
}

impl std::str::FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(SessionType::Standard),
            "aroundThePitch" => Ok(SessionType::AroundThePitch),
            "inkastBlast" => Ok(SessionType::InkastBlast),
            other => Err(format!("unknown session type: {other}")),
        }
    }
}

/// What a recorded throw triggered
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub record: ThrowRecord,
    pub round_number: u32,
    pub round_completed: bool,
    pub baseline_clear: bool,
    pub target_reached: bool,
}

/// Aggregate root of one practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSession {
    pub id: String,
    pub session_type: SessionType,
    pub target: u32,
    #[serde(default)]
    pub target_score: Option<u32>,
    pub rounds: Vec<Round>,
    pub total_batons: u32,
    pub total_kubbs: u32,
    pub is_complete: bool,
    pub is_paused: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PracticeSession {
    /// Starts a session with an open first round.
    pub fn new(session_type: SessionType, target: u32, target_score: Option<u32>) -> Self {
        let now = Utc::now();
        let session = Self {
            id: Uuid::new_v4().to_string(),
            session_type,
            target,
            target_score,
            rounds: vec![Round::new(1)],
            total_batons: 0,
            total_kubbs: 0,
            is_complete: false,
            is_paused: false,
            created_at: now,
            updated_at: now,
        };
        info!(id = %session.id, %session_type, target, ?target_score, "session started");
        session
    }

    pub fn rules(&self) -> &'static dyn ModeRules {
        self.session_type.rules()
    }

    /// Last round if it is still open
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last().filter(|r| !r.is_complete)
    }

    pub fn is_target_reached(&self) -> bool {
        self.rules().is_target_reached(self)
    }

    pub fn hits(&self) -> usize {
        self.rounds.iter().map(Round::hits).sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.hits(), self.total_batons as usize)
    }

    /// Around-the-Pitch board, rebuilt from the throw history
    pub fn pitch_board(&self) -> Option<PitchBoard> {
        (self.session_type == SessionType::AroundThePitch)
            .then(|| PitchBoard::from_session(self))
    }

    /// Feasibility of the throw budget. Only Around-the-Pitch with a budget has one,
    /// and a cleared board has nothing left to warn about.
    pub fn warning(&self) -> Option<FeasibilityWarning> {
        let board = self.pitch_board()?;
        let budget = self.target_score?;
        if board.king_down {
            return None;
        }
        classify_feasibility(budget, self.total_batons, board.kubbs_down(), board.king_down)
    }

    /// Single mutation entry point for throws, whether tapped locally or sent by the watch.
    ///
    /// Returns `None` when nothing was recorded: the session is finished or paused, or
    /// the mode accepts no further throws.
    pub fn record_throw(&mut self, input: ThrowInput) -> Option<RecordOutcome> {
        if self.is_complete || self.is_paused {
            debug!(id = %self.id, "throw ignored, session not accepting input");
            return None;
        }
        let rules = self.rules();
        if !rules.accepts_throws(self) {
            debug!(id = %self.id, "throw ignored by mode rules");
            return None;
        }

        if self.current_round().is_none() {
            let next = self.next_round_number();
            self.rounds.push(Round::new(next));
        }

        let record = rules.classify(self, &input);
        let round = self.rounds.last_mut()?;
        if !round.add_throw(record.clone()) {
            return None;
        }
        let round_number = round.round_number;
        self.total_batons = self.total_batons.saturating_add(1);
        self.total_kubbs = self.total_kubbs.saturating_add(record.kubbs_down());
        self.updated_at = Utc::now();

        let (round_completed, baseline_clear) = match self.rounds.last() {
            Some(round) => (
                round.evaluate_completion(rules, self),
                round.has_baseline_clear(),
            ),
            None => (false, false),
        };
        if round_completed {
            if let Some(round) = self.rounds.last_mut() {
                round.is_complete = true;
            }
            debug!(id = %self.id, round_number, "round complete");
        }

        Some(RecordOutcome {
            record,
            round_number,
            round_completed,
            baseline_clear,
            target_reached: self.is_target_reached(),
        })
    }

    /// Closes the current round and opens the next one.
    ///
    /// Refused (returns false) when the session is complete, when the last round has
    /// no throws yet since there is nothing to close, and in modes whose rounds only
    /// close on their own (Around-the-Pitch sets).
    pub fn start_next_round(&mut self) -> bool {
        if self.is_complete || !self.rules().allows_manual_next_round() {
            return false;
        }
        let Some(last) = self.rounds.last_mut() else {
            return false;
        };
        if last.throws.is_empty() {
            return false;
        }
        last.is_complete = true;
        let next = last.round_number + 1;
        self.rounds.push(Round::new(next));
        self.updated_at = Utc::now();
        debug!(id = %self.id, round_number = next, "next round started");
        true
    }

    /// Clears the round in progress without advancing the round number.
    ///
    /// Modes with [`ResetScope::Session`] restart the whole attempt: earlier rounds are
    /// dropped along with their throws so the running totals go back to zero.
    pub fn reset_current_round(&mut self) -> bool {
        if self.is_complete {
            return false;
        }
        match self.rules().reset_scope() {
            ResetScope::Round => {
                let Some(round) = self.rounds.last_mut().filter(|r| !r.is_complete) else {
                    return false;
                };
                round.clear();
            }
            ResetScope::Session => {
                let Some(mut last) = self.rounds.pop() else {
                    return false;
                };
                last.clear();
                self.rounds = vec![last];
            }
        }
        self.recompute_totals();
        self.updated_at = Utc::now();
        debug!(id = %self.id, "round reset");
        true
    }

    /// Finishes the session. Only valid once the target is reached; permanent afterwards.
    pub fn complete_session(&mut self) -> bool {
        if self.is_complete || !self.is_target_reached() {
            return false;
        }
        if self.rounds.len() > 1 && self.rounds.last().is_some_and(|r| r.throws.is_empty()) {
            self.rounds.pop();
        }
        if let Some(last) = self.rounds.last_mut() {
            last.is_complete = true;
        }
        self.is_complete = true;
        self.is_paused = false;
        self.updated_at = Utc::now();
        info!(id = %self.id, total_batons = self.total_batons, "session complete");
        true
    }

    pub fn pause_session(&mut self) -> bool {
        if self.is_complete || self.is_paused {
            return false;
        }
        self.is_paused = true;
        self.updated_at = Utc::now();
        info!(id = %self.id, "session paused");
        true
    }

    pub fn resume_session(&mut self) -> bool {
        if !self.is_paused {
            return false;
        }
        self.is_paused = false;
        self.updated_at = Utc::now();
        info!(id = %self.id, "session resumed");
        true
    }

    /// Rebuilds running totals and round flags from the throw history.
    ///
    /// Called after loading a stored snapshot; stored counters are never trusted.
    pub fn restore(&mut self) {
        self.recompute_totals();
        let rules = self.rules();
        let open_rounds: Vec<usize> = self
            .rounds
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_complete && !r.throws.is_empty())
            .map(|(i, _)| i)
            .collect();
        for i in open_rounds {
            if self.rounds[i].evaluate_completion(rules, self) {
                self.rounds[i].is_complete = true;
            }
        }
    }

    fn recompute_totals(&mut self) {
        self.total_batons = self
            .rounds
            .iter()
            .map(|r| u32::try_from(r.total_throws()).unwrap_or(u32::MAX))
            .fold(0, u32::saturating_add);
        self.total_kubbs = self
            .rounds
            .iter()
            .map(Round::kubbs_down)
            .fold(0, u32::saturating_add);
    }

    fn next_round_number(&self) -> u32 {
        self.rounds.last().map_or(1, |r| r.round_number + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throws::ThrowType;
    use crate::warning::FeasibilityWarning;
    use assert_matches::assert_matches;

    fn throw_all(session: &mut PracticeSession, outcomes: &[bool]) {
        for &hit in outcomes {
            let input = if hit {
                ThrowInput::hit()
            } else {
                ThrowInput::miss()
            };
            session.record_throw(input);
        }
    }

    #[test]
    fn test_new_session_has_first_round() {
        let session = PracticeSession::new(SessionType::Standard, 30, None);
        assert_eq!(session.rounds.len(), 1);
        assert_eq!(session.rounds[0].round_number, 1);
        assert!(session.current_round().is_some());
        assert_eq!(session.total_batons, 0);
        assert!(!session.is_target_reached());
    }

    #[test]
    fn test_standard_round_rolls_after_six() {
        let mut session = PracticeSession::new(SessionType::Standard, 30, None);
        throw_all(&mut session, &[true, false, true, true, false, true]);
        assert!(session.rounds[0].is_complete);
        assert!(session.current_round().is_none());
        assert_eq!(session.rounds.len(), 1);

        let outcome = session.record_throw(ThrowInput::hit()).unwrap();
        assert_eq!(outcome.round_number, 2);
        assert_eq!(session.rounds.len(), 2);
        assert_eq!(session.total_batons, 7);
    }

    #[test]
    fn test_sixth_throw_reports_round_completion() {
        let mut session = PracticeSession::new(SessionType::Standard, 30, None);
        throw_all(&mut session, &[true; 5]);
        let outcome = session.record_throw(ThrowInput::miss()).unwrap();
        assert!(outcome.round_completed);
        assert!(outcome.baseline_clear);
        assert_eq!(outcome.record.throw_type, ThrowType::Kubb);
    }

    #[test]
    fn test_standard_target_on_batons() {
        let mut session = PracticeSession::new(SessionType::Standard, 6, None);
        throw_all(&mut session, &[false; 5]);
        assert!(!session.is_target_reached());
        let outcome = session.record_throw(ThrowInput::miss()).unwrap();
        assert!(outcome.target_reached);
    }

    #[test]
    fn test_complete_requires_target() {
        let mut session = PracticeSession::new(SessionType::Standard, 6, None);
        throw_all(&mut session, &[true; 3]);
        assert!(!session.complete_session());
        throw_all(&mut session, &[true; 3]);
        assert!(session.complete_session());
        assert!(session.is_complete);
        assert!(session.record_throw(ThrowInput::hit()).is_none());
        assert_eq!(session.total_batons, 6);
        assert!(!session.complete_session());
    }

    #[test]
    fn test_paused_session_rejects_throws() {
        let mut session = PracticeSession::new(SessionType::Standard, 30, None);
        throw_all(&mut session, &[true]);
        assert!(session.pause_session());
        assert!(session.record_throw(ThrowInput::hit()).is_none());
        assert_eq!(session.total_batons, 1);
        assert!(session.resume_session());
        assert_matches!(session.record_throw(ThrowInput::hit()), Some(_));
        assert_eq!(session.total_batons, 2);
    }

    #[test]
    fn test_start_next_round_closes_current() {
        let mut session = PracticeSession::new(SessionType::Standard, 30, None);
        assert!(!session.start_next_round());
        throw_all(&mut session, &[true, false]);
        assert!(session.start_next_round());
        assert!(session.rounds[0].is_complete);
        assert_eq!(session.rounds[1].round_number, 2);
        assert!(!session.start_next_round());
    }

    #[test]
    fn test_pitch_refuses_manual_next_round() {
        let mut session = PracticeSession::new(SessionType::AroundThePitch, 11, Some(21));
        throw_all(&mut session, &[true, false]);
        assert!(!session.start_next_round());
        assert_eq!(session.rounds.len(), 1);
        assert!(!session.rounds[0].is_complete);

        // the set still closes after six throws
        throw_all(&mut session, &[false; 4]);
        assert!(session.rounds[0].is_complete);
    }

    #[test]
    fn test_inkast_totals_saturate() {
        let mut session = PracticeSession::new(SessionType::InkastBlast, 30, Some(u32::MAX));
        let first = session.record_throw(ThrowInput::kubbs(u32::MAX)).unwrap();
        assert!(first.round_completed);
        session.record_throw(ThrowInput::kubbs(u32::MAX)).unwrap();
        assert_eq!(session.total_kubbs, u32::MAX);
        assert_eq!(session.total_batons, 2);

        session.restore();
        assert_eq!(session.total_kubbs, u32::MAX);
    }

    #[test]
    fn test_standard_reset_is_round_scoped() {
        let mut session = PracticeSession::new(SessionType::Standard, 30, None);
        throw_all(&mut session, &[true; 6]);
        throw_all(&mut session, &[true, false]);
        assert_eq!(session.total_batons, 8);
        assert!(session.reset_current_round());
        assert_eq!(session.rounds.len(), 2);
        assert_eq!(session.rounds[1].round_number, 2);
        assert!(session.rounds[1].throws.is_empty());
        assert_eq!(session.total_batons, 6);
        assert_eq!(session.total_kubbs, 6);
    }

    #[test]
    fn test_pitch_reset_restarts_attempt() {
        let mut session = PracticeSession::new(SessionType::AroundThePitch, 11, Some(21));
        throw_all(&mut session, &[true; 5]);
        throw_all(&mut session, &[true, false]);
        let current = session.rounds.last().unwrap().round_number;
        assert!(session.reset_current_round());
        assert_eq!(session.rounds.len(), 1);
        assert_eq!(session.rounds[0].round_number, current);
        assert_eq!(session.total_batons, 0);
        assert_eq!(session.total_kubbs, 0);
        assert_eq!(session.pitch_board().unwrap(), PitchBoard::default());
    }

    #[test]
    fn test_pitch_rounds_follow_sets() {
        let mut session = PracticeSession::new(SessionType::AroundThePitch, 11, Some(21));
        let outcomes = [true; 5];
        throw_all(&mut session, &outcomes[..4]);
        let fifth = session.record_throw(ThrowInput::hit()).unwrap();
        assert!(fifth.round_completed);
        let next = session.record_throw(ThrowInput::hit()).unwrap();
        assert_eq!(next.round_number, 2);
        assert_eq!(next.record.baseline_number, Some(2));
    }

    #[test]
    fn test_pitch_king_hit_reaches_target_and_stops() {
        let mut session = PracticeSession::new(SessionType::AroundThePitch, 11, Some(11));
        throw_all(&mut session, &[true; 10]);
        let king = session.record_throw(ThrowInput::hit()).unwrap();
        assert_eq!(king.record.throw_type, ThrowType::King);
        assert!(king.target_reached);
        assert!(king.round_completed);
        assert!(session.record_throw(ThrowInput::hit()).is_none());
        assert!(session.complete_session());
    }

    #[test]
    fn test_pitch_warning_tracks_budget() {
        let mut session = PracticeSession::new(SessionType::AroundThePitch, 11, Some(11));
        assert_eq!(session.warning(), Some(FeasibilityWarning::PerfectRequired));
        session.record_throw(ThrowInput::miss());
        assert_eq!(session.warning(), Some(FeasibilityWarning::Impossible));
    }

    #[test]
    fn test_standard_has_no_board_or_warning() {
        let session = PracticeSession::new(SessionType::Standard, 30, Some(5));
        assert!(session.pitch_board().is_none());
        assert!(session.warning().is_none());
    }

    #[test]
    fn test_restore_rebuilds_totals() {
        let mut session = PracticeSession::new(SessionType::Standard, 30, None);
        throw_all(&mut session, &[true, true, false]);
        let mut loaded = session.clone();
        loaded.total_batons = 99;
        loaded.total_kubbs = 0;
        loaded.restore();
        assert_eq!(loaded.total_batons, 3);
        assert_eq!(loaded.total_kubbs, 2);
    }

    #[test]
    fn test_session_type_parse_and_display() {
        for t in [
            SessionType::Standard,
            SessionType::AroundThePitch,
            SessionType::InkastBlast,
        ] {
            assert_eq!(t.to_string().parse::<SessionType>().unwrap(), t);
        }
        assert!("bogus".parse::<SessionType>().is_err());
    }
}
