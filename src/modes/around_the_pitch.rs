use super::{throws_through, ModeRules, ResetScope};
use crate::round::{Round, BASELINE_SIZE, ROUND_SIZE};
use crate::session::{PracticeSession, SessionType};
use crate::throws::{ThrowInput, ThrowRecord};
use serde::Serialize;

/// Two baselines of five kubbs plus the king
pub const PITCH_PIECES: u32 = 2 * BASELINE_SIZE as u32 + 1;

/// Where the thrower is currently aiming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "phase", content = "baseline")]
pub enum PitchPhase {
    ThrowingBaseline(u8),
    ThrowingKing,
    Cleared,
}

/// Board state of an Around-the-Pitch attempt.
///
/// Never stored. It is rebuilt by replaying the throw history in order, so a fresh
/// session and a resumed one always agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchBoard {
    /// `true` = knocked down. Index 0 is baseline 1.
    pub kubbs: [[bool; BASELINE_SIZE]; 2],
    pub king_down: bool,
    /// 1 or 2
    pub current_baseline: u8,
    pub set_counter: u8,
}

impl Default for PitchBoard {
    fn default() -> Self {
        Self {
            kubbs: [[false; BASELINE_SIZE]; 2],
            king_down: false,
            current_baseline: 1,
            set_counter: 0,
        }
    }
}

impl PitchBoard {
    pub fn replay<'a, I>(throws: I) -> Self
    where
        I: IntoIterator<Item = &'a ThrowRecord>,
    {
        let mut board = Self::default();
        for throw in throws {
            board.apply(throw.is_hit);
        }
        board
    }

    pub fn from_session(session: &PracticeSession) -> Self {
        Self::replay(session.rounds.iter().flat_map(|r| r.throws.iter()))
    }

    /// Advances the board by one throw outcome. Throws after the king falls change nothing.
    pub fn apply(&mut self, is_hit: bool) {
        if self.king_down {
            return;
        }

        if self.all_kubbs_down() {
            if is_hit {
                self.king_down = true;
            }
            self.set_counter += 1;
            if usize::from(self.set_counter) >= ROUND_SIZE {
                self.set_counter = 0;
            }
            return;
        }

        let baseline = self.current_baseline;
        if is_hit {
            if let Some(slot) = self.slots(baseline).iter().position(|down| !down) {
                self.slots_mut(baseline)[slot] = true;
            }
        }
        self.set_counter += 1;

        if self.baseline_empty(baseline) || usize::from(self.set_counter) >= ROUND_SIZE {
            let other = Self::other(baseline);
            if !self.baseline_empty(other) {
                self.current_baseline = other;
            }
            self.set_counter = 0;
        }
    }

    pub fn phase(&self) -> PitchPhase {
        if self.king_down {
            PitchPhase::Cleared
        } else if self.all_kubbs_down() {
            PitchPhase::ThrowingKing
        } else {
            PitchPhase::ThrowingBaseline(self.current_baseline)
        }
    }

    pub fn kubbs_down(&self) -> u32 {
        self.kubbs.iter().flatten().filter(|down| **down).count() as u32
    }

    pub fn kubbs_down_on(&self, baseline: u8) -> u32 {
        self.slots(baseline).iter().filter(|down| **down).count() as u32
    }

    pub fn all_kubbs_down(&self) -> bool {
        self.kubbs.iter().flatten().all(|down| *down)
    }

    pub fn baseline_empty(&self, baseline: u8) -> bool {
        self.slots(baseline).iter().all(|down| *down)
    }

    pub fn pieces_remaining(&self) -> u32 {
        PITCH_PIECES - self.kubbs_down() - u32::from(self.king_down)
    }

    fn slots(&self, baseline: u8) -> &[bool; BASELINE_SIZE] {
        &self.kubbs[usize::from(baseline.saturating_sub(1).min(1))]
    }

    fn slots_mut(&mut self, baseline: u8) -> &mut [bool; BASELINE_SIZE] {
        &mut self.kubbs[usize::from(baseline.saturating_sub(1).min(1))]
    }

    fn other(baseline: u8) -> u8 {
        if baseline == 1 {
            2
        } else {
            1
        }
    }
}

/// Clear both baselines, then the king, inside a throw budget (`target_score`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AroundThePitchRules;

impl ModeRules for AroundThePitchRules {
    fn session_type(&self) -> SessionType {
        SessionType::AroundThePitch
    }

    fn accepts_throws(&self, session: &PracticeSession) -> bool {
        !PitchBoard::from_session(session).king_down
    }

    fn classify(&self, session: &PracticeSession, input: &ThrowInput) -> ThrowRecord {
        let board = PitchBoard::from_session(session);
        let timestamp = input.timestamp_or_now();
        match board.phase() {
            PitchPhase::ThrowingBaseline(baseline) => {
                ThrowRecord::kubb(input.is_hit, Some(baseline), timestamp)
            }
            PitchPhase::ThrowingKing | PitchPhase::Cleared => {
                ThrowRecord::king(input.is_hit, timestamp)
            }
        }
    }

    /// A round is one set: it ends when the set counter rolls over or the king falls.
    fn is_round_complete(&self, session: &PracticeSession, round: &Round) -> bool {
        if round.throws.is_empty() {
            return false;
        }
        let board = PitchBoard::replay(throws_through(session, round));
        board.king_down || board.set_counter == 0
    }

    fn is_target_reached(&self, session: &PracticeSession) -> bool {
        PitchBoard::from_session(session).king_down
    }

    fn reset_scope(&self) -> ResetScope {
        ResetScope::Session
    }

    /// Rounds follow the set counter, so they only close on their own.
    fn allows_manual_next_round(&self) -> bool {
        false
    }
}
