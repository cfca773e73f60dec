use super::ModeRules;
use crate::round::{Round, ROUND_SIZE};
use crate::session::{PracticeSession, SessionType};
use crate::throws::{ThrowInput, ThrowRecord};

/// 8-Meter drill: six batons per round at a five-kubb baseline, target counts batons.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl ModeRules for StandardRules {
    fn session_type(&self) -> SessionType {
        SessionType::Standard
    }

    fn classify(&self, _session: &PracticeSession, input: &ThrowInput) -> ThrowRecord {
        ThrowRecord::kubb(input.is_hit, None, input.timestamp_or_now())
    }

    fn is_round_complete(&self, _session: &PracticeSession, round: &Round) -> bool {
        round.total_throws() >= ROUND_SIZE
    }

    fn is_target_reached(&self, session: &PracticeSession) -> bool {
        session.total_batons >= session.target
    }
}
