use super::ModeRules;
use crate::round::{Round, ROUND_SIZE};
use crate::session::{PracticeSession, SessionType};
use crate::throws::{ThrowInput, ThrowRecord};

/// Field kubbs per round when the session carries no `target_score`
pub const DEFAULT_FIELD_SIZE: u32 = 10;

/// Inkast drill: one baton may topple several field kubbs at once.
///
/// `target` counts kubbs knocked down over the session; `target_score` is how many
/// field kubbs are inkasted per round. A round ends after six batons or once the
/// field is cleared.
#[derive(Debug, Clone, Copy, Default)]
pub struct InkastBlastRules;

impl InkastBlastRules {
    pub fn field_size(session: &PracticeSession) -> u32 {
        session.target_score.unwrap_or(DEFAULT_FIELD_SIZE)
    }
}

impl ModeRules for InkastBlastRules {
    fn session_type(&self) -> SessionType {
        SessionType::InkastBlast
    }

    fn classify(&self, session: &PracticeSession, input: &ThrowInput) -> ThrowRecord {
        let timestamp = input.timestamp_or_now();
        match input.kubbs_hit {
            Some(count) => {
                let standing = session
                    .current_round()
                    .map(|r| Self::field_size(session).saturating_sub(r.kubbs_down()))
                    .unwrap_or_else(|| Self::field_size(session));
                ThrowRecord::multi_kubb(count.min(standing), timestamp)
            }
            None => ThrowRecord::kubb(input.is_hit, None, timestamp),
        }
    }

    fn is_round_complete(&self, session: &PracticeSession, round: &Round) -> bool {
        round.total_throws() >= ROUND_SIZE
            || (!round.throws.is_empty() && round.kubbs_down() >= Self::field_size(session))
    }

    fn is_target_reached(&self, session: &PracticeSession) -> bool {
        session.total_kubbs >= session.target
    }
}
