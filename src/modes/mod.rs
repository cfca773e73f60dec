//! Per-mode scoring policies.
//!
//! A session picks its rules once from its [`SessionType`] and the session engine
//! calls them uniformly; no other module branches on the mode.

pub mod around_the_pitch;
pub mod inkast_blast;
pub mod standard;

pub use around_the_pitch::{AroundThePitchRules, PitchBoard, PitchPhase};
pub use inkast_blast::InkastBlastRules;
pub use standard::StandardRules;

use crate::round::Round;
use crate::session::{PracticeSession, SessionType};
use crate::throws::{ThrowInput, ThrowRecord};

/// How far `reset_current_round` reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Only the throws of the round in progress
    Round,
    /// The whole attempt: every throw and the running totals
    Session,
}

pub trait ModeRules: Send + Sync {
    fn session_type(&self) -> SessionType;

    /// Whether another throw may be recorded at all.
    fn accepts_throws(&self, _session: &PracticeSession) -> bool {
        true
    }

    /// Turns a raw hit/miss signal into the record appended to the current round.
    fn classify(&self, session: &PracticeSession, input: &ThrowInput) -> ThrowRecord;

    /// `round` is the round being evaluated; it may or may not already sit in `session.rounds`.
    fn is_round_complete(&self, session: &PracticeSession, round: &Round) -> bool;

    fn is_target_reached(&self, session: &PracticeSession) -> bool;

    fn reset_scope(&self) -> ResetScope {
        ResetScope::Round
    }

    /// Whether the thrower may close a round by hand before the rules do.
    fn allows_manual_next_round(&self) -> bool {
        true
    }
}

static STANDARD: StandardRules = StandardRules;
static AROUND_THE_PITCH: AroundThePitchRules = AroundThePitchRules;
static INKAST_BLAST: InkastBlastRules = InkastBlastRules;

pub fn rules_for(session_type: SessionType) -> &'static dyn ModeRules {
    match session_type {
        SessionType::Standard => &STANDARD,
        SessionType::AroundThePitch => &AROUND_THE_PITCH,
        SessionType::InkastBlast => &INKAST_BLAST,
    }
}

/// Every throw recorded before `round`, followed by the throws of `round` itself.
pub(crate) fn throws_through<'a>(
    session: &'a PracticeSession,
    round: &'a Round,
) -> impl Iterator<Item = &'a ThrowRecord> + 'a {
    session
        .rounds
        .iter()
        .take_while(move |r| r.id != round.id)
        .flat_map(|r| r.throws.iter())
        .chain(round.throws.iter())
}
