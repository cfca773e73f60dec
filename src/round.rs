use crate::modes::ModeRules;
use crate::session::PracticeSession;
use crate::throws::{ThrowRecord, ThrowType};
use crate::util::ratio;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Throws in a nominal round
pub const ROUND_SIZE: usize = 6;

/// Kubbs standing on one baseline
pub const BASELINE_SIZE: usize = 5;

/// An ordered batch of throws within one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: String,
    pub round_number: u32,
    pub throws: Vec<ThrowRecord>,
    pub is_complete: bool,
}

impl Round {
    pub fn new(round_number: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            round_number,
            throws: Vec::new(),
            is_complete: false,
        }
    }

    /// Appends a throw. A completed round ignores the call and returns false.
    pub fn add_throw(&mut self, record: ThrowRecord) -> bool {
        if self.is_complete {
            return false;
        }
        self.throws.push(record);
        true
    }

    pub fn total_throws(&self) -> usize {
        self.throws.len()
    }

    pub fn hits(&self) -> usize {
        self.throws.iter().filter(|t| t.is_hit).count()
    }

    pub fn misses(&self) -> usize {
        self.total_throws() - self.hits()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.hits(), self.total_throws())
    }

    pub fn kubbs_down(&self) -> u32 {
        self.throws
            .iter()
            .map(ThrowRecord::kubbs_down)
            .fold(0, u32::saturating_add)
    }

    pub fn king_hit(&self) -> bool {
        self.throws
            .iter()
            .any(|t| t.throw_type == ThrowType::King && t.is_hit)
    }

    /// Asks the mode whether this round is done. Does not mutate; the caller applies it.
    pub fn evaluate_completion(&self, rules: &dyn ModeRules, session: &PracticeSession) -> bool {
        rules.is_round_complete(session, self)
    }

    /// The opening baseline-sized run of throws were all kubb hits.
    pub fn has_baseline_clear(&self) -> bool {
        self.throws.len() >= BASELINE_SIZE
            && self.throws[..BASELINE_SIZE]
                .iter()
                .all(|t| t.is_hit && t.throw_type == ThrowType::Kubb)
    }

    pub(crate) fn clear(&mut self) {
        self.throws.clear();
        self.is_complete = false;
    }
}
