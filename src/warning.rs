use crate::modes::around_the_pitch::PITCH_PIECES;
use serde::{Deserialize, Serialize};

/// How much room is left in an Around-the-Pitch throw budget
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FeasibilityWarning {
    /// 2 to 4 spare throws
    Tight,
    /// exactly one miss can be absorbed
    Critical,
    /// every remaining throw has to hit
    PerfectRequired,
    /// not enough throws left for the standing pieces
    Impossible,
    /// budget used up
    Exceeded,
}

impl FeasibilityWarning {
    pub fn message(&self) -> &'static str {
        match self {
            FeasibilityWarning::Tight => "Tight: only a few misses left",
            FeasibilityWarning::Critical => "Critical: one miss left",
            FeasibilityWarning::PerfectRequired => "Perfect required: no misses left",
            FeasibilityWarning::Impossible => "Target out of reach",
            FeasibilityWarning::Exceeded => "Throw budget exceeded",
        }
    }
}

/// Spare throws once every standing piece is accounted for. Negative means out of reach.
pub fn throw_buffer(target_score: u32, total_batons: u32, kubbs_down: u32, king_down: bool) -> i64 {
    let throws_remaining = i64::from(target_score) - i64::from(total_batons);
    let pieces_remaining =
        i64::from(PITCH_PIECES - 1) - i64::from(kubbs_down) + i64::from(!king_down);
    throws_remaining - pieces_remaining
}

/// Pure function of the current counts. Recomputed after every throw, never stored.
pub fn classify_feasibility(
    target_score: u32,
    total_batons: u32,
    kubbs_down: u32,
    king_down: bool,
) -> Option<FeasibilityWarning> {
    if total_batons >= target_score {
        return Some(FeasibilityWarning::Exceeded);
    }
    match throw_buffer(target_score, total_batons, kubbs_down, king_down) {
        b if b < 0 => Some(FeasibilityWarning::Impossible),
        0 => Some(FeasibilityWarning::PerfectRequired),
        1 => Some(FeasibilityWarning::Critical),
        2..=4 => Some(FeasibilityWarning::Tight),
        _ => None,
    }
}
