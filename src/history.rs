use crate::session::{PracticeSession, SessionType};
use crate::util::{mean, std_dev};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use std::io::Write;

/// One line of practice history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub session_type: SessionType,
    pub started: DateTime<Utc>,
    pub rounds: usize,
    pub batons: u32,
    pub hits: usize,
    pub kubbs: u32,
    /// 0-100
    pub accuracy: f64,
    pub round_accuracy_mean: Option<f64>,
    pub round_accuracy_std_dev: Option<f64>,
    pub baseline_clears: usize,
    pub target_reached: bool,
    pub complete: bool,
}

impl SessionSummary {
    pub fn from_session(session: &PracticeSession) -> Self {
        let played: Vec<f64> = session
            .rounds
            .iter()
            .filter(|r| !r.throws.is_empty())
            .map(|r| r.accuracy() * 100.0)
            .collect();

        Self {
            id: session.id.clone(),
            session_type: session.session_type,
            started: session.created_at,
            rounds: played.len(),
            batons: session.total_batons,
            hits: session.hits(),
            kubbs: session.total_kubbs,
            accuracy: (session.accuracy() * 100.0).round(),
            round_accuracy_mean: mean(&played),
            round_accuracy_std_dev: std_dev(&played),
            baseline_clears: session
                .rounds
                .iter()
                .filter(|r| r.has_baseline_clear())
                .count(),
            target_reached: session.is_target_reached(),
            complete: session.is_complete,
        }
    }
}

/// Oldest first
pub fn summarize(sessions: &[PracticeSession]) -> Vec<SessionSummary> {
    sessions
        .iter()
        .map(SessionSummary::from_session)
        .sorted_by_key(|s| s.started)
        .collect()
}

/// Writes one CSV row per session, with a header.
pub fn export_csv<W: Write>(sessions: &[PracticeSession], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "date",
        "mode",
        "rounds",
        "batons",
        "hits",
        "kubbs",
        "accuracy",
        "round_accuracy_mean",
        "round_accuracy_std_dev",
        "baseline_clears",
        "complete",
    ])?;

    for summary in summarize(sessions) {
        writer.write_record([
            summary.started.to_rfc3339(),
            summary.session_type.to_string(),
            summary.rounds.to_string(),
            summary.batons.to_string(),
            summary.hits.to_string(),
            summary.kubbs.to_string(),
            format!("{:.0}", summary.accuracy),
            summary
                .round_accuracy_mean
                .map_or(String::new(), |m| format!("{m:.2}")),
            summary
                .round_accuracy_std_dev
                .map_or(String::new(), |sd| format!("{sd:.2}")),
            summary.baseline_clears.to_string(),
            summary.complete.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
