//! JSON shapes exchanged with the companion watch.
//!
//! Field and enum value names are part of the compatibility contract with the watch
//! app; timestamps travel as epoch milliseconds.

use crate::modes::{InkastBlastRules, PitchPhase};
use crate::session::{PracticeSession, SessionType};
use crate::throws::{ThrowInput, ThrowType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextItemKind {
    Progress,
    Stat,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    pub label: String,
    pub value: String,
    pub kind: ContextItemKind,
}

impl ContextItem {
    fn new(label: &str, value: impl Into<String>, kind: ContextItemKind) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            kind,
        }
    }
}

/// Display state mirrored on the watch. Regenerated from the session on every push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchSessionState {
    pub session_id: String,
    pub session_type: SessionType,
    pub title: String,
    pub context_items: Vec<ContextItem>,
    pub is_active: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

/// A throw entered on the watch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchThrowEvent {
    pub session_id: String,
    pub throw_type: ThrowType,
    pub is_hit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubbs_hit: Option<u32>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl WatchThrowEvent {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Raw signal for the session engine. The watch's `throwType` is advisory; the mode
    /// rules classify the throw themselves.
    pub fn to_input(&self) -> ThrowInput {
        match self.kubbs_hit {
            Some(count) if self.throw_type == ThrowType::MultiKubb => {
                ThrowInput::kubbs(count).at(self.timestamp)
            }
            _ => ThrowInput {
                is_hit: self.is_hit,
                kubbs_hit: None,
                timestamp: Some(self.timestamp),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputMode {
    HitMiss,
    KubbCount,
}

/// Tells the watch which input controls to show for the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchInputConfig {
    pub session_id: String,
    pub session_type: SessionType,
    pub input_mode: InputMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_kubbs_per_throw: Option<u32>,
}

impl WatchInputConfig {
    pub fn for_session(session: &PracticeSession) -> Self {
        let (input_mode, max_kubbs_per_throw) = match session.session_type {
            SessionType::InkastBlast => (
                InputMode::KubbCount,
                Some(InkastBlastRules::field_size(session)),
            ),
            SessionType::Standard | SessionType::AroundThePitch => (InputMode::HitMiss, None),
        };
        Self {
            session_id: session.id.clone(),
            session_type: session.session_type,
            input_mode,
            max_kubbs_per_throw,
        }
    }
}

fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

/// Projects the session onto the watch display. Pure: the same session yields the same state.
pub fn serialize(session: &PracticeSession) -> WatchSessionState {
    use ContextItemKind::{Progress, Stat, Warning};

    let round_number = session.rounds.last().map_or(1, |r| r.round_number);
    let mut items = Vec::new();

    match session.session_type {
        SessionType::Standard => {
            items.push(ContextItem::new("Round", round_number.to_string(), Progress));
            items.push(ContextItem::new(
                "Batons",
                format!("{}/{}", session.total_batons, session.target),
                Progress,
            ));
            items.push(ContextItem::new("Hits", session.hits().to_string(), Stat));
            items.push(ContextItem::new("Accuracy", percent(session.accuracy()), Stat));
        }
        SessionType::AroundThePitch => {
            let board = session.pitch_board().unwrap_or_default();
            let aim = match board.phase() {
                PitchPhase::ThrowingBaseline(n) => format!("Baseline {n}"),
                PitchPhase::ThrowingKing => "King".to_string(),
                PitchPhase::Cleared => "Cleared".to_string(),
            };
            items.push(ContextItem::new("Target", aim, Progress));
            items.push(ContextItem::new(
                "Kubbs",
                format!("{}/10", board.kubbs_down()),
                Progress,
            ));
            let throws = match session.target_score {
                Some(budget) => format!("{}/{}", session.total_batons, budget),
                None => session.total_batons.to_string(),
            };
            items.push(ContextItem::new("Throws", throws, Stat));
            if let Some(warning) = session.warning() {
                items.push(ContextItem::new("Warning", warning.message(), Warning));
            }
        }
        SessionType::InkastBlast => {
            items.push(ContextItem::new("Round", round_number.to_string(), Progress));
            items.push(ContextItem::new(
                "Kubbs",
                format!("{}/{}", session.total_kubbs, session.target),
                Progress,
            ));
            let field = session.current_round().map_or(0, |r| r.kubbs_down());
            items.push(ContextItem::new(
                "Field",
                format!("{}/{}", field, InkastBlastRules::field_size(session)),
                Stat,
            ));
            items.push(ContextItem::new(
                "Batons",
                session.total_batons.to_string(),
                Stat,
            ));
        }
    }

    WatchSessionState {
        session_id: session.id.clone(),
        session_type: session.session_type,
        title: session.session_type.title().to_string(),
        context_items: items,
        is_active: !session.is_complete && !session.is_paused,
        last_updated: session.updated_at,
    }
}
