use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a single baton was thrown at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ThrowType {
    Kubb,
    King,
    MultiKubb,
}

/// One baton throw. Appended to a round and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrowRecord {
    pub is_hit: bool,
    pub throw_type: ThrowType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubbs_hit: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl ThrowRecord {
    pub fn kubb(is_hit: bool, baseline_number: Option<u8>, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_hit,
            throw_type: ThrowType::Kubb,
            baseline_number,
            kubbs_hit: None,
            timestamp,
        }
    }

    pub fn king(is_hit: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_hit,
            throw_type: ThrowType::King,
            baseline_number: None,
            kubbs_hit: None,
            timestamp,
        }
    }

    pub fn multi_kubb(kubbs_hit: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_hit: kubbs_hit > 0,
            throw_type: ThrowType::MultiKubb,
            baseline_number: None,
            kubbs_hit: Some(kubbs_hit),
            timestamp,
        }
    }

    /// Number of field/baseline kubbs this throw knocked down. King hits count zero.
    pub fn kubbs_down(&self) -> u32 {
        match self.throw_type {
            ThrowType::King => 0,
            ThrowType::MultiKubb => self.kubbs_hit.unwrap_or(0),
            ThrowType::Kubb => u32::from(self.is_hit),
        }
    }
}

/// Raw signal coming from a UI tap or a watch message, before a mode classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThrowInput {
    pub is_hit: bool,
    pub kubbs_hit: Option<u32>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ThrowInput {
    pub fn hit() -> Self {
        Self {
            is_hit: true,
            ..Self::default()
        }
    }

    pub fn miss() -> Self {
        Self::default()
    }

    pub fn kubbs(count: u32) -> Self {
        Self {
            is_hit: count > 0,
            kubbs_hit: Some(count),
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn timestamp_or_now(&self) -> DateTime<Utc> {
        self.timestamp.unwrap_or_else(Utc::now)
    }
}
