use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::error::{Result, StrikeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Call,
    Email,
    Note,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub lead_id: String,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub content: String,
    /// Calls only, e.g. "answered", "voicemail".
    #[serde(default)]
    pub outcome: Option<String>,
    /// Minutes.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/activities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub lead_id: String,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl ActivityDraft {
    pub fn validate(&self) -> Result<()> {
        if self.lead_id.trim().is_empty() {
            return Err(StrikeError::Invalid("Activity must belong to a lead".to_string()));
        }
        if self.activity_type == ActivityType::Note && self.content.trim().is_empty() {
            return Err(StrikeError::Invalid("Note cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn placeholder(&self, id: String, now: DateTime<Utc>) -> Activity {
        Activity {
            id,
            lead_id: self.lead_id.clone(),
            activity_type: self.activity_type,
            content: self.content.clone(),
            outcome: self.outcome.clone(),
            duration: self.duration,
            created_at: now,
        }
    }
}
