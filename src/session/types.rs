use crate::core::StoredMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Schema version written into every index document
pub const INDEX_VERSION: &str = "1.0";

/// Per-session metadata, stored both in the session file and in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub message_count: usize,
    pub first_message: String,
    pub provider: String,
    pub model: String,
}

impl SessionMetadata {
    /// Newest activity first, ties broken by descending id
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.last_activity_at
            .cmp(&a.last_activity_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Full persisted unit: `<session_dir>/<id>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub metadata: SessionMetadata,
    pub messages: Vec<StoredMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_summary: Option<String>,
}

/// Just the metadata of a session file; messages are skipped during rebuilds
#[derive(Debug, Deserialize)]
pub(crate) struct SessionHeader {
    pub metadata: SessionMetadata,
}

/// Denormalized cache of every session's metadata: `<session_dir>/index.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIndex {
    pub version: String,
    pub sessions: BTreeMap<String, SessionMetadata>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl SessionIndex {
    pub fn new() -> Self {
        Self {
            version: INDEX_VERSION.to_string(),
            sessions: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// All entries ordered for display, newest first
    pub fn sorted(&self) -> Vec<SessionMetadata> {
        let mut sessions: Vec<SessionMetadata> = self.sessions.values().cloned().collect();
        sessions.sort_by(SessionMetadata::newest_first);
        sessions
    }
}

impl Default for SessionIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-supplied options for [`crate::session::SessionStore::save_session`]
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Re-save under an existing id; takes precedence over `name` for the id
    pub session_id: Option<String>,
    /// Custom display name; sanitized into the id when `session_id` is absent
    pub name: Option<String>,
    pub description: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// What a resuming caller needs to replay a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredSession {
    pub messages: Vec<StoredMessage>,
    pub context_summary: Option<String>,
}
