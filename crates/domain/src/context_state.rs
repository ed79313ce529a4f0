use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle status of a durable session/context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    Active,
    Paused,
    Locked,
    Completed,
    Abandoned,
}

/// An advisory cooperative lock held on a context by an external caller.
/// The core never takes these locks itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextLock {
    pub holder: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextStats {
    pub message_count: u64,
    pub artifact_count: u64,
    pub total_tokens_used: u64,
}

/// The durable record describing one session's identity and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextState {
    pub context_id: String,
    pub agent_id: String,
    pub status: ContextStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub turn_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<ContextLock>,
    #[serde(default)]
    pub stats: ContextStats,
}

impl ContextState {
    pub fn new(context_id: impl Into<String>, agent_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            context_id: context_id.into(),
            agent_id: agent_id.into(),
            status: ContextStatus::Active,
            created_at: now,
            updated_at: now,
            turn_count: 0,
            title: None,
            description: None,
            tags: Vec::new(),
            owner: None,
            shared: None,
            permissions: None,
            lock: None,
            stats: ContextStats::default(),
        }
    }

    pub fn record_turn(&mut self) {
        self.turn_count += 1;
        self.updated_at = Utc::now();
    }
}
