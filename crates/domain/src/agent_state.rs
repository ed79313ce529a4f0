use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The agent session's state machine position. Transitions live in the
/// session crate; this is the data the state machine carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Created,
    Ready,
    Busy,
    Shutdown,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub status: AgentStatus,
    pub turn_count: u64,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            status: AgentStatus::Created,
            turn_count: 0,
            last_activity: now,
            created_at: now,
            error: None,
        }
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new()
    }
}
