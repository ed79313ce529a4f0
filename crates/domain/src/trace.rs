use serde::Serialize;

/// Structured trace events emitted across all agent-core crates.
///
/// These are distinct from the user-facing [`crate::event::Event`] stream:
/// `TraceEvent`s are operator-facing structured logs (`tracing::info!`
/// under the hood), not part of a session's observable protocol.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    TurnStarted {
        context_id: String,
        task_id: String,
    },
    TurnCompleted {
        context_id: String,
        task_id: String,
        iterations: usize,
        duration_ms: u64,
    },
    LlmRequest {
        task_id: String,
        iteration: usize,
        streaming: bool,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    ToolDispatched {
        task_id: String,
        tool_name: String,
        call_id: String,
        success: bool,
        duration_ms: u64,
    },
    CheckpointWritten {
        task_id: String,
        iteration: usize,
    },
    CompactionRun {
        context_id: String,
        strategy: String,
        messages_before: usize,
        messages_after: usize,
        tokens_saved: i64,
    },
    ArtifactOperation {
        artifact_id: String,
        op: String,
        version: u64,
    },
    ReplayBufferEvicted {
        context_id: String,
        evicted: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "agent_core_event");
    }
}
