use serde::{Deserialize, Serialize};

use crate::tool::{ToolCall, ToolResult};

/// Lifecycle status carried by `task-status` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Submitted,
    Working,
    InputRequired,
    Completed,
    Canceled,
    Failed,
    Rejected,
    AuthRequired,
}

/// The kind of reasoning a `thought-stream` event conveys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtType {
    Planning,
    Reasoning,
    Reflection,
    Decision,
    Observation,
    Critique,
    Strategy,
}

impl ThoughtType {
    pub const ALL: [ThoughtType; 7] = [
        ThoughtType::Planning,
        ThoughtType::Reasoning,
        ThoughtType::Reflection,
        ThoughtType::Decision,
        ThoughtType::Observation,
        ThoughtType::Critique,
        ThoughtType::Strategy,
    ];
}

/// How verbose a thought event's content is meant to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtVerbosity {
    Brief,
    Normal,
    Detailed,
}

/// A thought emission, either extracted from `<thinking>` tags or produced
/// by the `think_aloud` pseudo-tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    pub thought_type: ThoughtType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<ThoughtVerbosity>,
}

/// The closed set of events emitted over a session's observable stream.
///
/// Every event carries `context_id` and `task_id`; `llm-call` and
/// `checkpoint` are internal and are not guaranteed to reach external
/// subscribers (see the event emitter's external-visibility filter).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "task-created")]
    TaskCreated { context_id: String, task_id: String },

    #[serde(rename = "task-status")]
    TaskStatus {
        context_id: String,
        task_id: String,
        status: TaskStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "task-complete")]
    TaskComplete {
        context_id: String,
        task_id: String,
        content: String,
    },

    #[serde(rename = "task-failed")]
    TaskFailed {
        context_id: String,
        task_id: String,
        error: String,
    },

    #[serde(rename = "content-delta")]
    ContentDelta {
        context_id: String,
        task_id: String,
        delta: String,
        chunk_index: u64,
    },

    #[serde(rename = "content-complete")]
    ContentComplete {
        context_id: String,
        task_id: String,
        content: String,
    },

    #[serde(rename = "thought-stream")]
    ThoughtStream {
        context_id: String,
        task_id: String,
        thought: Thought,
    },

    #[serde(rename = "tool-start")]
    ToolStart {
        context_id: String,
        task_id: String,
        call: ToolCall,
    },

    #[serde(rename = "tool-complete")]
    ToolComplete {
        context_id: String,
        task_id: String,
        result: ToolResult,
    },

    #[serde(rename = "file-write")]
    FileWrite {
        context_id: String,
        task_id: String,
        artifact_id: String,
        chunk_index: u64,
        is_last_chunk: bool,
    },

    #[serde(rename = "data-write")]
    DataWrite {
        context_id: String,
        task_id: String,
        artifact_id: String,
    },

    #[serde(rename = "dataset-write")]
    DatasetWrite {
        context_id: String,
        task_id: String,
        artifact_id: String,
        batch_index: u64,
        is_last_batch: bool,
    },

    /// Internal: one LLM streaming call started. Not shipped externally.
    #[serde(rename = "llm-call")]
    LlmCall {
        context_id: String,
        task_id: String,
        iteration: usize,
    },

    /// Internal: a checkpoint was written. Not shipped externally.
    #[serde(rename = "checkpoint")]
    Checkpoint {
        context_id: String,
        task_id: String,
        iteration: usize,
    },
}

impl Event {
    pub fn context_id(&self) -> &str {
        match self {
            Event::TaskCreated { context_id, .. }
            | Event::TaskStatus { context_id, .. }
            | Event::TaskComplete { context_id, .. }
            | Event::TaskFailed { context_id, .. }
            | Event::ContentDelta { context_id, .. }
            | Event::ContentComplete { context_id, .. }
            | Event::ThoughtStream { context_id, .. }
            | Event::ToolStart { context_id, .. }
            | Event::ToolComplete { context_id, .. }
            | Event::FileWrite { context_id, .. }
            | Event::DataWrite { context_id, .. }
            | Event::DatasetWrite { context_id, .. }
            | Event::LlmCall { context_id, .. }
            | Event::Checkpoint { context_id, .. } => context_id,
        }
    }

    pub fn task_id(&self) -> &str {
        match self {
            Event::TaskCreated { task_id, .. }
            | Event::TaskStatus { task_id, .. }
            | Event::TaskComplete { task_id, .. }
            | Event::TaskFailed { task_id, .. }
            | Event::ContentDelta { task_id, .. }
            | Event::ContentComplete { task_id, .. }
            | Event::ThoughtStream { task_id, .. }
            | Event::ToolStart { task_id, .. }
            | Event::ToolComplete { task_id, .. }
            | Event::FileWrite { task_id, .. }
            | Event::DataWrite { task_id, .. }
            | Event::DatasetWrite { task_id, .. }
            | Event::LlmCall { task_id, .. }
            | Event::Checkpoint { task_id, .. } => task_id,
        }
    }

    /// Internal events are not guaranteed to ship to external (e.g. SSE)
    /// subscribers. Used by transports that filter the replay buffer.
    pub fn is_internal(&self) -> bool {
        matches!(self, Event::LlmCall { .. } | Event::Checkpoint { .. })
    }

    /// SSE `event:` field name for this event kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::TaskCreated { .. } => "task-created",
            Event::TaskStatus { .. } => "task-status",
            Event::TaskComplete { .. } => "task-complete",
            Event::TaskFailed { .. } => "task-failed",
            Event::ContentDelta { .. } => "content-delta",
            Event::ContentComplete { .. } => "content-complete",
            Event::ThoughtStream { .. } => "thought-stream",
            Event::ToolStart { .. } => "tool-start",
            Event::ToolComplete { .. } => "tool-complete",
            Event::FileWrite { .. } => "file-write",
            Event::DataWrite { .. } => "data-write",
            Event::DatasetWrite { .. } => "dataset-write",
            Event::LlmCall { .. } => "llm-call",
            Event::Checkpoint { .. } => "checkpoint",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_events_are_flagged() {
        let ev = Event::LlmCall {
            context_id: "c".into(),
            task_id: "t".into(),
            iteration: 0,
        };
        assert!(ev.is_internal());

        let ev = Event::TaskCreated {
            context_id: "c".into(),
            task_id: "t".into(),
        };
        assert!(!ev.is_internal());
    }

    #[test]
    fn accessors_pull_correlation_ids() {
        let ev = Event::ContentDelta {
            context_id: "ctx-1".into(),
            task_id: "task-1".into(),
            delta: "hi".into(),
            chunk_index: 0,
        };
        assert_eq!(ev.context_id(), "ctx-1");
        assert_eq!(ev.task_id(), "task-1");
        assert_eq!(ev.kind_name(), "content-delta");
    }
}
