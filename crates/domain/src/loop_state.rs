use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::llm::LlmChunk;
use crate::tool::{Message, ToolCall, ToolDefinition, ToolResult};

/// Live, in-memory state for a single turn. Created at turn start, mutated
/// only by the agent loop, and destroyed at turn end. [`PersistedLoopState`]
/// is the projection of this that survives a crash.
pub struct LoopState {
    pub task_id: String,
    pub agent_id: String,
    pub context_id: String,
    pub parent_task_id: Option<String>,
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    pub available_tools: Vec<ToolDefinition>,
    /// Keyed by tool-call id; insertion order is irrelevant.
    pub tool_results: HashMap<String, ToolResult>,
    pub iteration: usize,
    pub max_iterations: usize,
    pub completed: bool,
    pub last_response: Option<LlmChunk>,
}

impl LoopState {
    pub fn new(
        task_id: impl Into<String>,
        agent_id: impl Into<String>,
        context_id: impl Into<String>,
        parent_task_id: Option<String>,
        messages: Vec<Message>,
        system_prompt: Option<String>,
        available_tools: Vec<ToolDefinition>,
        max_iterations: usize,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            agent_id: agent_id.into(),
            context_id: context_id.into(),
            parent_task_id,
            messages,
            system_prompt,
            available_tools,
            tool_results: HashMap::new(),
            iteration: 0,
            max_iterations,
            completed: false,
            last_response: None,
        }
    }

    pub fn to_persisted(&self, resume_from: ResumeFrom, pending_tool_calls: Vec<ToolCall>, artifact_ids: Vec<String>) -> PersistedLoopState {
        PersistedLoopState {
            task_id: self.task_id.clone(),
            agent_id: self.agent_id.clone(),
            parent_task_id: self.parent_task_id.clone(),
            context_id: self.context_id.clone(),
            messages: self.messages.clone(),
            system_prompt: self.system_prompt.clone(),
            iteration: self.iteration,
            completed: self.completed,
            available_tools: self.available_tools.clone(),
            pending_tool_calls,
            completed_tool_calls: self.tool_results.clone(),
            artifact_ids,
            sub_agent_snapshots: Vec::new(),
            last_response: self.last_response.as_ref().map(persisted_chunk),
            last_activity: Utc::now(),
            resume_from,
        }
    }
}

/// Where the loop should pick back up after a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResumeFrom {
    LlmCall,
    ToolExecution,
    SubAgent,
    Completed,
}

/// A JSON-serializable snapshot of the final chunk of the last LLM
/// response, sufficient to resume or report without re-running anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedLlmChunk {
    pub content: Option<String>,
    pub finished: bool,
    pub finish_reason: Option<String>,
}

fn persisted_chunk(chunk: &LlmChunk) -> PersistedLlmChunk {
    PersistedLlmChunk {
        content: chunk.content.clone(),
        finished: chunk.finished,
        finish_reason: chunk.finish_reason.map(|r| format!("{r:?}").to_lowercase()),
    }
}

/// The crash-resumable projection of [`LoopState`]. Stable keys; readers
/// must tolerate and ignore unknown keys (some persisted documents may
/// carry vestigial fields from older event-shape experiments).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedLoopState {
    pub task_id: String,
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,
    pub context_id: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    pub iteration: usize,
    pub completed: bool,
    pub available_tools: Vec<ToolDefinition>,
    pub pending_tool_calls: Vec<ToolCall>,
    pub completed_tool_calls: HashMap<String, ToolResult>,
    pub artifact_ids: Vec<String>,
    #[serde(default)]
    pub sub_agent_snapshots: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response: Option<PersistedLlmChunk>,
    pub last_activity: DateTime<Utc>,
    pub resume_from: ResumeFrom,
}
