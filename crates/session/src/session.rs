use std::sync::Arc;

use agentcore_agent_loop::AgentLoop;
use agentcore_artifacts::ArtifactStore;
use agentcore_domain::agent_state::{AgentState, AgentStatus};
use agentcore_domain::config::{CompactionConfig, CompactionStrategy, SessionConfig};
use agentcore_domain::error::Result;
use agentcore_domain::event::{Event, TaskStatus};
use agentcore_domain::tool::{Message, ToolDefinition};
use agentcore_events::EventEmitter;
use agentcore_messages::{compact, RuleBasedSummarizer, Summarizer};
use agentcore_messages::MessageStore;
use chrono::Utc;
use parking_lot::Mutex;

/// The per-context conversational agent.
///
/// Owns the `created → ready → busy → ready` state machine described for
/// the agent session component: `created` only exists until the first
/// `start_turn`, after which the session alternates between `ready` and
/// `busy` (or drops into `error` on a failed turn). `shutdown` is terminal
/// from any state.
pub struct AgentSession {
    context_id: String,
    agent_id: String,
    state: Mutex<AgentState>,
    messages: Arc<MessageStore>,
    artifacts: Arc<dyn ArtifactStore>,
    agent_loop: Arc<AgentLoop>,
    summarizer: Arc<dyn Summarizer>,
    config: SessionConfig,
    system_prompt: Option<String>,
    available_tools: Vec<ToolDefinition>,
}

impl AgentSession {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context_id: impl Into<String>,
        agent_id: impl Into<String>,
        messages: Arc<MessageStore>,
        artifacts: Arc<dyn ArtifactStore>,
        agent_loop: Arc<AgentLoop>,
        config: SessionConfig,
        system_prompt: Option<String>,
        available_tools: Vec<ToolDefinition>,
    ) -> Self {
        Self {
            context_id: context_id.into(),
            agent_id: agent_id.into(),
            state: Mutex::new(AgentState::new()),
            messages,
            artifacts,
            agent_loop,
            summarizer: Arc::new(RuleBasedSummarizer),
            config,
            system_prompt,
            available_tools,
        }
    }

    /// Use an LLM-backed summarizer for auto-compaction instead of the
    /// rule-based fallback.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn state(&self) -> AgentState {
        self.state.lock().clone()
    }

    /// Start a turn. Returns immediately with an [`EventEmitter`] whose
    /// stream the caller subscribes to; the turn itself runs in a spawned
    /// task. If the session is already `busy`, in `error`, or `shutdown`,
    /// the returned emitter carries a single failed `task-status` event
    /// instead of running anything.
    pub fn start_turn(self: &Arc<Self>, user_message: Option<String>, task_id: Option<String>) -> EventEmitter {
        let task_id = task_id.unwrap_or_else(|| self.next_task_id());
        let emitter = EventEmitter::new(self.context_id.clone(), task_id.clone());

        {
            let mut state = self.state.lock();
            match state.status {
                AgentStatus::Busy => {
                    self.reject_turn(&emitter, &task_id, "Agent is already executing a turn");
                    return emitter;
                }
                AgentStatus::Shutdown => {
                    self.reject_turn(&emitter, &task_id, "Agent has been shut down");
                    return emitter;
                }
                AgentStatus::Error => {
                    let message = state
                        .error
                        .clone()
                        .unwrap_or_else(|| "agent is in an error state".to_string());
                    self.reject_turn(&emitter, &task_id, &message);
                    return emitter;
                }
                AgentStatus::Created => {
                    let existing = self.messages.len(&self.context_id);
                    state.turn_count = (existing / 2) as u64;
                }
                AgentStatus::Ready => {}
            }
            state.status = AgentStatus::Busy;
            state.last_activity = Utc::now();
        }

        let session = Arc::clone(self);
        let turn_emitter = emitter.clone();
        tokio::spawn(async move {
            session.run_turn(task_id, user_message, turn_emitter).await;
        });

        emitter
    }

    fn reject_turn(&self, emitter: &EventEmitter, task_id: &str, message: &str) {
        emitter.emit(Event::TaskStatus {
            context_id: self.context_id.clone(),
            task_id: task_id.to_string(),
            status: TaskStatus::Rejected,
            error: Some(message.to_string()),
        });
        emitter.error();
    }

    fn next_task_id(&self) -> String {
        let turn_number = self.state.lock().turn_count + 1;
        format!("{}-turn-{turn_number}-{}", self.context_id, Utc::now().timestamp_millis())
    }

    async fn run_turn(self: Arc<Self>, task_id: String, user_message: Option<String>, emitter: EventEmitter) {
        let mut history = self.messages.get_all(&self.context_id);
        if history.len() > self.config.max_messages {
            history = history.split_off(history.len() - self.config.max_messages);
        }

        if let Some(text) = &user_message {
            let message = Message::user(text.clone());
            history.push(message.clone());
            if self.config.auto_save {
                self.messages.append(&self.context_id, message);
            }
        }

        let outcome = self
            .agent_loop
            .start_turn(
                task_id,
                self.agent_id.clone(),
                self.context_id.clone(),
                None,
                history,
                self.system_prompt.clone(),
                self.available_tools.clone(),
                &emitter,
            )
            .await;

        match outcome {
            Ok(outcome) => {
                if self.config.auto_save && !outcome.new_messages.is_empty() {
                    self.messages.append_many(&self.context_id, outcome.new_messages);
                }
                self.finish_turn(None);
                if self.config.auto_compact {
                    self.maybe_compact();
                }
            }
            Err(err) => {
                self.finish_turn(Some(err.to_string()));
            }
        }
    }

    fn finish_turn(&self, error: Option<String>) {
        let mut state = self.state.lock();
        state.last_activity = Utc::now();
        match error {
            Some(message) => {
                state.status = AgentStatus::Error;
                state.error = Some(message);
            }
            None => {
                state.status = AgentStatus::Ready;
                state.turn_count += 1;
                state.error = None;
            }
        }
    }

    fn maybe_compact(&self) {
        let total = self.messages.len(&self.context_id);
        if total <= self.config.max_messages {
            return;
        }
        let keep_recent = (self.config.max_messages / 2).max(1);
        let config = CompactionConfig {
            strategy: CompactionStrategy::Summarization,
            keep_recent,
            summary_prompt: None,
        };
        let current = self.messages.get_all(&self.context_id);
        if let Ok(outcome) = compact(&self.context_id, &current, &config, self.summarizer.as_ref()) {
            if let Err(error) = self.messages.replace_all(&self.context_id, outcome.messages) {
                tracing::warn!(context_id = %self.context_id, %error, "auto-compaction produced an empty history, keeping the original");
            }
        }
    }

    /// Unconditionally move to `shutdown`. A turn already in flight keeps
    /// running (the spawned task holds its own `Arc`); it simply has
    /// nowhere useful to land its final state transition.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.status = AgentStatus::Shutdown;
        state.last_activity = Utc::now();
    }

    /// The session's message history, most recent `max_messages` (and,
    /// if given, capped additionally by `max_tokens`) messages.
    pub fn get_messages(&self, max_messages: Option<usize>, max_tokens: Option<usize>) -> Vec<Message> {
        let mut messages = self.messages.get_all(&self.context_id);
        if let Some(limit) = max_messages {
            if messages.len() > limit {
                messages = messages.split_off(messages.len() - limit);
            }
        }
        if let Some(token_budget) = max_tokens {
            let mut kept = Vec::new();
            let mut used = 0usize;
            for message in messages.into_iter().rev() {
                let cost = message.estimated_tokens();
                if used + cost > token_budget && !kept.is_empty() {
                    break;
                }
                used += cost;
                kept.push(message);
            }
            kept.reverse();
            return kept;
        }
        messages
    }

    /// Every artifact produced by any task under this context.
    pub fn get_artifacts(&self) -> Vec<agentcore_domain::artifact::Artifact> {
        self.artifacts.list_by_context(&self.context_id)
    }

    /// Persist the current in-memory message history. A no-op for the
    /// in-memory `MessageStore` (already durable for the process
    /// lifetime) but the seam a file- or database-backed store would
    /// hang a flush off of.
    pub fn save(&self) -> Result<()> {
        Ok(())
    }

    /// Drop the session's conversation history and reset `turn_count` to
    /// zero. Does not touch artifacts or the session's status.
    pub fn clear(&self) {
        self.messages.clear(&self.context_id);
        self.state.lock().turn_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentcore_domain::config::LoopConfig;
    use agentcore_domain::tool::ToolCall;
    use agentcore_observability::NoopTracer;
    use agentcore_providers::{MockLlmProvider, ScriptedResponse};
    use agentcore_tasks::TaskStore;
    use agentcore_tools::ToolDispatcher;
    use tokio_stream::StreamExt;

    fn make_session(provider: MockLlmProvider) -> Arc<AgentSession> {
        let agent_loop = Arc::new(AgentLoop::new(
            Arc::new(provider),
            Arc::new(ToolDispatcher::new(vec![])),
            Arc::new(TaskStore::new()),
            Arc::new(NoopTracer),
            LoopConfig::default(),
        ));
        Arc::new(AgentSession::new(
            "ctx-1",
            "agent-1",
            Arc::new(MessageStore::new()),
            Arc::new(agentcore_artifacts::InMemoryArtifactStore::new()),
            agent_loop,
            SessionConfig::default(),
            None,
            vec![],
        ))
    }

    #[tokio::test]
    async fn first_turn_transitions_created_to_ready_on_completion() {
        let session = make_session(MockLlmProvider::new(vec![ScriptedResponse::Text("hi there".into())]));
        assert_eq!(session.state().status, AgentStatus::Created);

        let emitter = session.start_turn(Some("hello".into()), None);
        let mut stream = emitter.subscribe();
        while stream.next().await.is_some() {}

        assert_eq!(session.state().status, AgentStatus::Ready);
        assert_eq!(session.state().turn_count, 1);
        let messages = session.get_messages(None, None);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].content, "hi there");
    }

    #[tokio::test]
    async fn clear_empties_history_and_resets_turn_count() {
        let session = make_session(MockLlmProvider::new(vec![ScriptedResponse::Text("hi there".into())]));

        let emitter = session.start_turn(Some("hello".into()), None);
        let mut stream = emitter.subscribe();
        while stream.next().await.is_some() {}
        assert_eq!(session.state().turn_count, 1);

        session.clear();

        assert_eq!(session.state().turn_count, 0);
        assert!(session.get_messages(None, None).is_empty());
    }

    #[tokio::test]
    async fn concurrent_start_turn_is_rejected_while_busy() {
        let session = make_session(MockLlmProvider::new(vec![ScriptedResponse::Text("slow".into())]));
        let _first = session.start_turn(Some("go".into()), None);

        let second = session.start_turn(Some("again".into()), None);
        let history = second.history();
        assert!(history.iter().any(|e| matches!(
            e,
            Event::TaskStatus {
                status: TaskStatus::Rejected,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn shutdown_rejects_further_turns() {
        let session = make_session(MockLlmProvider::new(vec![ScriptedResponse::Text("ok".into())]));
        session.shutdown();
        assert_eq!(session.state().status, AgentStatus::Shutdown);

        let emitter = session.start_turn(Some("hello".into()), None);
        let history = emitter.history();
        assert!(history.iter().any(|e| matches!(
            e,
            Event::TaskStatus {
                status: TaskStatus::Rejected,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn failed_turn_moves_to_error_state() {
        // Tool call nothing can handle fails harmlessly, so shrink the
        // iteration budget to 1 to force the turn itself to fail instead
        // of looping until the script runs dry.
        let agent_loop = Arc::new(AgentLoop::new(
            Arc::new(MockLlmProvider::new(vec![ScriptedResponse::ToolCalls(vec![ToolCall::new(
                "c1",
                "unregistered",
                serde_json::json!({}),
            )])])),
            Arc::new(ToolDispatcher::new(vec![])),
            Arc::new(TaskStore::new()),
            Arc::new(NoopTracer),
            LoopConfig {
                max_iterations: 1,
                ..LoopConfig::default()
            },
        ));
        let session = Arc::new(AgentSession::new(
            "ctx-2",
            "agent-1",
            Arc::new(MessageStore::new()),
            Arc::new(agentcore_artifacts::InMemoryArtifactStore::new()),
            agent_loop,
            SessionConfig::default(),
            None,
            vec![],
        ));

        let emitter = session.start_turn(Some("go".into()), None);
        let mut stream = emitter.subscribe();
        while stream.next().await.is_some() {}

        assert_eq!(session.state().status, AgentStatus::Error);
    }

    #[tokio::test]
    async fn auto_compaction_shrinks_history_past_the_limit() {
        let mut config = SessionConfig::default();
        config.max_messages = 4;
        let agent_loop = Arc::new(AgentLoop::new(
            Arc::new(MockLlmProvider::new(vec![
                ScriptedResponse::Text("a1".into()),
                ScriptedResponse::Text("a2".into()),
                ScriptedResponse::Text("a3".into()),
            ])),
            Arc::new(ToolDispatcher::new(vec![])),
            Arc::new(TaskStore::new()),
            Arc::new(NoopTracer),
            LoopConfig::default(),
        ));
        let session = Arc::new(AgentSession::new(
            "ctx-3",
            "agent-1",
            Arc::new(MessageStore::new()),
            Arc::new(agentcore_artifacts::InMemoryArtifactStore::new()),
            agent_loop,
            config,
            None,
            vec![],
        ));

        for turn in ["t1", "t2", "t3"] {
            let emitter = session.start_turn(Some(turn.into()), None);
            let mut stream = emitter.subscribe();
            while stream.next().await.is_some() {}
        }

        let messages = session.get_messages(None, None);
        assert!(messages.len() < 6, "expected compaction to shrink below raw 6 messages, got {}", messages.len());
        assert!(messages.iter().any(|m| m.content.contains("messages omitted")));
    }
}
