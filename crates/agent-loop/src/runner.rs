use std::sync::Arc;

use agentcore_domain::config::LoopConfig;
use agentcore_domain::error::{Error, Result};
use agentcore_domain::event::{Event, TaskStatus, Thought, ThoughtType};
use agentcore_domain::loop_state::{LoopState, PersistedLoopState, ResumeFrom};
use agentcore_domain::tool::{Message, ToolCall, ToolDefinition};
use agentcore_events::EventEmitter;
use agentcore_observability::Tracer;
use agentcore_providers::{ChatRequest, LlmProvider};
use agentcore_tasks::TaskStore;
use agentcore_tools::{ThoughtToolProvider, ToolDispatcher};
use tokio_stream::StreamExt;

use crate::dispatch::dispatch_all;
use crate::sanitize::sanitize_tool_calls;
use crate::thought_extractor::ThoughtExtractor;

/// What a turn produced, once it lands on a final assistant message with
/// no further tool calls to run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub content: String,
    pub iterations: usize,
    /// Assistant and tool messages produced during the turn, in order,
    /// excluding the history the caller passed in. Callers persist these
    /// rather than re-deriving them from the event stream.
    pub new_messages: Vec<Message>,
}

enum LlmStep {
    Done(String),
    ToolCalls(Vec<ToolCall>),
}

/// Drives one turn: generate, extract thoughts, dispatch tool calls,
/// checkpoint, repeat until the model stops asking for tools or
/// `max_iterations` is hit.
pub struct AgentLoop {
    provider: Arc<dyn LlmProvider>,
    dispatcher: Arc<ToolDispatcher>,
    tasks: Arc<TaskStore>,
    tracer: Arc<dyn Tracer>,
    config: LoopConfig,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        dispatcher: Arc<ToolDispatcher>,
        tasks: Arc<TaskStore>,
        tracer: Arc<dyn Tracer>,
        config: LoopConfig,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            tasks,
            tracer,
            config,
        }
    }

    /// Start a fresh turn.
    #[allow(clippy::too_many_arguments)]
    pub async fn start_turn(
        &self,
        task_id: impl Into<String>,
        agent_id: impl Into<String>,
        context_id: impl Into<String>,
        parent_task_id: Option<String>,
        messages: Vec<Message>,
        system_prompt: Option<String>,
        available_tools: Vec<ToolDefinition>,
        emitter: &EventEmitter,
    ) -> Result<LoopOutcome> {
        let state = LoopState::new(
            task_id,
            agent_id,
            context_id,
            parent_task_id,
            messages,
            system_prompt,
            available_tools,
            self.config.max_iterations,
        );
        emitter.emit(Event::TaskCreated {
            context_id: state.context_id.clone(),
            task_id: state.task_id.clone(),
        });
        emitter.emit(Event::TaskStatus {
            context_id: state.context_id.clone(),
            task_id: state.task_id.clone(),
            status: TaskStatus::Working,
            error: None,
        });
        self.drive(state, Vec::new(), emitter).await
    }

    /// Resume a turn from a checkpoint. `Completed` checkpoints short-circuit
    /// without touching the provider or any tool; `ToolExecution` replays the
    /// pending calls (they may not have finished before the crash); anything
    /// else just re-enters the loop at the next LLM call.
    pub async fn resume_turn(&self, persisted: PersistedLoopState, emitter: &EventEmitter) -> Result<LoopOutcome> {
        if persisted.resume_from == ResumeFrom::Completed {
            let content = persisted
                .last_response
                .and_then(|c| c.content)
                .unwrap_or_default();
            return Ok(LoopOutcome {
                content,
                iterations: persisted.iteration,
                new_messages: Vec::new(),
            });
        }

        let pending = if persisted.resume_from == ResumeFrom::ToolExecution {
            persisted.pending_tool_calls.clone()
        } else {
            Vec::new()
        };

        let mut state = LoopState::new(
            persisted.task_id,
            persisted.agent_id,
            persisted.context_id,
            persisted.parent_task_id,
            persisted.messages,
            persisted.system_prompt,
            persisted.available_tools,
            self.config.max_iterations,
        );
        state.iteration = persisted.iteration;
        state.tool_results = persisted.completed_tool_calls;

        emitter.emit(Event::TaskStatus {
            context_id: state.context_id.clone(),
            task_id: state.task_id.clone(),
            status: TaskStatus::Working,
            error: None,
        });
        self.drive(state, pending, emitter).await
    }

    async fn drive(&self, mut state: LoopState, mut pending_calls: Vec<ToolCall>, emitter: &EventEmitter) -> Result<LoopOutcome> {
        let _turn_span = self.tracer.turn_span(&state.context_id, &state.task_id).entered();
        let messages_start = state.messages.len();

        loop {
            if !pending_calls.is_empty() {
                self.run_tool_calls(&mut state, &pending_calls, emitter).await;
                pending_calls.clear();
                if self.checkpoint_due(state.iteration) {
                    self.checkpoint(&state, ResumeFrom::LlmCall, Vec::new(), emitter)?;
                }
            }

            if state.iteration >= state.max_iterations {
                let err = Error::MaxIterationsReached(state.max_iterations);
                emitter.emit(Event::TaskFailed {
                    context_id: state.context_id.clone(),
                    task_id: state.task_id.clone(),
                    error: err.to_string(),
                });
                emitter.emit(Event::TaskStatus {
                    context_id: state.context_id.clone(),
                    task_id: state.task_id.clone(),
                    status: TaskStatus::Failed,
                    error: Some(err.to_string()),
                });
                emitter.error();
                return Err(err);
            }

            let step = self.run_llm_call(&mut state, emitter).await?;
            match step {
                LlmStep::Done(content) => {
                    state.completed = true;
                    emitter.emit(Event::TaskComplete {
                        context_id: state.context_id.clone(),
                        task_id: state.task_id.clone(),
                        content: content.clone(),
                    });
                    emitter.emit(Event::TaskStatus {
                        context_id: state.context_id.clone(),
                        task_id: state.task_id.clone(),
                        status: TaskStatus::Completed,
                        error: None,
                    });
                    if self.config.checkpoint_enabled {
                        self.checkpoint(&state, ResumeFrom::Completed, Vec::new(), emitter)?;
                    }
                    let iterations = state.iteration;
                    let new_messages = state.messages[messages_start.min(state.messages.len())..].to_vec();
                    emitter.complete();
                    return Ok(LoopOutcome {
                        content,
                        iterations,
                        new_messages,
                    });
                }
                LlmStep::ToolCalls(calls) => {
                    state.iteration += 1;
                    if self.config.checkpoint_enabled {
                        self.checkpoint(&state, ResumeFrom::ToolExecution, calls.clone(), emitter)?;
                    }
                    pending_calls = calls;
                }
            }
        }
    }

    fn checkpoint_due(&self, iteration: usize) -> bool {
        self.config.checkpoint_enabled && iteration % self.config.checkpoint_interval.max(1) == 0
    }

    fn checkpoint(&self, state: &LoopState, resume_from: ResumeFrom, pending: Vec<ToolCall>, emitter: &EventEmitter) -> Result<()> {
        let iteration = state.iteration;
        self.tasks.save(state.to_persisted(resume_from, pending, Vec::new()))?;
        emitter.emit(Event::Checkpoint {
            context_id: state.context_id.clone(),
            task_id: state.task_id.clone(),
            iteration,
        });
        Ok(())
    }

    async fn run_llm_call(&self, state: &mut LoopState, emitter: &EventEmitter) -> Result<LlmStep> {
        let _span = self.tracer.llm_call_span(&state.task_id, state.iteration).entered();
        emitter.emit(Event::LlmCall {
            context_id: state.context_id.clone(),
            task_id: state.task_id.clone(),
            iteration: state.iteration,
        });

        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        if let Some(system_prompt) = &state.system_prompt {
            messages.push(Message::system(system_prompt.clone()));
        }
        messages.extend(state.messages.iter().cloned());

        let request = ChatRequest {
            messages,
            tools: state.available_tools.clone(),
            ..Default::default()
        };

        let mut stream = self.provider.chat_stream(request).await?;
        let mut extractor = ThoughtExtractor::new();
        let mut chunk_index = 0u64;
        let mut cleaned = String::new();
        let mut final_chunk = None;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            if let Some(delta) = &chunk.content_delta {
                let extracted = extractor.push(delta);
                self.emit_extracted(state, emitter, extracted, &mut chunk_index, &mut cleaned);
            }
            if chunk.finished {
                final_chunk = Some(chunk);
                break;
            }
        }
        let flushed = extractor.finish();
        self.emit_extracted(state, emitter, flushed, &mut chunk_index, &mut cleaned);

        let chunk = final_chunk.ok_or_else(|| Error::Provider {
            provider: self.provider.provider_id().to_string(),
            message: "stream ended without a final chunk".into(),
        })?;
        state.last_response = Some(chunk.clone());

        emitter.emit(Event::ContentComplete {
            context_id: state.context_id.clone(),
            task_id: state.task_id.clone(),
            content: cleaned.clone(),
        });

        match chunk.tool_calls {
            None => {
                state.messages.push(Message::assistant(cleaned.clone()));
                Ok(LlmStep::Done(cleaned))
            }
            Some(raw_calls) => {
                let calls = sanitize_tool_calls(raw_calls);
                state
                    .messages
                    .push(Message::assistant_with_tool_calls(cleaned, calls.clone()));
                Ok(LlmStep::ToolCalls(calls))
            }
        }
    }

    fn emit_extracted(
        &self,
        state: &LoopState,
        emitter: &EventEmitter,
        extracted: crate::thought_extractor::Extracted,
        chunk_index: &mut u64,
        cleaned: &mut String,
    ) {
        if let Some(thought_text) = extracted.thought {
            emitter.emit(Event::ThoughtStream {
                context_id: state.context_id.clone(),
                task_id: state.task_id.clone(),
                thought: Thought {
                    thought_type: ThoughtType::Reasoning,
                    content: thought_text,
                    id: None,
                    confidence: None,
                    alternatives: None,
                    related_to: None,
                    verbosity: None,
                },
            });
        }
        if let Some(content_text) = extracted.content {
            cleaned.push_str(&content_text);
            emitter.emit(Event::ContentDelta {
                context_id: state.context_id.clone(),
                task_id: state.task_id.clone(),
                delta: content_text,
                chunk_index: *chunk_index,
            });
            *chunk_index += 1;
        }
    }

    async fn run_tool_calls(&self, state: &mut LoopState, calls: &[ToolCall], emitter: &EventEmitter) {
        for call in calls {
            emitter.emit(Event::ToolStart {
                context_id: state.context_id.clone(),
                task_id: state.task_id.clone(),
                call: call.clone(),
            });
            if let Some(thought) = ThoughtToolProvider::parse(call) {
                emitter.emit(Event::ThoughtStream {
                    context_id: state.context_id.clone(),
                    task_id: state.task_id.clone(),
                    thought,
                });
            }
        }

        let _span = self.tracer.tool_span(&state.task_id, "batch", &state.task_id).entered();
        let results = dispatch_all(&self.dispatcher, calls).await;

        for result in results {
            emitter.emit(Event::ToolComplete {
                context_id: state.context_id.clone(),
                task_id: state.task_id.clone(),
                result: result.clone(),
            });
            state.messages.push(Message::tool_result(
                result.tool_call_id.clone(),
                result.tool_name.clone(),
                result.to_message_content(),
            ));
            state.tool_results.insert(result.tool_call_id.clone(), result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentcore_domain::tool::Role;
    use agentcore_observability::NoopTracer;
    use agentcore_providers::{MockLlmProvider, ScriptedResponse};
    use agentcore_tools::local::LocalToolProvider;

    fn make_loop(provider: MockLlmProvider, dispatcher: ToolDispatcher) -> AgentLoop {
        AgentLoop::new(
            Arc::new(provider),
            Arc::new(dispatcher),
            Arc::new(TaskStore::new()),
            Arc::new(NoopTracer),
            LoopConfig::default(),
        )
    }

    #[tokio::test]
    async fn single_completion_with_no_tool_calls() {
        let provider = MockLlmProvider::new(vec![ScriptedResponse::Text("hello there".into())]);
        let dispatcher = ToolDispatcher::new(vec![]);
        let agent_loop = make_loop(provider, dispatcher);
        let emitter = EventEmitter::new("ctx-1", "task-1");

        let outcome = agent_loop
            .start_turn(
                "task-1",
                "agent-1",
                "ctx-1",
                None,
                vec![Message::user("hi")],
                None,
                vec![],
                &emitter,
            )
            .await
            .unwrap();

        assert_eq!(outcome.content, "hello there");
        let history = emitter.history();
        assert!(history.iter().any(|e| matches!(e, Event::TaskComplete { .. })));
    }

    #[tokio::test]
    async fn tool_roundtrip_then_final_answer() {
        let local = Arc::new(LocalToolProvider::new());
        local
            .register(
                agentcore_domain::tool::ToolDefinition {
                    name: "get_weather".into(),
                    description: "".into(),
                    parameters: serde_json::Value::Null,
                },
                Arc::new(|_args: &serde_json::Value| Ok(serde_json::json!({"temp": 70}))),
            )
            .unwrap();
        let dispatcher = ToolDispatcher::new(vec![local]);

        let provider = MockLlmProvider::new(vec![
            ScriptedResponse::ToolCalls(vec![ToolCall::new("c1", "get_weather", serde_json::json!({}))]),
            ScriptedResponse::Text("it's 70 degrees".into()),
        ]);
        let agent_loop = make_loop(provider, dispatcher);
        let emitter = EventEmitter::new("ctx-1", "task-1");

        let outcome = agent_loop
            .start_turn(
                "task-1",
                "agent-1",
                "ctx-1",
                None,
                vec![Message::user("weather?")],
                None,
                vec![],
                &emitter,
            )
            .await
            .unwrap();

        assert_eq!(outcome.content, "it's 70 degrees");
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.new_messages.len(), 3);
        assert_eq!(outcome.new_messages[1].role, Role::Tool);
        let history = emitter.history();
        assert!(history.iter().any(|e| matches!(e, Event::ToolComplete { .. })));
    }

    #[tokio::test]
    async fn think_aloud_call_emits_a_thought_stream_event() {
        let dispatcher = ToolDispatcher::new(vec![]);
        let provider = MockLlmProvider::new(vec![
            ScriptedResponse::ToolCalls(vec![ToolCall::new(
                "c1",
                "think_aloud",
                serde_json::json!({ "thought": "let me break this down", "thought_type": "planning" }),
            )]),
            ScriptedResponse::Text("done".into()),
        ]);
        let agent_loop = make_loop(provider, dispatcher);
        let emitter = EventEmitter::new("ctx-1", "task-1");

        let outcome = agent_loop
            .start_turn("task-1", "agent-1", "ctx-1", None, vec![Message::user("go")], None, vec![], &emitter)
            .await
            .unwrap();

        assert_eq!(outcome.content, "done");
        let history = emitter.history();
        assert!(history.iter().any(|e| matches!(
            e,
            Event::ThoughtStream { thought, .. } if thought.content == "let me break this down"
        )));
    }

    #[tokio::test]
    async fn exhausting_max_iterations_fails_the_turn() {
        let dispatcher = ToolDispatcher::new(vec![]);
        let provider = MockLlmProvider::new(vec![ScriptedResponse::ToolCalls(vec![ToolCall::new(
            "c1",
            "noop",
            serde_json::json!({}),
        )])]);
        let mut config = LoopConfig::default();
        config.max_iterations = 1;
        let agent_loop = AgentLoop::new(
            Arc::new(provider),
            Arc::new(dispatcher),
            Arc::new(TaskStore::new()),
            Arc::new(NoopTracer),
            config,
        );
        let emitter = EventEmitter::new("ctx-1", "task-1");

        let err = agent_loop
            .start_turn("task-1", "agent-1", "ctx-1", None, vec![Message::user("go")], None, vec![], &emitter)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "max_iterations_reached");
    }
}
