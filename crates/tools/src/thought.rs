use agentcore_domain::event::{Thought, ThoughtType, ThoughtVerbosity};
use agentcore_domain::tool::{ToolCall, ToolResult};

use crate::ToolProvider;

const TOOL_NAME: &str = "think_aloud";

/// Handles the `think_aloud` pseudo-tool: the model "calls" it purely to
/// narrate reasoning, not to act on the world. Always takes precedence
/// over every other provider in [`crate::dispatcher::ToolDispatcher`] so a
/// real tool can never shadow it.
pub struct ThoughtToolProvider;

impl ThoughtToolProvider {
    pub fn tool_name() -> &'static str {
        TOOL_NAME
    }

    /// Parse a `think_aloud` call's arguments into a [`Thought`], if the
    /// call is one. Exposed so the agent loop can turn a dispatched call
    /// into a `thought-stream` event without re-implementing the parse.
    pub fn parse(call: &ToolCall) -> Option<Thought> {
        if call.tool_name != TOOL_NAME {
            return None;
        }
        let args = call.arguments.as_object()?;
        let thought_type = args
            .get("thought_type")
            .and_then(|v| v.as_str())
            .and_then(parse_thought_type)
            .unwrap_or(ThoughtType::Reasoning);
        let content = args.get("thought").and_then(|v| v.as_str())?.to_string();
        let confidence = args.get("confidence").and_then(|v| v.as_f64()).map(|v| v as f32);
        let alternatives = args.get("alternatives").and_then(|v| v.as_array()).map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        });
        let related_to = args.get("related_to").and_then(|v| v.as_str()).map(str::to_string);
        let verbosity = args
            .get("verbosity")
            .and_then(|v| v.as_str())
            .and_then(parse_verbosity);
        let id = args
            .get("thought_id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| Some(call.id.clone()));

        Some(Thought {
            thought_type,
            content,
            id,
            confidence,
            alternatives,
            related_to,
            verbosity,
        })
    }
}

fn parse_thought_type(s: &str) -> Option<ThoughtType> {
    ThoughtType::ALL.into_iter().find(|t| format!("{t:?}").eq_ignore_ascii_case(s))
}

fn parse_verbosity(s: &str) -> Option<ThoughtVerbosity> {
    match s {
        "brief" => Some(ThoughtVerbosity::Brief),
        "normal" => Some(ThoughtVerbosity::Normal),
        "detailed" => Some(ThoughtVerbosity::Detailed),
        _ => None,
    }
}

#[async_trait::async_trait]
impl ToolProvider for ThoughtToolProvider {
    fn can_handle(&self, tool_name: &str) -> bool {
        tool_name == TOOL_NAME
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        match Self::parse(call) {
            Some(thought) => ToolResult::ok(
                call.id.clone(),
                call.tool_name.clone(),
                serde_json::json!({ "acknowledged": true, "content": thought.content }),
            ),
            None => ToolResult::failure(
                call.id.clone(),
                call.tool_name.clone(),
                "think_aloud requires a non-empty `thought` string argument",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_thought_and_thought_type() {
        let call = ToolCall::new(
            "c1",
            TOOL_NAME,
            serde_json::json!({ "thought_type": "planning", "thought": "break this into steps" }),
        );
        let thought = ThoughtToolProvider::parse(&call).unwrap();
        assert_eq!(thought.thought_type, ThoughtType::Planning);
        assert_eq!(thought.content, "break this into steps");
        assert_eq!(thought.id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn thought_id_argument_overrides_call_id() {
        let call = ToolCall::new(
            "c1",
            TOOL_NAME,
            serde_json::json!({ "thought": "steps", "thought_id": "explicit-id" }),
        );
        let thought = ThoughtToolProvider::parse(&call).unwrap();
        assert_eq!(thought.id.as_deref(), Some("explicit-id"));
    }

    #[tokio::test]
    async fn missing_content_fails_dispatch() {
        let provider = ThoughtToolProvider;
        let call = ToolCall::new("c1", TOOL_NAME, serde_json::json!({}));
        let result = provider.dispatch(&call).await;
        assert!(!result.success);
    }

    #[test]
    fn only_claims_its_own_tool_name() {
        let provider = ThoughtToolProvider;
        assert!(provider.can_handle(TOOL_NAME));
        assert!(!provider.can_handle("get_weather"));
    }
}
