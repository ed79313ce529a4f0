use agentcore_domain::tool::{ToolCall, ToolResult};
use agentcore_tools::ToolDispatcher;

/// Dispatch every call concurrently, but hand back results in the same
/// order the calls were given in — callers correlate results back to
/// calls by `tool_call_id` regardless, but a deterministic order keeps
/// the persisted message history reproducible across runs of the same
/// script against [`agentcore_providers::MockLlmProvider`].
pub async fn dispatch_all(dispatcher: &ToolDispatcher, calls: &[ToolCall]) -> Vec<ToolResult> {
    let futures = calls.iter().map(|call| dispatcher.dispatch(call));
    futures_util::future::join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentcore_tools::local::LocalToolProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn results_preserve_call_order() {
        let local = Arc::new(LocalToolProvider::new());
        local
            .register(
                agentcore_domain::tool::ToolDefinition {
                    name: "echo".into(),
                    description: "".into(),
                    parameters: serde_json::Value::Null,
                },
                Arc::new(|args: &serde_json::Value| Ok(args.clone())),
            )
            .unwrap();
        let dispatcher = ToolDispatcher::new(vec![local]);

        let calls = vec![
            ToolCall::new("c1", "echo", serde_json::json!({"n": 1})),
            ToolCall::new("c2", "echo", serde_json::json!({"n": 2})),
            ToolCall::new("c3", "echo", serde_json::json!({"n": 3})),
        ];
        let results = dispatch_all(&dispatcher, &calls).await;
        let ids: Vec<_> = results.iter().map(|r| r.tool_call_id.clone()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }
}
