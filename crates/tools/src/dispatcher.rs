use std::sync::Arc;

use agentcore_domain::tool::{ToolCall, ToolResult};

use crate::thought::ThoughtToolProvider;
use crate::ToolProvider;

/// Routes a [`ToolCall`] to the provider that claims it.
///
/// [`ThoughtToolProvider`] always gets first refusal, ahead of every
/// provider passed in, so nothing can register a competing `think_aloud`
/// tool and shadow it. Past that, the first provider (in registration
/// order) whose `can_handle` returns true wins; a call nothing claims
/// fails with a `No provider for tool: <name>` result rather than an
/// error, since an unroutable tool call is something the turn can
/// recover from.
pub struct ToolDispatcher {
    thought: ThoughtToolProvider,
    providers: Vec<Arc<dyn ToolProvider>>,
}

impl ToolDispatcher {
    pub fn new(providers: Vec<Arc<dyn ToolProvider>>) -> Self {
        Self {
            thought: ThoughtToolProvider,
            providers,
        }
    }

    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        if self.thought.can_handle(&call.tool_name) {
            return self.thought.dispatch(call).await;
        }

        for provider in &self.providers {
            if provider.can_handle(&call.tool_name) {
                return provider.dispatch(call).await;
            }
        }

        ToolResult::failure(
            call.id.clone(),
            call.tool_name.clone(),
            format!("No provider for tool: {}", call.tool_name),
        )
    }
}
