use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use agentcore_domain::tool::{ToolCall, ToolResult};
use parking_lot::RwLock;
use tokio::sync::oneshot;

use crate::ToolProvider;

/// Tools fulfilled by an external client rather than executed in-process
/// (e.g. asking a human to approve an action, or delegating to a UI the
/// agent has no direct handle to).
///
/// `dispatch` parks the call on a `oneshot` channel and calls the
/// `on_awaiting` hook, which is expected to surface an input-required
/// signal to the caller (the agent loop emits a `tool-start` event and
/// leaves the turn paused); the call resolves once someone invokes
/// [`ClientToolProvider::resolve`] with the matching call id.
pub struct ClientToolProvider {
    tool_names: HashSet<String>,
    pending: RwLock<HashMap<String, oneshot::Sender<ToolResult>>>,
    on_awaiting: Option<Arc<dyn Fn(&ToolCall) + Send + Sync>>,
}

impl ClientToolProvider {
    pub fn new(tool_names: impl IntoIterator<Item = String>) -> Self {
        Self {
            tool_names: tool_names.into_iter().collect(),
            pending: RwLock::new(HashMap::new()),
            on_awaiting: None,
        }
    }

    pub fn with_awaiting_hook(mut self, hook: Arc<dyn Fn(&ToolCall) + Send + Sync>) -> Self {
        self.on_awaiting = Some(hook);
        self
    }

    /// Resolve a pending call. Returns `false` if no call with that id is
    /// currently awaiting a result (already resolved, never dispatched,
    /// or the dispatcher gave up on it).
    pub fn resolve(&self, call_id: &str, result: ToolResult) -> bool {
        match self.pending.write().remove(call_id) {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.read().len()
    }
}

#[async_trait::async_trait]
impl ToolProvider for ClientToolProvider {
    fn can_handle(&self, tool_name: &str) -> bool {
        self.tool_names.contains(tool_name)
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let (tx, rx) = oneshot::channel();
        self.pending.write().insert(call.id.clone(), tx);

        if let Some(hook) = &self.on_awaiting {
            hook(call);
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => ToolResult::failure(
                call.id.clone(),
                call.tool_name.clone(),
                "client tool call was abandoned before it was resolved",
            ),
        }
    }
}
