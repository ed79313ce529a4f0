use std::collections::HashMap;

use agentcore_domain::error::{Error, Result};
use agentcore_domain::tool::Message;
use parking_lot::RwLock;

/// Append-only conversation history, one log per context id.
#[derive(Default)]
pub struct MessageStore {
    contexts: RwLock<HashMap<String, Vec<Message>>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, context_id: &str, message: Message) {
        self.contexts
            .write()
            .entry(context_id.to_string())
            .or_default()
            .push(message);
    }

    pub fn append_many(&self, context_id: &str, messages: impl IntoIterator<Item = Message>) {
        self.contexts
            .write()
            .entry(context_id.to_string())
            .or_default()
            .extend(messages);
    }

    pub fn get_all(&self, context_id: &str) -> Vec<Message> {
        self.contexts.read().get(context_id).cloned().unwrap_or_default()
    }

    /// Messages at index >= `since_index`.
    pub fn get_since(&self, context_id: &str, since_index: usize) -> Vec<Message> {
        self.contexts
            .read()
            .get(context_id)
            .map(|msgs| msgs.iter().skip(since_index).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, context_id: &str) -> usize {
        self.contexts.read().get(context_id).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self, context_id: &str) -> bool {
        self.len(context_id) == 0
    }

    pub fn total_tokens(&self, context_id: &str) -> usize {
        self.contexts
            .read()
            .get(context_id)
            .map(|msgs| msgs.iter().map(Message::estimated_tokens).sum())
            .unwrap_or(0)
    }

    /// Replace the full history for a context, e.g. with the outcome of a
    /// compaction pass. The replacement must be nonempty — callers should
    /// not compact a context down to nothing.
    pub fn replace_all(&self, context_id: &str, messages: Vec<Message>) -> Result<()> {
        if messages.is_empty() {
            return Err(Error::Validation("replace_all requires a nonempty history".into()));
        }
        self.contexts.write().insert(context_id.to_string(), messages);
        Ok(())
    }

    pub fn clear(&self, context_id: &str) {
        self.contexts.write().remove(context_id);
    }
}
