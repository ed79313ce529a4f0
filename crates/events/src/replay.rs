use std::collections::{HashMap, VecDeque};

use agentcore_domain::config::ReplayBufferConfig;
use agentcore_domain::event::Event;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// One buffered event, addressable by its monotonic `{contextId}-{counter}` id.
#[derive(Debug, Clone)]
pub struct BufferedEvent {
    pub id: String,
    pub event: Event,
    pub recorded_at: DateTime<Utc>,
}

struct ContextBuffer {
    events: VecDeque<BufferedEvent>,
    counter: u64,
    last_touched: DateTime<Utc>,
}

impl ContextBuffer {
    fn new() -> Self {
        Self {
            events: VecDeque::new(),
            counter: 0,
            last_touched: Utc::now(),
        }
    }
}

/// Short-lived per-contextId backlog of recent events, used to answer
/// "what did I miss" on client reconnect. Bounded in both size and age:
/// oldest events are evicted once a context exceeds
/// [`ReplayBufferConfig::max_events`], and an entire context is dropped
/// once it has been quiet for longer than its TTL.
///
/// This is distinct from [`crate::emitter::EventEmitter`], which replays
/// one execution's full history to subscribers attached during that
/// execution; the replay buffer survives across executions within a
/// context and trades completeness for a bounded memory footprint.
pub struct ReplayBuffer {
    config: ReplayBufferConfig,
    contexts: RwLock<HashMap<String, ContextBuffer>>,
}

impl ReplayBuffer {
    pub fn new(config: ReplayBufferConfig) -> Self {
        Self {
            config,
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// Record an event for `context_id`, returning its buffer id.
    pub fn push(&self, context_id: &str, event: Event) -> BufferedEvent {
        let mut contexts = self.contexts.write();
        let buffer = contexts
            .entry(context_id.to_string())
            .or_insert_with(ContextBuffer::new);

        buffer.counter += 1;
        let buffered = BufferedEvent {
            id: format!("{context_id}-{}", buffer.counter),
            event,
            recorded_at: Utc::now(),
        };
        buffer.events.push_back(buffered.clone());
        while buffer.events.len() > self.config.max_events {
            buffer.events.pop_front();
        }
        buffer.last_touched = buffered.recorded_at;
        buffered
    }

    /// Every buffered event for `context_id` recorded strictly after
    /// `last_event_id`. Returns everything buffered if `last_event_id` is
    /// `None`, and an empty vec if the context has no buffer (never seen,
    /// or evicted) or `last_event_id` itself has already aged out.
    pub fn events_since(&self, context_id: &str, last_event_id: Option<&str>) -> Vec<BufferedEvent> {
        let contexts = self.contexts.read();
        let Some(buffer) = contexts.get(context_id) else {
            return Vec::new();
        };

        let Some(last_id) = last_event_id else {
            return buffer.events.iter().cloned().collect();
        };

        match buffer.events.iter().position(|e| e.id == last_id) {
            Some(idx) => buffer.events.iter().skip(idx + 1).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Drop contexts that have been idle longer than the configured TTL.
    /// Returns the number of contexts evicted. Intended to be driven by a
    /// periodic background task, not called per-request.
    pub fn cleanup(&self) -> usize {
        let cutoff = Utc::now() - chrono::Duration::seconds(self.config.ttl_seconds as i64);
        let mut contexts = self.contexts.write();
        let before = contexts.len();
        contexts.retain(|_, buffer| buffer.last_touched > cutoff);
        before - contexts.len()
    }

    pub fn context_count(&self) -> usize {
        self.contexts.read().len()
    }
}
