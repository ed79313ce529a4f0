use std::sync::Arc;

use agentcore_domain::event::Event;
use async_stream::stream;
use futures_core::Stream;
use parking_lot::Mutex;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Active,
    Completed,
    Errored,
}

struct Inner {
    log: Vec<Event>,
    state: State,
    sender: Option<broadcast::Sender<Event>>,
}

/// Hot multicast stream for a single agent-loop execution.
///
/// Every event emitted during the execution is retained in an in-memory
/// log and replayed in full to each new subscriber before they start
/// receiving live events — a subscriber that joins midway through never
/// sees a gap and never misses the events that happened before it
/// attached. `emit` and `subscribe` share one lock so the handoff between
/// "replayed from the log" and "delivered live from the channel" has no
/// seam an event could fall through or cross twice.
///
/// This does not replace [`crate::replay::ReplayBuffer`]: the emitter only
/// lives as long as its execution's task does, and a context can restart
/// many executions over its lifetime.
#[derive(Clone)]
pub struct EventEmitter {
    context_id: String,
    task_id: String,
    inner: Arc<Mutex<Inner>>,
}

impl EventEmitter {
    pub fn new(context_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            context_id: context_id.into(),
            task_id: task_id.into(),
            inner: Arc::new(Mutex::new(Inner {
                log: Vec::new(),
                state: State::Active,
                sender: Some(sender),
            })),
        }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Record and broadcast an event. Silently dropped once the execution
    /// has completed or errored — callers that race a late emit against a
    /// terminal transition should not treat this as a failure.
    pub fn emit(&self, event: Event) {
        let mut inner = self.inner.lock();
        if inner.state != State::Active {
            return;
        }
        inner.log.push(event.clone());
        if let Some(sender) = &inner.sender {
            let _ = sender.send(event);
        }
    }

    /// Mark the execution complete. No further events are accepted; live
    /// subscribers drain whatever is still buffered in the channel and
    /// then see their stream end.
    pub fn complete(&self) {
        let mut inner = self.inner.lock();
        inner.state = State::Completed;
        inner.sender = None;
    }

    /// Mark the execution failed. Same delivery guarantees as [`Self::complete`].
    pub fn error(&self) {
        let mut inner = self.inner.lock();
        inner.state = State::Errored;
        inner.sender = None;
    }

    /// Snapshot of every event emitted so far, in order.
    pub fn history(&self) -> Vec<Event> {
        self.inner.lock().log.clone()
    }

    /// Subscribe to this execution's event stream: every event recorded so
    /// far first, then whatever arrives live. Ends once the execution
    /// completes/errors and the channel drains.
    pub fn subscribe(&self) -> impl Stream<Item = Event> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        let (snapshot, mut receiver) = {
            let guard = inner.lock();
            let snapshot = guard.log.clone();
            let receiver = guard.sender.as_ref().map(|s| s.subscribe());
            (snapshot, receiver)
        };

        stream! {
            for event in snapshot {
                yield event;
            }
            let Some(rx) = receiver.as_mut() else { return };
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn ev(n: u64) -> Event {
        Event::ContentDelta {
            context_id: "ctx".into(),
            task_id: "task".into(),
            delta: n.to_string(),
            chunk_index: n,
        }
    }

    #[tokio::test]
    async fn late_subscriber_gets_full_replay_then_live() {
        let emitter = EventEmitter::new("ctx", "task");
        emitter.emit(ev(0));
        emitter.emit(ev(1));

        let stream = emitter.subscribe();
        tokio::pin!(stream);

        emitter.emit(ev(2));
        emitter.complete();

        let mut seen = Vec::new();
        while let Some(event) = stream.next().await {
            if let Event::ContentDelta { delta, .. } = event {
                seen.push(delta);
            }
        }
        assert_eq!(seen, vec!["0", "1", "2"]);
    }

    #[tokio::test]
    async fn events_after_complete_are_dropped() {
        let emitter = EventEmitter::new("ctx", "task");
        emitter.emit(ev(0));
        emitter.complete();
        emitter.emit(ev(1));
        assert_eq!(emitter.history().len(), 1);
    }

    #[tokio::test]
    async fn empty_history_stream_ends_immediately_after_complete() {
        let emitter = EventEmitter::new("ctx", "task");
        emitter.complete();
        let stream = emitter.subscribe();
        tokio::pin!(stream);
        assert!(stream.next().await.is_none());
    }
}
