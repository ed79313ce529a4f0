use std::collections::HashMap;

use agentcore_domain::error::{Error, Result};
use agentcore_domain::loop_state::PersistedLoopState;
use agentcore_domain::trace::TraceEvent;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

struct TaskEntry {
    state: PersistedLoopState,
    saved_at: DateTime<Utc>,
    /// Per-task TTL override; falls back to the cleanup service's default
    /// cutoff when unset.
    ttl_seconds: Option<u64>,
}

/// Summary row returned by [`TaskStore::list_tasks`], cheap enough to list
/// without deserializing full checkpoints.
#[derive(Debug, Clone)]
pub struct TaskSummary {
    pub task_id: String,
    pub context_id: String,
    pub iteration: usize,
    pub completed: bool,
    pub saved_at: DateTime<Utc>,
}

/// In-memory task checkpoint store, keyed by task id.
#[derive(Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<String, TaskEntry>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, state: PersistedLoopState) -> Result<()> {
        let task_id = state.task_id.clone();
        let iteration = state.iteration;
        let mut tasks = self.tasks.write();
        let ttl_seconds = tasks.get(&task_id).and_then(|e| e.ttl_seconds);
        tasks.insert(
            task_id.clone(),
            TaskEntry {
                state,
                saved_at: Utc::now(),
                ttl_seconds,
            },
        );
        TraceEvent::CheckpointWritten { task_id, iteration }.emit();
        Ok(())
    }

    pub fn load(&self, task_id: &str) -> Result<PersistedLoopState> {
        self.tasks
            .read()
            .get(task_id)
            .map(|e| e.state.clone())
            .ok_or_else(|| Error::task_not_found(task_id))
    }

    pub fn exists(&self, task_id: &str) -> bool {
        self.tasks.read().contains_key(task_id)
    }

    pub fn delete(&self, task_id: &str) -> Result<()> {
        self.tasks
            .write()
            .remove(task_id)
            .map(|_| ())
            .ok_or_else(|| Error::task_not_found(task_id))
    }

    pub fn list_tasks(&self) -> Vec<TaskSummary> {
        self.tasks
            .read()
            .values()
            .map(|e| TaskSummary {
                task_id: e.state.task_id.clone(),
                context_id: e.state.context_id.clone(),
                iteration: e.state.iteration,
                completed: e.state.completed,
                saved_at: e.saved_at,
            })
            .collect()
    }

    /// Override the TTL for one task, taking precedence over the cleanup
    /// service's default cutoff for that task only.
    pub fn set_ttl(&self, task_id: &str, ttl_seconds: u64) -> Result<()> {
        let mut tasks = self.tasks.write();
        let entry = tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::task_not_found(task_id))?;
        entry.ttl_seconds = Some(ttl_seconds);
        Ok(())
    }

    /// Task ids whose effective cutoff (per-task TTL, or `default_cutoff`)
    /// has elapsed since they were last saved.
    pub(crate) fn expired_task_ids(&self, default_cutoff: chrono::Duration, now: DateTime<Utc>) -> Vec<String> {
        self.tasks
            .read()
            .iter()
            .filter(|(_, entry)| {
                let cutoff = entry
                    .ttl_seconds
                    .map(chrono::Duration::seconds)
                    .unwrap_or(default_cutoff);
                now.signed_duration_since(entry.saved_at) >= cutoff
            })
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentcore_domain::loop_state::ResumeFrom;

    fn state(task_id: &str) -> PersistedLoopState {
        PersistedLoopState {
            task_id: task_id.into(),
            agent_id: "agent-1".into(),
            parent_task_id: None,
            context_id: "ctx-1".into(),
            messages: Vec::new(),
            system_prompt: None,
            iteration: 0,
            completed: false,
            available_tools: Vec::new(),
            pending_tool_calls: Vec::new(),
            completed_tool_calls: HashMap::new(),
            artifact_ids: Vec::new(),
            sub_agent_snapshots: Vec::new(),
            last_response: None,
            last_activity: Utc::now(),
            resume_from: ResumeFrom::LlmCall,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = TaskStore::new();
        store.save(state("t1")).unwrap();
        let loaded = store.load("t1").unwrap();
        assert_eq!(loaded.task_id, "t1");
    }

    #[test]
    fn load_missing_task_is_not_found() {
        let store = TaskStore::new();
        let err = store.load("nope").unwrap_err();
        assert_eq!(err.code(), "task_not_found");
    }

    #[test]
    fn per_task_ttl_overrides_default_cutoff() {
        let store = TaskStore::new();
        store.save(state("t1")).unwrap();
        store.set_ttl("t1", 0).unwrap();
        let expired = store.expired_task_ids(chrono::Duration::hours(24), Utc::now());
        assert_eq!(expired, vec!["t1".to_string()]);
    }

    #[test]
    fn default_cutoff_applies_without_override() {
        let store = TaskStore::new();
        store.save(state("t1")).unwrap();
        let expired = store.expired_task_ids(chrono::Duration::hours(24), Utc::now());
        assert!(expired.is_empty());
    }
}
