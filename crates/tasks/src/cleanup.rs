use std::sync::Arc;

use agentcore_artifacts::ArtifactStore;
use agentcore_domain::config::CheckpointCleanupConfig;
use chrono::Utc;

use crate::store::TaskStore;

/// Periodic sweep that deletes stale task checkpoints.
///
/// Order matters: a task's artifacts are deleted before its checkpoint, so
/// a crash mid-sweep never leaves a checkpoint pointing at artifacts that
/// no longer exist — the reverse order could.
pub struct CleanupService<A> {
    tasks: Arc<TaskStore>,
    artifacts: Arc<A>,
    config: CheckpointCleanupConfig,
}

impl<A: ArtifactStore> CleanupService<A> {
    pub fn new(tasks: Arc<TaskStore>, artifacts: Arc<A>, config: CheckpointCleanupConfig) -> Self {
        Self {
            tasks,
            artifacts,
            config,
        }
    }

    /// Run one sweep immediately, returning the number of tasks reaped.
    pub fn sweep_once(&self) -> usize {
        let cutoff = chrono::Duration::hours(self.config.cutoff_hours as i64);
        let expired = self.tasks.expired_task_ids(cutoff, Utc::now());

        for task_id in &expired {
            for artifact in self.artifacts.list_by_task(task_id) {
                let _ = self.artifacts.delete(&artifact.artifact_id);
            }
            let _ = self.tasks.delete(task_id);
            tracing::info!(task_id, "reaped stale task checkpoint");
        }

        expired.len()
    }

    /// Run [`Self::sweep_once`] on `config.interval_seconds` forever. Meant
    /// to be spawned as a background task; never returns.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(self.config.interval_seconds));
        loop {
            interval.tick().await;
            let reaped = self.sweep_once();
            if reaped > 0 {
                tracing::info!(reaped, "checkpoint cleanup sweep complete");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentcore_artifacts::store::InMemoryArtifactStore;
    use agentcore_domain::loop_state::{PersistedLoopState, ResumeFrom};
    use std::collections::HashMap;

    fn state(task_id: &str) -> PersistedLoopState {
        PersistedLoopState {
            task_id: task_id.into(),
            agent_id: "agent-1".into(),
            parent_task_id: None,
            context_id: "ctx-1".into(),
            messages: Vec::new(),
            system_prompt: None,
            iteration: 0,
            completed: true,
            available_tools: Vec::new(),
            pending_tool_calls: Vec::new(),
            completed_tool_calls: HashMap::new(),
            artifact_ids: Vec::new(),
            sub_agent_snapshots: Vec::new(),
            last_response: None,
            last_activity: Utc::now(),
            resume_from: ResumeFrom::Completed,
        }
    }

    #[test]
    fn sweep_deletes_artifacts_before_checkpoint() {
        let tasks = Arc::new(TaskStore::new());
        let artifacts = Arc::new(InMemoryArtifactStore::new());
        tasks.save(state("t1")).unwrap();
        artifacts
            .create_data("a1", "t1", "ctx-1", None, None, serde_json::json!({}), false)
            .unwrap();

        let mut config = CheckpointCleanupConfig::default();
        config.cutoff_hours = 0;
        let service = CleanupService::new(Arc::clone(&tasks), Arc::clone(&artifacts), config);
        let reaped = service.sweep_once();

        assert_eq!(reaped, 1);
        assert!(!tasks.exists("t1"));
        assert!(artifacts.get("a1").is_err());
    }

    #[test]
    fn sweep_leaves_fresh_tasks_alone() {
        let tasks = Arc::new(TaskStore::new());
        let artifacts = Arc::new(InMemoryArtifactStore::new());
        tasks.save(state("t1")).unwrap();

        let service = CleanupService::new(tasks.clone(), artifacts, CheckpointCleanupConfig::default());
        assert_eq!(service.sweep_once(), 0);
        assert!(tasks.exists("t1"));
    }
}
