use std::collections::HashMap;
use std::sync::Arc;

use agentcore_domain::artifact::{Artifact, ArtifactEncoding, DatasetSchema};
use agentcore_domain::error::Result;
use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;

use crate::ArtifactStore;

/// Wraps an [`ArtifactStore`] so that every operation against a given
/// artifact id is serialized in submission order, while operations
/// against different ids proceed fully concurrently — without
/// serializing the whole store behind one lock.
///
/// Grounded on the registry-of-`Arc<Mutex<..>>`-per-key pattern: a
/// `RwLock<HashMap<id, Arc<tokio::sync::Mutex<()>>>>` hands out one async
/// mutex per artifact id, created lazily and kept alive for the process
/// lifetime (tiny and cheap enough that there is no need to evict).
pub struct ArtifactScheduler<S> {
    store: Arc<S>,
    locks: RwLock<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<S: ArtifactStore> ArtifactScheduler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn lock_for(&self, artifact_id: &str) -> Arc<AsyncMutex<()>> {
        if let Some(lock) = self.locks.read().get(artifact_id) {
            return Arc::clone(lock);
        }
        Arc::clone(
            self.locks
                .write()
                .entry(artifact_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }

    async fn serialized<F>(&self, artifact_id: &str, f: F) -> Result<Artifact>
    where
        F: FnOnce(&S) -> Result<Artifact>,
    {
        let lock = self.lock_for(artifact_id);
        let _guard = lock.lock().await;
        f(&self.store)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_file(
        &self,
        artifact_id: &str,
        task_id: &str,
        context_id: &str,
        name: Option<String>,
        description: Option<String>,
        mime_type: &str,
        encoding: ArtifactEncoding,
        override_existing: bool,
    ) -> Result<Artifact> {
        self.serialized(artifact_id, |store| {
            store.create_file(
                artifact_id,
                task_id,
                context_id,
                name,
                description,
                mime_type,
                encoding,
                override_existing,
            )
        })
        .await
    }

    pub async fn create_data(
        &self,
        artifact_id: &str,
        task_id: &str,
        context_id: &str,
        name: Option<String>,
        description: Option<String>,
        initial: serde_json::Value,
        override_existing: bool,
    ) -> Result<Artifact> {
        self.serialized(artifact_id, |store| {
            store.create_data(
                artifact_id,
                task_id,
                context_id,
                name,
                description,
                initial,
                override_existing,
            )
        })
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_dataset(
        &self,
        artifact_id: &str,
        task_id: &str,
        context_id: &str,
        name: Option<String>,
        description: Option<String>,
        schema: Option<DatasetSchema>,
        override_existing: bool,
    ) -> Result<Artifact> {
        self.serialized(artifact_id, |store| {
            store.create_dataset(
                artifact_id,
                task_id,
                context_id,
                name,
                description,
                schema,
                override_existing,
            )
        })
        .await
    }

    pub async fn append_file_chunk(&self, artifact_id: &str, data: String) -> Result<Artifact> {
        self.serialized(artifact_id, |store| store.append_file_chunk(artifact_id, data))
            .await
    }

    pub async fn complete_file(&self, artifact_id: &str) -> Result<Artifact> {
        self.serialized(artifact_id, |store| store.complete_file(artifact_id))
            .await
    }

    pub async fn replace_data(&self, artifact_id: &str, data: serde_json::Value) -> Result<Artifact> {
        self.serialized(artifact_id, |store| store.replace_data(artifact_id, data))
            .await
    }

    pub async fn append_dataset_batch(
        &self,
        artifact_id: &str,
        rows: Vec<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Artifact> {
        self.serialized(artifact_id, |store| store.append_dataset_batch(artifact_id, rows))
            .await
    }

    pub async fn complete_dataset(&self, artifact_id: &str) -> Result<Artifact> {
        self.serialized(artifact_id, |store| store.complete_dataset(artifact_id))
            .await
    }

    pub async fn fail(&self, artifact_id: &str) -> Result<Artifact> {
        self.serialized(artifact_id, |store| store.fail(artifact_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryArtifactStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn appends_to_one_artifact_interleave_in_submission_order() {
        let scheduler = Arc::new(ArtifactScheduler::new(Arc::new(InMemoryArtifactStore::new())));
        scheduler
            .create_file("a1", "t1", "c1", None, None, "text/plain", ArtifactEncoding::Utf8, false)
            .await
            .unwrap();

        let counter = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for i in 0..20 {
            let scheduler = Arc::clone(&scheduler);
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                scheduler.append_file_chunk("a1", format!("chunk-{i}")).await.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let artifact = scheduler.store().get("a1").unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 20);
        if let agentcore_domain::artifact::ArtifactBody::File { total_chunks, .. } = artifact.body {
            assert_eq!(total_chunks, 20);
        } else {
            panic!("expected file body");
        }
    }

    #[tokio::test]
    async fn different_artifacts_do_not_block_each_other() {
        let scheduler = Arc::new(ArtifactScheduler::new(Arc::new(InMemoryArtifactStore::new())));
        scheduler
            .create_data("a1", "t1", "c1", None, None, serde_json::json!({}), false)
            .await
            .unwrap();
        scheduler
            .create_data("a2", "t1", "c1", None, None, serde_json::json!({}), false)
            .await
            .unwrap();

        let r1 = scheduler.replace_data("a1", serde_json::json!({"v": 1}));
        let r2 = scheduler.replace_data("a2", serde_json::json!({"v": 2}));
        let (r1, r2) = tokio::join!(r1, r2);
        assert!(r1.is_ok());
        assert!(r2.is_ok());
    }
}
