use std::collections::HashMap;

use agentcore_domain::artifact::{
    Artifact, ArtifactBody, ArtifactEncoding, DatasetSchema, FileChunk,
};
use agentcore_domain::error::{Error, Result};
use agentcore_domain::trace::TraceEvent;
use chrono::Utc;
use parking_lot::RwLock;

use crate::{require_body, ArtifactStore};

/// In-memory artifact store backed by a single `RwLock<HashMap>`, mirroring
/// the registry pattern used by the session store: simple, synchronous,
/// and adequate until a caller needs artifacts to outlive the process.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    artifacts: RwLock<HashMap<String, Artifact>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_new(&self, artifact_id: &str, artifact: Artifact, override_existing: bool) -> Result<Artifact> {
        let mut guard = self.artifacts.write();
        if let Some(existing) = guard.get_mut(artifact_id) {
            if !override_existing {
                return Err(Error::artifact_already_exists(artifact_id));
            }
            existing.reset_override(artifact.body, artifact.name, artifact.description);
            let result = existing.clone();
            TraceEvent::ArtifactOperation {
                artifact_id: artifact_id.to_string(),
                op: "reset".into(),
                version: result.version,
            }
            .emit();
            return Ok(result);
        }
        guard.insert(artifact_id.to_string(), artifact.clone());
        TraceEvent::ArtifactOperation {
            artifact_id: artifact_id.to_string(),
            op: "create".into(),
            version: artifact.version,
        }
        .emit();
        Ok(artifact)
    }

    fn mutate<F>(&self, artifact_id: &str, f: F) -> Result<Artifact>
    where
        F: FnOnce(&mut Artifact) -> Result<()>,
    {
        let mut guard = self.artifacts.write();
        let artifact = guard
            .get_mut(artifact_id)
            .ok_or_else(|| Error::artifact_not_found(artifact_id))?;
        f(artifact)?;
        Ok(artifact.clone())
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn create_file(
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
        let artifact = Artifact::new(
            artifact_id,
            task_id,
            context_id,
            name,
            description,
            ArtifactBody::new_file(mime_type, encoding),
        );
        self.insert_new(artifact_id, artifact, override_existing)
    }

    fn create_data(
        &self,
        artifact_id: &str,
        task_id: &str,
        context_id: &str,
        name: Option<String>,
        description: Option<String>,
        initial: serde_json::Value,
        override_existing: bool,
    ) -> Result<Artifact> {
        let artifact = Artifact::new(
            artifact_id,
            task_id,
            context_id,
            name,
            description,
            ArtifactBody::new_data(initial),
        );
        self.insert_new(artifact_id, artifact, override_existing)
    }

    fn create_dataset(
        &self,
        artifact_id: &str,
        task_id: &str,
        context_id: &str,
        name: Option<String>,
        description: Option<String>,
        schema: Option<DatasetSchema>,
        override_existing: bool,
    ) -> Result<Artifact> {
        let artifact = Artifact::new(
            artifact_id,
            task_id,
            context_id,
            name,
            description,
            ArtifactBody::new_dataset(schema),
        );
        self.insert_new(artifact_id, artifact, override_existing)
    }

    fn append_file_chunk(&self, artifact_id: &str, data: String) -> Result<Artifact> {
        self.mutate(artifact_id, |artifact| {
            require_body(artifact, "file")?;
            let size = data.len() as u64;
            let ArtifactBody::File {
                chunks,
                total_size,
                total_chunks,
                ..
            } = &mut artifact.body
            else {
                unreachable!("kind checked above")
            };
            let index = *total_chunks;
            chunks.push(FileChunk {
                index,
                data,
                size,
                timestamp: Utc::now(),
            });
            *total_size += size;
            *total_chunks += 1;
            artifact.record_append(index);
            Ok(())
        })
    }

    fn complete_file(&self, artifact_id: &str) -> Result<Artifact> {
        self.mutate(artifact_id, |artifact| {
            require_body(artifact, "file")?;
            artifact.complete();
            Ok(())
        })
    }

    fn replace_data(&self, artifact_id: &str, data: serde_json::Value) -> Result<Artifact> {
        self.mutate(artifact_id, |artifact| {
            require_body(artifact, "data")?;
            artifact.body = ArtifactBody::Data { data };
            artifact.record_replace();
            Ok(())
        })
    }

    fn append_dataset_batch(
        &self,
        artifact_id: &str,
        rows: Vec<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Artifact> {
        self.mutate(artifact_id, |artifact| {
            require_body(artifact, "dataset")?;
            let added = rows.len() as u64;
            let ArtifactBody::Dataset {
                rows: existing,
                total_chunks,
                total_size,
                ..
            } = &mut artifact.body
            else {
                unreachable!("kind checked above")
            };
            existing.extend(rows);
            let index = *total_chunks;
            *total_chunks += 1;
            *total_size += added;
            artifact.record_append(index);
            Ok(())
        })
    }

    fn complete_dataset(&self, artifact_id: &str) -> Result<Artifact> {
        self.mutate(artifact_id, |artifact| {
            require_body(artifact, "dataset")?;
            artifact.complete();
            Ok(())
        })
    }

    fn fail(&self, artifact_id: &str) -> Result<Artifact> {
        self.mutate(artifact_id, |artifact| {
            artifact.fail();
            Ok(())
        })
    }

    fn get(&self, artifact_id: &str) -> Result<Artifact> {
        self.artifacts
            .read()
            .get(artifact_id)
            .cloned()
            .ok_or_else(|| Error::artifact_not_found(artifact_id))
    }

    fn list_by_task(&self, task_id: &str) -> Vec<Artifact> {
        let mut artifacts: Vec<_> = self
            .artifacts
            .read()
            .values()
            .filter(|a| a.task_id == task_id)
            .cloned()
            .collect();
        artifacts.sort_by_key(|a| a.created_at);
        artifacts
    }

    fn list_by_context(&self, context_id: &str) -> Vec<Artifact> {
        let mut artifacts: Vec<_> = self
            .artifacts
            .read()
            .values()
            .filter(|a| a.context_id == context_id)
            .cloned()
            .collect();
        artifacts.sort_by_key(|a| a.created_at);
        artifacts
    }

    fn delete(&self, artifact_id: &str) -> Result<()> {
        self.artifacts
            .write()
            .remove(artifact_id)
            .map(|_| ())
            .ok_or_else(|| Error::artifact_not_found(artifact_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get_round_trips() {
        let store = InMemoryArtifactStore::new();
        store
            .create_data("a1", "t1", "c1", None, None, serde_json::json!({"x": 1}), false)
            .unwrap();
        let artifact = store.get("a1").unwrap();
        assert_eq!(artifact.body.kind_name(), "data");
    }

    #[test]
    fn duplicate_create_without_override_errors() {
        let store = InMemoryArtifactStore::new();
        store
            .create_data("a1", "t1", "c1", None, None, serde_json::json!({}), false)
            .unwrap();
        let err = store
            .create_data("a1", "t1", "c1", None, None, serde_json::json!({}), false)
            .unwrap_err();
        assert_eq!(err.code(), "artifact_already_exists");
    }

    #[test]
    fn append_to_data_artifact_is_kind_mismatch() {
        let store = InMemoryArtifactStore::new();
        store
            .create_data("a1", "t1", "c1", None, None, serde_json::json!({}), false)
            .unwrap();
        let err = store.append_file_chunk("a1", "chunk".into()).unwrap_err();
        assert_eq!(err.code(), "artifact_kind_mismatch");
    }

    #[test]
    fn file_chunks_accumulate_size_and_index() {
        let store = InMemoryArtifactStore::new();
        store
            .create_file(
                "a1",
                "t1",
                "c1",
                None,
                None,
                "text/plain",
                ArtifactEncoding::Utf8,
                false,
            )
            .unwrap();
        store.append_file_chunk("a1", "hello".into()).unwrap();
        let artifact = store.append_file_chunk("a1", "world".into()).unwrap();
        let ArtifactBody::File {
            total_size,
            total_chunks,
            chunks,
            ..
        } = artifact.body
        else {
            panic!("expected file body")
        };
        assert_eq!(total_size, 10);
        assert_eq!(total_chunks, 2);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn list_by_task_filters_and_orders_by_creation() {
        let store = InMemoryArtifactStore::new();
        store
            .create_data("a1", "t1", "c1", None, None, serde_json::json!({}), false)
            .unwrap();
        store
            .create_data("a2", "t2", "c1", None, None, serde_json::json!({}), false)
            .unwrap();
        store
            .create_data("a3", "t1", "c1", None, None, serde_json::json!({}), false)
            .unwrap();
        let ids: Vec<_> = store.list_by_task("t1").iter().map(|a| a.artifact_id.clone()).collect();
        assert_eq!(ids, vec!["a1", "a3"]);
    }

    #[test]
    fn list_by_context_spans_every_task() {
        let store = InMemoryArtifactStore::new();
        store
            .create_data("a1", "t1", "c1", None, None, serde_json::json!({}), false)
            .unwrap();
        store
            .create_data("a2", "t2", "c1", None, None, serde_json::json!({}), false)
            .unwrap();
        store
            .create_data("a3", "t1", "c2", None, None, serde_json::json!({}), false)
            .unwrap();
        let ids: Vec<_> = store.list_by_context("c1").iter().map(|a| a.artifact_id.clone()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }
}
