//! Durable artifact storage: files, structured data blobs, and datasets.
//!
//! [`ArtifactStore`] is the CRUD contract any backend implements (an
//! in-memory [`store::InMemoryArtifactStore`] ships here). [`scheduler`]
//! wraps any store to guarantee that operations against the same artifact
//! id run one at a time, in submission order, while different artifacts
//! proceed fully concurrently.

pub mod scheduler;
pub mod store;

use agentcore_domain::artifact::{Artifact, ArtifactBody, DatasetSchema};
use agentcore_domain::error::Result;

pub use scheduler::ArtifactScheduler;
pub use store::InMemoryArtifactStore;

/// CRUD contract for artifact storage. Implementations are expected to be
/// internally synchronized; callers needing per-artifact FIFO ordering
/// should go through [`ArtifactScheduler`] rather than this trait directly.
pub trait ArtifactStore: Send + Sync {
    /// Create a file artifact. If `override_existing` is true and an
    /// artifact with `artifact_id` already exists, it is reset in place
    /// (see [`Artifact::reset_override`]); otherwise a collision is an
    /// `already_exists` error.
    fn create_file(
        &self,
        artifact_id: &str,
        task_id: &str,
        context_id: &str,
        name: Option<String>,
        description: Option<String>,
        mime_type: &str,
        encoding: agentcore_domain::artifact::ArtifactEncoding,
        override_existing: bool,
    ) -> Result<Artifact>;

    fn create_data(
        &self,
        artifact_id: &str,
        task_id: &str,
        context_id: &str,
        name: Option<String>,
        description: Option<String>,
        initial: serde_json::Value,
        override_existing: bool,
    ) -> Result<Artifact>;

    fn create_dataset(
        &self,
        artifact_id: &str,
        task_id: &str,
        context_id: &str,
        name: Option<String>,
        description: Option<String>,
        schema: Option<DatasetSchema>,
        override_existing: bool,
    ) -> Result<Artifact>;

    /// Append one chunk to a `file` artifact. Errors with `kind_mismatch`
    /// if the artifact is not a file, `not_found` if it doesn't exist.
    fn append_file_chunk(&self, artifact_id: &str, data: String) -> Result<Artifact>;

    fn complete_file(&self, artifact_id: &str) -> Result<Artifact>;

    /// Replace the whole value of a `data` artifact.
    fn replace_data(&self, artifact_id: &str, data: serde_json::Value) -> Result<Artifact>;

    /// Append a batch of rows to a `dataset` artifact.
    fn append_dataset_batch(
        &self,
        artifact_id: &str,
        rows: Vec<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Artifact>;

    fn complete_dataset(&self, artifact_id: &str) -> Result<Artifact>;

    fn fail(&self, artifact_id: &str) -> Result<Artifact>;

    fn get(&self, artifact_id: &str) -> Result<Artifact>;

    /// List every artifact belonging to `task_id`, creation order.
    fn list_by_task(&self, task_id: &str) -> Vec<Artifact>;

    /// List every artifact belonging to `context_id` across all of its
    /// tasks, creation order.
    fn list_by_context(&self, context_id: &str) -> Vec<Artifact>;

    fn delete(&self, artifact_id: &str) -> Result<()>;
}

pub(crate) fn require_body<'a>(
    artifact: &'a Artifact,
    want: &str,
) -> Result<&'a ArtifactBody> {
    if artifact.body.kind_name() != want {
        return Err(agentcore_domain::error::Error::KindMismatch(format!(
            "artifact {} is {}, not {want}",
            artifact.artifact_id,
            artifact.body.kind_name()
        )));
    }
    Ok(&artifact.body)
}
