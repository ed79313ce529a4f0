use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Artifact lifecycle status. Transitions are monotonic: `Building` →
/// `Complete` or `Building` → `Failed`, except a reset-override which sets
/// status back to `Building` and bumps the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Building,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactEncoding {
    Utf8,
    Base64,
}

/// A single appended chunk of a file artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChunk {
    pub index: u64,
    pub data: String,
    pub size: u64,
    pub timestamp: DateTime<Utc>,
}

/// Column description for a dataset artifact's optional schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub columns: Vec<ColumnSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<Vec<Vec<String>>>,
}

/// One entry in an artifact's append-only operation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLogEntry {
    pub op: OperationKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Append,
    Replace,
    Complete,
    Reset,
}

/// The kind-specific payload of an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactBody {
    File {
        chunks: Vec<FileChunk>,
        mime_type: String,
        encoding: ArtifactEncoding,
        total_size: u64,
        total_chunks: u64,
    },
    Data {
        data: serde_json::Value,
    },
    Dataset {
        rows: Vec<serde_json::Map<String, serde_json::Value>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema: Option<DatasetSchema>,
        /// Batch count (how many `appendDatasetBatch` calls landed).
        total_chunks: u64,
        /// Row count.
        total_size: u64,
    },
}

impl ArtifactBody {
    pub fn new_file(mime_type: impl Into<String>, encoding: ArtifactEncoding) -> Self {
        ArtifactBody::File {
            chunks: Vec::new(),
            mime_type: mime_type.into(),
            encoding,
            total_size: 0,
            total_chunks: 0,
        }
    }

    pub fn new_data(initial: serde_json::Value) -> Self {
        ArtifactBody::Data { data: initial }
    }

    pub fn new_dataset(schema: Option<DatasetSchema>) -> Self {
        ArtifactBody::Dataset {
            rows: Vec::new(),
            schema,
            total_chunks: 0,
            total_size: 0,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ArtifactBody::File { .. } => "file",
            ArtifactBody::Data { .. } => "data",
            ArtifactBody::Dataset { .. } => "dataset",
        }
    }
}

/// A durable piece of content produced by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_id: String,
    pub task_id: String,
    pub context_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ArtifactStatus,
    pub version: u64,
    pub body: ArtifactBody,
    pub operations: Vec<OperationLogEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Artifact {
    pub fn new(
        artifact_id: impl Into<String>,
        task_id: impl Into<String>,
        context_id: impl Into<String>,
        name: Option<String>,
        description: Option<String>,
        body: ArtifactBody,
    ) -> Self {
        let now = Utc::now();
        Self {
            artifact_id: artifact_id.into(),
            task_id: task_id.into(),
            context_id: context_id.into(),
            name,
            description,
            status: ArtifactStatus::Building,
            version: 1,
            body,
            operations: vec![OperationLogEntry {
                op: OperationKind::Create,
                timestamp: now,
                index: None,
            }],
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Reset this artifact in place for an `override=true` create: the kind
    /// may change, `created_at` is preserved, and the version increments
    /// from its prior value rather than resetting to 1.
    pub fn reset_override(&mut self, body: ArtifactBody, name: Option<String>, description: Option<String>) {
        let now = Utc::now();
        self.body = body;
        self.name = name;
        self.description = description;
        self.status = ArtifactStatus::Building;
        self.version += 1;
        self.completed_at = None;
        self.updated_at = now;
        self.operations.push(OperationLogEntry {
            op: OperationKind::Reset,
            timestamp: now,
            index: None,
        });
    }

    fn record(&mut self, op: OperationKind, index: Option<u64>) {
        self.version += 1;
        self.updated_at = Utc::now();
        self.operations.push(OperationLogEntry {
            op,
            timestamp: self.updated_at,
            index,
        });
    }

    pub fn complete(&mut self) {
        self.status = ArtifactStatus::Complete;
        self.completed_at = Some(Utc::now());
        self.record(OperationKind::Complete, None);
    }

    pub fn fail(&mut self) {
        self.status = ArtifactStatus::Failed;
        self.record(OperationKind::Complete, None);
    }

    pub fn record_append(&mut self, index: u64) {
        self.record(OperationKind::Append, Some(index));
    }

    pub fn record_replace(&mut self) {
        self.record(OperationKind::Replace, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_starts_at_version_one_building() {
        let artifact = Artifact::new(
            "a1",
            "t1",
            "c1",
            None,
            None,
            ArtifactBody::new_data(serde_json::json!({})),
        );
        assert_eq!(artifact.version, 1);
        assert_eq!(artifact.status, ArtifactStatus::Building);
        assert_eq!(artifact.operations.len(), 1);
    }

    #[test]
    fn mutations_increment_version_monotonically() {
        let mut artifact = Artifact::new(
            "a1",
            "t1",
            "c1",
            None,
            None,
            ArtifactBody::new_file("text/plain", ArtifactEncoding::Utf8),
        );
        artifact.record_append(0);
        assert_eq!(artifact.version, 2);
        artifact.record_append(1);
        assert_eq!(artifact.version, 3);
        artifact.complete();
        assert_eq!(artifact.version, 4);
        assert_eq!(artifact.status, ArtifactStatus::Complete);
        assert!(artifact.completed_at.is_some());
    }

    #[test]
    fn reset_override_preserves_created_at_and_bumps_version() {
        let mut artifact = Artifact::new(
            "a1",
            "t1",
            "c1",
            None,
            None,
            ArtifactBody::new_data(serde_json::json!({})),
        );
        artifact.complete();
        let created_at = artifact.created_at;
        let version_before = artifact.version;

        artifact.reset_override(
            ArtifactBody::new_file("text/plain", ArtifactEncoding::Utf8),
            None,
            None,
        );

        assert_eq!(artifact.created_at, created_at);
        assert_eq!(artifact.version, version_before + 1);
        assert_eq!(artifact.status, ArtifactStatus::Building);
        assert_eq!(artifact.body.kind_name(), "file");
    }
}
