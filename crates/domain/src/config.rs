use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent loop
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tunables for one turn of the agent loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Upper bound on generate→dispatch iterations within a single turn.
    #[serde(default = "d_max_iterations")]
    pub max_iterations: usize,
    /// Checkpoint to the task store every N iterations (in addition to
    /// checkpointing whenever an LLM response or tool results land).
    #[serde(default = "d_true")]
    pub checkpoint_enabled: bool,
    #[serde(default = "d_checkpoint_interval")]
    pub checkpoint_interval: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: d_max_iterations(),
            checkpoint_enabled: true,
            checkpoint_interval: d_checkpoint_interval(),
        }
    }
}

fn d_max_iterations() -> usize {
    20
}
fn d_checkpoint_interval() -> usize {
    1
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Event replay buffer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayBufferConfig {
    /// Maximum events retained per contextId.
    #[serde(default = "d_max_events")]
    pub max_events: usize,
    /// TTL before a buffered event is eligible for cleanup.
    #[serde(default = "d_ttl_secs")]
    pub ttl_seconds: u64,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            max_events: d_max_events(),
            ttl_seconds: d_ttl_secs(),
        }
    }
}

fn d_max_events() -> usize {
    100
}
fn d_ttl_secs() -> u64 {
    300
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message compaction
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompactionStrategy {
    SlidingWindow,
    Summarization,
    Hierarchical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactionConfig {
    #[serde(default = "d_strategy")]
    pub strategy: CompactionStrategy,
    #[serde(default = "d_keep_recent")]
    pub keep_recent: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_prompt: Option<String>,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            strategy: d_strategy(),
            keep_recent: d_keep_recent(),
            summary_prompt: None,
        }
    }
}

fn d_strategy() -> CompactionStrategy {
    CompactionStrategy::Summarization
}
fn d_keep_recent() -> usize {
    50
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "d_max_messages")]
    pub max_messages: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    #[serde(default = "d_true")]
    pub auto_save: bool,
    #[serde(default = "d_true")]
    pub auto_compact: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_messages: d_max_messages(),
            max_tokens: None,
            auto_save: true,
            auto_compact: true,
        }
    }
}

fn d_max_messages() -> usize {
    100
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Task checkpoint cleanup
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointCleanupConfig {
    #[serde(default = "d_cleanup_interval_secs")]
    pub interval_seconds: u64,
    #[serde(default = "d_cleanup_cutoff_hours")]
    pub cutoff_hours: u64,
}

impl Default for CheckpointCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: d_cleanup_interval_secs(),
            cutoff_hours: d_cleanup_cutoff_hours(),
        }
    }
}

fn d_cleanup_interval_secs() -> u64 {
    3600
}
fn d_cleanup_cutoff_hours() -> u64 {
    24
}

fn d_true() -> bool {
    true
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Aggregate config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentCoreConfig {
    #[serde(default)]
    pub loop_config: LoopConfig,
    #[serde(default)]
    pub replay_buffer: ReplayBufferConfig,
    #[serde(default)]
    pub compaction: CompactionConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub checkpoint_cleanup: CheckpointCleanupConfig,
}

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl AgentCoreConfig {
    /// Validate the configuration and return a list of issues. An empty
    /// vec means everything looks good; any `Error`-severity issue should
    /// abort construction (this is a "Fatal" error per the error taxonomy).
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.loop_config.max_iterations == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "loop_config.max_iterations".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.loop_config.checkpoint_interval == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "loop_config.checkpoint_interval".into(),
                message: "0 checkpoints every iteration; consider 1 or higher".into(),
            });
        }

        if self.replay_buffer.max_events == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "replay_buffer.max_events".into(),
                message: "late subscribers will never see replayed events".into(),
            });
        }

        if self.compaction.keep_recent == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "compaction.keep_recent".into(),
                message: "must keep at least one message after compaction".into(),
            });
        }

        if self.session.max_messages == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "session.max_messages".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.session.auto_compact && self.compaction.keep_recent >= self.session.max_messages {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "compaction.keep_recent".into(),
                message: "keep_recent >= session.max_messages; auto-compaction will never shrink history".into(),
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AgentCoreConfig::default();
        let errors: Vec<_> = config
            .validate()
            .into_iter()
            .filter(|i| i.severity == ConfigSeverity::Error)
            .collect();
        assert!(errors.is_empty());
    }

    #[test]
    fn zero_max_iterations_is_an_error() {
        let mut config = AgentCoreConfig::default();
        config.loop_config.max_iterations = 0;
        let issues = config.validate();
        assert!(issues
            .iter()
            .any(|i| i.severity == ConfigSeverity::Error && i.field == "loop_config.max_iterations"));
    }

    #[test]
    fn deserialize_missing_fields_uses_defaults() {
        let config: AgentCoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.loop_config.max_iterations, 20);
        assert_eq!(config.replay_buffer.max_events, 100);
    }
}
