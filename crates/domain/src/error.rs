/// Shared error type used across all agent-core crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("kind mismatch: {0}")]
    KindMismatch(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("config: {0}")]
    Config(String),

    #[error("agent busy")]
    AgentBusy,

    #[error("agent shut down")]
    AgentShutdown,

    #[error("agent in error state: {0}")]
    AgentError(String),

    #[error("max iterations reached ({0})")]
    MaxIterationsReached(usize),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable, caller-facing error code (see external interface contract).
    /// These strings are load-bearing: callers match on them, so changing
    /// one is a breaking change.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(msg) if msg.starts_with("task:") => "task_not_found",
            Error::NotFound(msg) if msg.starts_with("artifact:") => "artifact_not_found",
            Error::NotFound(_) => "not_found",
            Error::AlreadyExists(msg) if msg.starts_with("artifact:") => {
                "artifact_already_exists"
            }
            Error::AlreadyExists(_) => "already_exists",
            Error::KindMismatch(_) => "artifact_kind_mismatch",
            Error::Validation(_) => "tool_validation_failed",
            Error::Provider { .. } => "llm_call_failed",
            Error::Config(_) => "config_error",
            Error::AgentBusy => "agent_busy",
            Error::AgentShutdown => "agent_shutdown",
            Error::AgentError(_) => "agent_error",
            Error::MaxIterationsReached(_) => "max_iterations_reached",
            Error::Io(_) | Error::Json(_) | Error::Other(_) => "internal_error",
        }
    }

    pub fn task_not_found(task_id: impl Into<String>) -> Self {
        Error::NotFound(format!("task:{}", task_id.into()))
    }

    pub fn artifact_not_found(id: impl Into<String>) -> Self {
        Error::NotFound(format!("artifact:{}", id.into()))
    }

    pub fn artifact_already_exists(id: impl Into<String>) -> Self {
        Error::AlreadyExists(format!("artifact:{}", id.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_not_found_code() {
        assert_eq!(Error::task_not_found("t1").code(), "task_not_found");
    }

    #[test]
    fn artifact_not_found_code() {
        assert_eq!(Error::artifact_not_found("a1").code(), "artifact_not_found");
    }

    #[test]
    fn generic_not_found_code() {
        assert_eq!(Error::NotFound("context:c1".into()).code(), "not_found");
    }
}
