use std::collections::HashMap;
use std::sync::Arc;

use agentcore_domain::error::{Error, Result};
use agentcore_domain::tool::{ToolCall, ToolDefinition, ToolResult};
use jsonschema::Validator;
use parking_lot::RwLock;

use crate::ToolProvider;

/// A locally-executed tool implementation. Synchronous by design: local
/// tools are expected to be pure computation or fast local I/O; anything
/// that needs to block on an external actor belongs behind
/// [`crate::ClientToolProvider`] instead.
pub trait LocalToolHandler: Send + Sync {
    fn call(&self, arguments: &serde_json::Value) -> std::result::Result<serde_json::Value, String>;
}

impl<F> LocalToolHandler for F
where
    F: Fn(&serde_json::Value) -> std::result::Result<serde_json::Value, String> + Send + Sync,
{
    fn call(&self, arguments: &serde_json::Value) -> std::result::Result<serde_json::Value, String> {
        self(arguments)
    }
}

/// One JSON Schema validation failure, named by the argument path it
/// applies to.
#[derive(Debug, Clone, serde::Serialize)]
struct SchemaViolation {
    path: String,
    message: String,
}

struct Registered {
    definition: ToolDefinition,
    validator: Option<Validator>,
    handler: Arc<dyn LocalToolHandler>,
}

/// Tools registered and executed in-process. Arguments are validated
/// against the tool's `parameters` JSON Schema before the handler runs.
#[derive(Default)]
pub struct LocalToolProvider {
    tools: RwLock<HashMap<String, Registered>>,
}

impl LocalToolProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Compiles `definition.parameters` as a JSON Schema
    /// up front so a malformed schema fails at registration, not at the
    /// first call.
    pub fn register(&self, definition: ToolDefinition, handler: Arc<dyn LocalToolHandler>) -> Result<()> {
        let validator = if definition.parameters.is_null() {
            None
        } else {
            Some(
                jsonschema::validator_for(&definition.parameters)
                    .map_err(|e| Error::Config(format!("invalid schema for tool {}: {e}", definition.name)))?,
            )
        };
        self.tools.write().insert(
            definition.name.clone(),
            Registered {
                definition,
                validator,
                handler,
            },
        );
        Ok(())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.read().values().map(|r| r.definition.clone()).collect()
    }
}

#[async_trait::async_trait]
impl ToolProvider for LocalToolProvider {
    fn can_handle(&self, tool_name: &str) -> bool {
        self.tools.read().contains_key(tool_name)
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let (violations, handler) = {
            let tools = self.tools.read();
            let Some(registered) = tools.get(&call.tool_name) else {
                return ToolResult::failure(
                    call.id.clone(),
                    call.tool_name.clone(),
                    format!("No provider for tool: {}", call.tool_name),
                );
            };
            let violations: Vec<SchemaViolation> = match &registered.validator {
                Some(v) => v
                    .iter_errors(&call.arguments)
                    .map(|e| SchemaViolation {
                        path: e.instance_path.to_string(),
                        message: e.to_string(),
                    })
                    .collect(),
                None => Vec::new(),
            };
            (violations, Arc::clone(&registered.handler))
        };

        if !violations.is_empty() {
            let detail = serde_json::to_string(&violations).unwrap_or_default();
            return ToolResult::failure(
                call.id.clone(),
                call.tool_name.clone(),
                format!("arguments do not match the tool's parameter schema: {detail}"),
            );
        }

        match handler.call(&call.arguments) {
            Ok(value) => ToolResult::ok(call.id.clone(), call.tool_name.clone(), value),
            Err(message) => ToolResult::failure(call.id.clone(), call.tool_name.clone(), message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_tool() -> ToolDefinition {
        ToolDefinition {
            name: "echo".into(),
            description: "echoes its input".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"],
                "additionalProperties": false,
            }),
        }
    }

    #[tokio::test]
    async fn valid_arguments_dispatch_to_handler() {
        let provider = LocalToolProvider::new();
        provider
            .register(
                echo_tool(),
                Arc::new(|args: &serde_json::Value| Ok(args.clone())),
            )
            .unwrap();

        let call = ToolCall::new("c1", "echo", serde_json::json!({ "text": "hi" }));
        let result = provider.dispatch(&call).await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn invalid_arguments_fail_schema_validation() {
        let provider = LocalToolProvider::new();
        provider
            .register(echo_tool(), Arc::new(|args: &serde_json::Value| Ok(args.clone())))
            .unwrap();

        let call = ToolCall::new("c1", "echo", serde_json::json!({ "not_text": 1 }));
        let result = provider.dispatch(&call).await;
        assert!(!result.success);
        let error = result.error.unwrap();
        // the required "text" property is missing, and the unexpected
        // "not_text" property is rejected by additionalProperties: false;
        // both show up as distinct path/message entries.
        assert!(error.contains("\"path\""));
        assert!(error.contains("\"message\""));
    }

    #[tokio::test]
    async fn unregistered_tool_reports_no_provider() {
        let provider = LocalToolProvider::new();
        let call = ToolCall::new("c1", "missing", serde_json::json!({}));
        let result = provider.dispatch(&call).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("No provider"));
    }
}
