use serde::{Deserialize, Serialize};

/// A role a [`Message`] may be authored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single message in the conversation history.
///
/// `content` may be empty when an assistant message only carries tool
/// calls. `tool_call_id` correlates a tool-role message back to the
/// [`ToolCall`] it answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
            tool_call_id: None,
            name: None,
            tool_calls: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            tool_call_id: None,
            name: None,
            tool_calls: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            tool_call_id: None,
            name: None,
            tool_calls: None,
        }
    }

    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            tool_call_id: None,
            name: None,
            tool_calls: Some(tool_calls),
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            tool_calls: None,
        }
    }

    /// Rough token estimate using the 4-characters-per-token heuristic
    /// used throughout the message store and compaction logic.
    pub fn estimated_tokens(&self) -> usize {
        let mut chars = self.content.chars().count();
        if let Some(calls) = &self.tool_calls {
            for call in calls {
                chars += call.tool_name.len();
                chars += call.arguments.to_string().chars().count();
            }
        }
        (chars + 3) / 4
    }
}

/// Tool definition exposed to the LLM and advertised by a `ToolProvider`.
///
/// `parameters` is a JSON-Schema-shaped object: `{"type": "object",
/// "properties": {...}, "required": [...], "additionalProperties": bool}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// An LLM-issued function invocation.
///
/// Invariant: `id` and `tool_name` are both nonempty; callers constructing
/// one outside a provider adapter should prefer [`ToolCall::new`], which
/// enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub tool_name: String,
    /// Keyed argument mapping. Provider adapters are expected to hand back
    /// a JSON object here; non-object values are rejected during response
    /// sanitization (see the agent loop).
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.tool_name.is_empty()
    }
}

/// The outcome of dispatching a [`ToolCall`] to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(tool_call_id: impl Into<String>, tool_name: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(tool_call_id: impl Into<String>, tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Serialize the result into the content string of a tool-role message.
    pub fn to_message_content(&self) -> String {
        if self.success {
            self.result
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default()
        } else {
            serde_json::json!({ "error": self.error.clone().unwrap_or_default() }).to_string()
        }
    }
}
