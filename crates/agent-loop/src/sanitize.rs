use agentcore_domain::tool::ToolCall;

/// Clean up tool calls as they come off the wire from a provider adapter,
/// before anything downstream sees them: every call gets a nonempty id,
/// and `arguments` is coerced into a JSON object (providers that return a
/// JSON-encoded string instead of a structured object are accommodated by
/// parsing it; anything that still isn't an object becomes an empty one
/// rather than propagating a type a tool handler can't use).
pub fn sanitize_tool_calls(raw: Vec<ToolCall>) -> Vec<ToolCall> {
    raw.into_iter()
        .filter_map(|mut call| {
            if call.tool_name.is_empty() {
                tracing::warn!(call_id = %call.id, "dropping tool call with an empty tool name");
                return None;
            }
            if call.id.is_empty() {
                call.id = uuid::Uuid::new_v4().to_string();
            }
            call.arguments = sanitize_arguments(call.arguments);
            Some(call)
        })
        .collect()
}

fn sanitize_arguments(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(_) => value,
        serde_json::Value::String(s) => match serde_json::from_str(&s) {
            Ok(parsed @ serde_json::Value::Object(_)) => parsed,
            _ => serde_json::Value::Object(Default::default()),
        },
        _ => serde_json::Value::Object(Default::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tool_name_is_dropped() {
        let calls = vec![ToolCall::new("c1", "", serde_json::json!({}))];
        assert!(sanitize_tool_calls(calls).is_empty());
    }

    #[test]
    fn missing_id_is_backfilled() {
        let calls = vec![ToolCall::new("", "get_weather", serde_json::json!({}))];
        let sanitized = sanitize_tool_calls(calls);
        assert_eq!(sanitized.len(), 1);
        assert!(!sanitized[0].id.is_empty());
    }

    #[test]
    fn stringified_json_arguments_are_parsed() {
        let calls = vec![ToolCall::new("c1", "get_weather", serde_json::Value::String(r#"{"city":"NYC"}"#.into()))];
        let sanitized = sanitize_tool_calls(calls);
        assert_eq!(sanitized[0].arguments, serde_json::json!({"city": "NYC"}));
    }

    #[test]
    fn non_object_arguments_become_empty_object() {
        let calls = vec![ToolCall::new("c1", "get_weather", serde_json::json!(42))];
        let sanitized = sanitize_tool_calls(calls);
        assert_eq!(sanitized[0].arguments, serde_json::json!({}));
    }
}
