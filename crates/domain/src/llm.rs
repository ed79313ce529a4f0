use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::tool::ToolCall;

/// A boxed async stream, used for LLM streaming responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

/// Token usage counters for a completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One chunk of a streaming LLM response.
///
/// `content` is cumulative across the whole response; `content_delta` is
/// this chunk's new characters only. Whitespace in `content_delta` must be
/// preserved verbatim — trimming happens only once, on the final assembled
/// content. `tool_calls` is populated only on the final chunk.
#[derive(Debug, Clone, Default)]
pub struct LlmChunk {
    pub content: Option<String>,
    pub content_delta: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub finished: bool,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<Usage>,
}

impl LlmChunk {
    pub fn delta(text: impl Into<String>, cumulative: impl Into<String>) -> Self {
        Self {
            content: Some(cumulative.into()),
            content_delta: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn final_with_tool_calls(cumulative: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: Some(cumulative.into()),
            content_delta: None,
            tool_calls: Some(tool_calls),
            finished: true,
            finish_reason: Some(FinishReason::ToolCalls),
            usage: None,
        }
    }

    pub fn final_stop(cumulative: impl Into<String>, usage: Option<Usage>) -> Self {
        Self {
            content: Some(cumulative.into()),
            content_delta: None,
            tool_calls: None,
            finished: true,
            finish_reason: Some(FinishReason::Stop),
            usage,
        }
    }
}
