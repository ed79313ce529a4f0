use agentcore_domain::error::Result;
use agentcore_domain::llm::{BoxStream, LlmChunk, Usage};
use agentcore_domain::tool::{Message, ToolCall, ToolDefinition};

/// A provider-agnostic chat completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub json_mode: bool,
    pub model: Option<String>,
}

/// A provider-agnostic chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<Usage>,
    pub model: String,
    pub finish_reason: Option<String>,
}

/// The external collaborator the agent loop drives every iteration.
///
/// Implementations are provider-specific adapters that translate between
/// [`ChatRequest`]/[`LlmChunk`] and each provider's wire format; none of
/// that translation lives in this crate, only the contract the loop
/// depends on.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and wait for the full response.
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse>;

    /// Send a chat completion request and return a stream of chunks. The
    /// last chunk yielded must have `finished = true`.
    async fn chat_stream(&self, req: ChatRequest) -> Result<BoxStream<'static, Result<LlmChunk>>>;

    /// A unique identifier for this provider instance, used in error
    /// messages and trace events.
    fn provider_id(&self) -> &str;
}
