use std::sync::atomic::{AtomicUsize, Ordering};

use agentcore_domain::error::Result;
use agentcore_domain::llm::{BoxStream, LlmChunk};
use async_stream::stream;

use crate::traits::{ChatRequest, ChatResponse, LlmProvider};

/// A scripted response returned by [`MockLlmProvider`] for one call.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Stream character-by-character deltas, then a final stop chunk.
    Text(String),
    /// Stream no content, then a final chunk carrying tool calls.
    ToolCalls(Vec<agentcore_domain::tool::ToolCall>),
}

/// Deterministic [`LlmProvider`] driven by a fixed script of responses,
/// one per call, advancing regardless of the request contents. Intended
/// for agent-loop and session tests where a real provider would be
/// nondeterministic or require network access.
pub struct MockLlmProvider {
    script: Vec<ScriptedResponse>,
    call_count: AtomicUsize,
}

impl MockLlmProvider {
    pub fn new(script: Vec<ScriptedResponse>) -> Self {
        Self {
            script,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn calls_made(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<ScriptedResponse> {
        let index = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.script
            .get(index)
            .cloned()
            .ok_or_else(|| agentcore_domain::error::Error::Other("mock provider script exhausted".into()))
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockLlmProvider {
    async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse> {
        match self.next_response()? {
            ScriptedResponse::Text(content) => Ok(ChatResponse {
                content,
                tool_calls: Vec::new(),
                usage: None,
                model: "mock".into(),
                finish_reason: Some("stop".into()),
            }),
            ScriptedResponse::ToolCalls(tool_calls) => Ok(ChatResponse {
                content: String::new(),
                tool_calls,
                usage: None,
                model: "mock".into(),
                finish_reason: Some("tool_calls".into()),
            }),
        }
    }

    async fn chat_stream(&self, _req: ChatRequest) -> Result<BoxStream<'static, Result<LlmChunk>>> {
        let response = self.next_response()?;
        let stream = stream! {
            match response {
                ScriptedResponse::Text(content) => {
                    let mut cumulative = String::new();
                    for ch in content.chars() {
                        cumulative.push(ch);
                        yield Ok(LlmChunk::delta(ch.to_string(), cumulative.clone()));
                    }
                    yield Ok(LlmChunk::final_stop(cumulative, None));
                }
                ScriptedResponse::ToolCalls(tool_calls) => {
                    yield Ok(LlmChunk::final_with_tool_calls(String::new(), tool_calls));
                }
            }
        };
        Ok(Box::pin(stream))
    }

    fn provider_id(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn streams_text_char_by_char_then_finishes() {
        let provider = MockLlmProvider::new(vec![ScriptedResponse::Text("hi".into())]);
        let stream = provider.chat_stream(ChatRequest::default()).await.unwrap();
        tokio::pin!(stream);

        let chunks: Vec<_> = stream.collect::<Vec<_>>().await;
        assert_eq!(chunks.len(), 3);
        assert!(chunks.last().unwrap().as_ref().unwrap().finished);
    }

    #[tokio::test]
    async fn script_advances_across_calls() {
        let provider = MockLlmProvider::new(vec![
            ScriptedResponse::Text("a".into()),
            ScriptedResponse::Text("b".into()),
        ]);
        let first = provider.chat(ChatRequest::default()).await.unwrap();
        let second = provider.chat(ChatRequest::default()).await.unwrap();
        assert_eq!(first.content, "a");
        assert_eq!(second.content, "b");
        assert_eq!(provider.calls_made(), 2);
    }

    #[tokio::test]
    async fn exhausted_script_errors() {
        let provider = MockLlmProvider::new(vec![ScriptedResponse::Text("a".into())]);
        provider.chat(ChatRequest::default()).await.unwrap();
        assert!(provider.chat(ChatRequest::default()).await.is_err());
    }
}
