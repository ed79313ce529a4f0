//! The LLM provider contract the agent loop drives.
//!
//! This crate intentionally stops at the trait boundary: concrete
//! provider adapters (OpenAI-compatible, Anthropic, Bedrock, Google, ...)
//! translate [`ChatRequest`] to and from a specific wire protocol and are
//! out of scope here. [`mock`] provides a deterministic in-process
//! implementation for tests that exercise the agent loop without a real
//! provider.

pub mod mock;
pub mod traits;

pub use mock::{MockLlmProvider, ScriptedResponse};
pub use traits::{ChatRequest, ChatResponse, LlmProvider};
