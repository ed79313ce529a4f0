//! Pluggable tool dispatch.
//!
//! A [`ToolProvider`] advertises a set of tool names and executes calls
//! against them; [`dispatcher::ToolDispatcher`] holds an ordered list of
//! providers plus the always-present [`thought::ThoughtToolProvider`] and
//! routes each call to the first one that claims it.

pub mod client;
pub mod dispatcher;
pub mod local;
pub mod thought;

pub use client::ClientToolProvider;
pub use dispatcher::ToolDispatcher;
pub use local::LocalToolProvider;
pub use thought::ThoughtToolProvider;

use agentcore_domain::tool::{ToolCall, ToolResult};

/// Something that can execute calls against a fixed set of tool names.
#[async_trait::async_trait]
pub trait ToolProvider: Send + Sync {
    /// Whether this provider handles `tool_name`. Dispatch tries providers
    /// in order and stops at the first one that returns `true`.
    fn can_handle(&self, tool_name: &str) -> bool;

    /// Execute `call`. Must not panic on bad input — validation failures
    /// and execution errors alike are reported through [`ToolResult::failure`].
    async fn dispatch(&self, call: &ToolCall) -> ToolResult;
}
