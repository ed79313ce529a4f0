//! Conversation history storage and compaction.
//!
//! [`store::MessageStore`] is an append-only, per-context message log.
//! [`compaction`] shrinks a history that has grown past budget using one
//! of three strategies, without ever splitting a tool call from the tool
//! result that answers it.

pub mod compaction;
pub mod store;

pub use compaction::{compact, CompactionOutcome, RuleBasedSummarizer, Summarizer};
pub use store::MessageStore;
