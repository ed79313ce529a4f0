//! The per-turn generate/dispatch loop.
//!
//! [`runner::AgentLoop`] drives one turn end to end: ask the provider for
//! the next chunk of the response, split `<thinking>` content out of it,
//! sanitize and dispatch whatever tool calls come back, checkpoint, and
//! repeat until the model stops asking for tools or the turn's iteration
//! budget runs out.

pub mod dispatch;
pub mod runner;
pub mod sanitize;
pub mod thought_extractor;

pub use runner::{AgentLoop, LoopOutcome};
pub use thought_extractor::{Extracted, ThoughtExtractor};
