//! Crash-resumable task checkpoint storage.
//!
//! A task's [`PersistedLoopState`](agentcore_domain::loop_state::PersistedLoopState)
//! is written after every LLM response and every tool-result batch. On
//! restart, the agent loop loads the checkpoint and resumes from
//! `resume_from` rather than starting the turn over. [`cleanup`] runs a
//! periodic sweep that deletes stale tasks — and, crucially, their
//! artifacts first — past a configurable cutoff.

pub mod cleanup;
pub mod store;

pub use cleanup::CleanupService;
pub use store::{TaskStore, TaskSummary};
