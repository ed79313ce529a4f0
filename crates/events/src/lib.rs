//! The observable event stream for a single agent-loop execution, plus a
//! short-lived replay buffer that lets a reconnecting client catch up on
//! events it missed.
//!
//! [`emitter::EventEmitter`] is scoped to one execution (one task): it
//! multicasts to every live subscriber and replays its own history to late
//! joiners. [`replay::ReplayBuffer`] is scoped to a contextId across many
//! executions and answers "what happened since event X" for reconnect.

pub mod emitter;
pub mod replay;

pub use emitter::EventEmitter;
pub use replay::{BufferedEvent, ReplayBuffer};
