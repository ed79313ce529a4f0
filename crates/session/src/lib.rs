//! The per-context conversational agent: owns the `created → ready → busy
//! → ready` state machine, wires one turn's history and tool surface into
//! [`agentcore_agent_loop::AgentLoop`], and persists whatever the turn
//! produced once it lands.
//!
//! [`session::AgentSession`] is the thing an external caller actually
//! holds: `start_turn` kicks a turn off in the background and hands back
//! an [`agentcore_events::EventEmitter`] to watch it unfold, rather than
//! blocking the caller for the whole turn.

pub mod session;

pub use session::AgentSession;
