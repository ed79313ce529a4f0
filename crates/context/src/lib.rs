//! Context (session) metadata storage and advisory cooperative locks.
//!
//! A context outlives any single task: it is the durable identity a
//! caller returns to across many turns. [`ContextStore`] is CRUD plus a
//! simple substring search over title/description/tags; the lock methods
//! are advisory only — the core never takes or checks these locks itself,
//! they exist so cooperating external callers can coordinate.

pub mod store;

pub use store::ContextStore;
