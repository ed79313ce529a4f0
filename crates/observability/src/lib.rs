//! Span-lifecycle hooks for the agent loop.
//!
//! This crate owns *when* a span opens and closes, not what happens to it
//! afterward — no exporter, no `opentelemetry` dependency. A caller that
//! wants traces shipped somewhere wires a `tracing` subscriber/layer of
//! their own choosing downstream; swapping [`Tracer`] implementations lets
//! tests replace span creation with a no-op without touching call sites.

use tracing::Span;

/// Opens the spans that bracket one turn, one loop iteration, one tool
/// dispatch, and one LLM call. Implementations must be cheap to call on
/// every iteration.
pub trait Tracer: Send + Sync {
    fn turn_span(&self, context_id: &str, task_id: &str) -> Span;
    fn iteration_span(&self, task_id: &str, iteration: usize) -> Span;
    fn tool_span(&self, task_id: &str, tool_name: &str, call_id: &str) -> Span;
    fn llm_call_span(&self, task_id: &str, iteration: usize) -> Span;
}

/// Default [`Tracer`]: opens real `tracing` spans at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn turn_span(&self, context_id: &str, task_id: &str) -> Span {
        tracing::info_span!("turn", context_id = %context_id, task_id = %task_id)
    }

    fn iteration_span(&self, task_id: &str, iteration: usize) -> Span {
        tracing::info_span!("iteration", task_id = %task_id, iteration)
    }

    fn tool_span(&self, task_id: &str, tool_name: &str, call_id: &str) -> Span {
        tracing::info_span!("tool_dispatch", task_id = %task_id, tool_name = %tool_name, call_id = %call_id)
    }

    fn llm_call_span(&self, task_id: &str, iteration: usize) -> Span {
        tracing::info_span!("llm_call", task_id = %task_id, iteration)
    }
}

/// A [`Tracer`] that opens disabled spans — for tests that want the
/// `Tracer`-shaped call sites exercised without any tracing overhead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn turn_span(&self, _context_id: &str, _task_id: &str) -> Span {
        Span::none()
    }

    fn iteration_span(&self, _task_id: &str, _iteration: usize) -> Span {
        Span::none()
    }

    fn tool_span(&self, _task_id: &str, _tool_name: &str, _call_id: &str) -> Span {
        Span::none()
    }

    fn llm_call_span(&self, _task_id: &str, _iteration: usize) -> Span {
        Span::none()
    }
}
