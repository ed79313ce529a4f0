use agentcore_domain::config::{CompactionConfig, CompactionStrategy};
use agentcore_domain::error::Result;
use agentcore_domain::tool::{Message, Role};
use agentcore_domain::trace::TraceEvent;

/// Chunk size for the hierarchical compaction strategy's dropped prefix.
const HIERARCHICAL_CHUNK_SIZE: usize = 10;

/// Summarizes a run of messages into one piece of text. The concrete
/// implementation (an LLM call) lives outside this crate; compaction only
/// needs the contract.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, messages: &[Message]) -> Result<String>;
}

/// Fallback [`Summarizer`] used when no LLM-backed one is configured: a
/// rule-based digest that just counts messages by role rather than
/// producing prose.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedSummarizer;

impl Summarizer for RuleBasedSummarizer {
    fn summarize(&self, messages: &[Message]) -> Result<String> {
        let mut system = 0;
        let mut user = 0;
        let mut assistant = 0;
        let mut tool = 0;
        for message in messages {
            match message.role {
                Role::System => system += 1,
                Role::User => user += 1,
                Role::Assistant => assistant += 1,
                Role::Tool => tool += 1,
            }
        }
        Ok(format!(
            "{} messages omitted (system={system}, user={user}, assistant={assistant}, tool={tool})",
            messages.len()
        ))
    }
}

#[derive(Debug, Clone)]
pub struct CompactionOutcome {
    pub messages: Vec<Message>,
    pub messages_before: usize,
    pub messages_after: usize,
    pub tokens_saved: i64,
}

/// Shrink `messages` per `config.strategy`. Never splits a tool call from
/// its tool result: the cut point is walked backward from the naive
/// boundary until it no longer separates an assistant `tool_calls` message
/// from any of the tool-role messages answering it.
pub fn compact(
    context_id: &str,
    messages: &[Message],
    config: &CompactionConfig,
    summarizer: &dyn Summarizer,
) -> Result<CompactionOutcome> {
    let tokens_before: usize = messages.iter().map(Message::estimated_tokens).sum();
    let messages_before = messages.len();

    if messages_before <= config.keep_recent {
        return Ok(CompactionOutcome {
            messages: messages.to_vec(),
            messages_before,
            messages_after: messages_before,
            tokens_saved: 0,
        });
    }

    let boundary = safe_boundary(messages, messages_before - config.keep_recent);
    let (dropped, kept) = messages.split_at(boundary);

    let mut result = Vec::new();
    match config.strategy {
        CompactionStrategy::SlidingWindow => {
            result.extend_from_slice(kept);
        }
        CompactionStrategy::Summarization => {
            if !dropped.is_empty() {
                let summary = summarizer.summarize(dropped)?;
                result.push(Message::system(format!("[earlier conversation summary] {summary}")));
            }
            result.extend_from_slice(kept);
        }
        CompactionStrategy::Hierarchical => {
            for chunk in dropped.chunks(HIERARCHICAL_CHUNK_SIZE) {
                let summary = summarizer.summarize(chunk)?;
                result.push(Message::system(format!("[earlier conversation summary] {summary}")));
            }
            result.extend_from_slice(kept);
        }
    }

    let tokens_after: usize = result.iter().map(Message::estimated_tokens).sum();
    let messages_after = result.len();

    TraceEvent::CompactionRun {
        context_id: context_id.to_string(),
        strategy: format!("{:?}", config.strategy),
        messages_before,
        messages_after,
        tokens_saved: tokens_before as i64 - tokens_after as i64,
    }
    .emit();

    Ok(CompactionOutcome {
        messages: result,
        messages_before,
        messages_after,
        tokens_saved: tokens_before as i64 - tokens_after as i64,
    })
}

/// Walk `boundary` backward until it does not fall between an assistant
/// message carrying `tool_calls` and a tool-role message answering one of
/// those calls.
fn safe_boundary(messages: &[Message], boundary: usize) -> usize {
    let mut boundary = boundary;
    while boundary > 0 && boundary < messages.len() {
        let pending_call_ids: Vec<&str> = messages[..boundary]
            .iter()
            .rev()
            .find_map(|m| m.tool_calls.as_ref())
            .map(|calls| calls.iter().map(|c| c.id.as_str()).collect())
            .unwrap_or_default();

        if pending_call_ids.is_empty() {
            break;
        }

        let answered_after = messages[boundary..].iter().any(|m| {
            m.role == Role::Tool
                && m.tool_call_id
                    .as_deref()
                    .is_some_and(|id| pending_call_ids.contains(&id))
        });

        if answered_after {
            boundary -= 1;
        } else {
            break;
        }
    }
    boundary
}
