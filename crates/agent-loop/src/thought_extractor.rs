//! Streaming-safe `<thinking>` tag extraction.
//!
//! Deliberately not regex-over-cumulative-content: that would need to
//! re-scan everything seen so far on every delta, and a naive
//! match-against-the-whole-buffer approach breaks the moment a tag's
//! open or close marker straddles a chunk boundary (the model can emit
//! `<thin` in one chunk and `king>` in the next). Instead this keeps a
//! small carry-over buffer — at most `tag.len() - 1` bytes — holding onto
//! a trailing fragment that might be the start of the tag we're looking
//! for next, and each delta runs through in O(delta length).
//!
//! Thought text is buffered from the opening tag through the closing tag
//! and surfaced as a single, trimmed chunk once the pair completes — a
//! thought in progress produces no output at all, so a `<thinking>` span
//! straddling many deltas still yields exactly one emission.

const OPEN_TAG: &str = "<thinking>";
const CLOSE_TAG: &str = "</thinking>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Content,
    Thought,
}

/// One delta's worth of extracted output. `content` reflects this delta's
/// visible text as usual; `thought` is only populated on the delta whose
/// input completes a `<thinking>...</thinking>` pair, and holds the full
/// trimmed inner text accumulated since the opening tag, not just this
/// delta's slice of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub content: Option<String>,
    pub thought: Option<String>,
}

/// Rolling state machine that splits a stream of content deltas into
/// visible content and `<thinking>...</thinking>` thought content.
pub struct ThoughtExtractor {
    mode: Mode,
    carry: String,
    thought_buffer: String,
}

impl Default for ThoughtExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ThoughtExtractor {
    pub fn new() -> Self {
        Self {
            mode: Mode::Content,
            carry: String::new(),
            thought_buffer: String::new(),
        }
    }

    pub fn in_thought(&self) -> bool {
        self.mode == Mode::Thought
    }

    /// Feed the next delta. Returns the content extracted from it and, if
    /// this delta closes a `<thinking>` tag, the complete trimmed thought.
    /// Any trailing partial tag match is held back in `self.carry` and
    /// resolved (or proven not to be a tag) on the next call.
    pub fn push(&mut self, delta: &str) -> Extracted {
        let mut input = std::mem::take(&mut self.carry);
        input.push_str(delta);

        let mut out = Extracted::default();
        loop {
            let needle = match self.mode {
                Mode::Content => OPEN_TAG,
                Mode::Thought => CLOSE_TAG,
            };

            match input.find(needle) {
                Some(pos) => {
                    let (before, after) = input.split_at(pos);
                    match self.mode {
                        Mode::Content => append_content(&mut out, before),
                        Mode::Thought => {
                            self.thought_buffer.push_str(before);
                            out.thought = Some(std::mem::take(&mut self.thought_buffer).trim().to_string());
                        }
                    }
                    input = after[needle.len()..].to_string();
                    self.mode = match self.mode {
                        Mode::Content => Mode::Thought,
                        Mode::Thought => Mode::Content,
                    };
                }
                None => {
                    let carry_len = trailing_partial_match(&input, needle);
                    let (emit, carry) = input.split_at(input.len() - carry_len);
                    match self.mode {
                        Mode::Content => append_content(&mut out, emit),
                        Mode::Thought => self.thought_buffer.push_str(emit),
                    }
                    self.carry = carry.to_string();
                    break;
                }
            }
        }

        out
    }

    /// Flush whatever is left at stream end. An unclosed `<thinking>` tag
    /// still surfaces its buffered text (trimmed) as a thought rather than
    /// being silently dropped; a trailing content carry is flushed as-is.
    pub fn finish(&mut self) -> Extracted {
        let mut out = Extracted::default();
        let carry = std::mem::take(&mut self.carry);
        match self.mode {
            Mode::Content => append_content(&mut out, &carry),
            Mode::Thought => {
                self.thought_buffer.push_str(&carry);
                let thought = std::mem::take(&mut self.thought_buffer);
                if !thought.trim().is_empty() {
                    out.thought = Some(thought.trim().to_string());
                }
            }
        }
        out
    }
}

fn append_content(out: &mut Extracted, text: &str) {
    if text.is_empty() {
        return;
    }
    let slot = out.content.get_or_insert_with(String::new);
    slot.push_str(text);
}

/// Longest suffix of `haystack` that is also a proper prefix of `needle`
/// (i.e. could grow into a full match once more input arrives).
fn trailing_partial_match(haystack: &str, needle: &str) -> usize {
    let max = needle.len().saturating_sub(1).min(haystack.len());
    for len in (1..=max).rev() {
        if haystack.ends_with(&needle[..len]) {
            return len;
        }
    }
    0
}
