//! Turns a raw backend continuation into a single displayable reply.

use tracing::trace;

/// Turn boundaries the model may hallucinate after its own reply.
pub const TURN_MARKERS: [&str; 4] = ["\nUser:", "\nBot:", "\nAssistant:", "\nHuman:"];

/// Shown when nothing usable survives cleaning.
pub const FALLBACK_REPLY: &str = "Sorry, I don't have an answer right now.";

/// Clean `generated` text produced for `prompt`.
///
/// The prompt is stripped when echoed back verbatim. The remainder is cut at
/// the leftmost turn marker, whichever marker that is, then trimmed.
///
/// ```
/// use banter::cleaner::clean_reply;
///
/// let prompt = "User: hi\nBot:";
/// let raw = format!("{prompt} hello\nUser: next");
/// assert_eq!(clean_reply(&raw, prompt), "hello");
/// ```
pub fn clean_reply(generated: &str, prompt: &str) -> String {
    let continuation = generated.strip_prefix(prompt).unwrap_or(generated);
    let cut = TURN_MARKERS
        .iter()
        .filter_map(|marker| continuation.find(marker))
        .min()
        .unwrap_or(continuation.len());
    let reply = continuation[..cut].trim();
    trace!(raw = %continuation, %reply, "cleaned reply");
    if reply.is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        reply.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "User: hi\nBot:";

    #[test]
    fn strips_echoed_prompt_and_next_turn() {
        let raw = format!("{PROMPT}hello\nUser: next");
        assert_eq!(clean_reply(&raw, PROMPT), "hello");
    }

    #[test]
    fn keeps_text_without_prompt_prefix() {
        assert_eq!(clean_reply("  just this  ", PROMPT), "just this");
    }

    #[test]
    fn whitespace_only_falls_back() {
        let raw = format!("{PROMPT}  \n\t ");
        assert_eq!(clean_reply(&raw, PROMPT), FALLBACK_REPLY);
    }

    #[test]
    fn marker_at_start_falls_back() {
        let raw = format!("{PROMPT}\nHuman: who am I");
        assert_eq!(clean_reply(&raw, PROMPT), FALLBACK_REPLY);
    }

    #[test]
    fn cuts_at_leftmost_marker() {
        // "\nUser:" is listed first but "\nAssistant:" appears earlier.
        let raw = " sure\nAssistant: extra\nUser: more";
        assert_eq!(clean_reply(raw, PROMPT), "sure");
    }

    #[test]
    fn label_without_newline_is_kept() {
        let raw = " say Bot: twice";
        assert_eq!(clean_reply(raw, PROMPT), "say Bot: twice");
    }
}
