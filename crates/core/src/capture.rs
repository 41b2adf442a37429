//! Preparing extracted turns for ingestion.
//!
//! Before turns go to the remote store they are cleaned of any context
//! envelope we injected earlier (otherwise recalled memories would be
//! stored again as new ones), filtered for length, and the first one is
//! stamped with a human-readable capture time.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex_lite::Regex;

use crate::turns::ConversationTurn;

/// Turns shorter than this on either side, after cleaning, are not stored.
pub const MIN_TURN_CHARS: usize = 5;

/// Prompts shorter than this never trigger recall.
pub const MIN_PROMPT_CHARS: usize = 5;

static INJECTED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<cortex-context>[\s\S]*?</cortex-context>\s*").expect("valid regex"));

/// Remove every `<cortex-context>…</cortex-context>` block and trim.
pub fn strip_injected_blocks(text: &str) -> String {
    INJECTED_BLOCK.replace_all(text, "").trim().to_string()
}

/// Case-insensitive check for the opt-out term. An empty term never matches.
pub fn contains_ignore_term(text: &str, term: &str) -> bool {
    let term = term.trim();
    !term.is_empty() && text.to_lowercase().contains(&term.to_lowercase())
}

/// `Sun, Oct 18, 2026, 02:30 PM UTC`
pub fn readable_time(at: DateTime<Utc>) -> String {
    at.format("%a, %b %-d, %Y, %I:%M %p UTC").to_string()
}

/// Strip injected blocks from both sides of each turn.
pub fn clean_turns(turns: &[ConversationTurn]) -> Vec<ConversationTurn> {
    turns
        .iter()
        .map(|t| ConversationTurn {
            user: strip_injected_blocks(&t.user),
            assistant: strip_injected_blocks(&t.assistant),
        })
        .collect()
}

/// Drop turns where either side is shorter than [`MIN_TURN_CHARS`].
pub fn filter_short_turns(turns: Vec<ConversationTurn>) -> Vec<ConversationTurn> {
    turns
        .into_iter()
        .filter(|t| t.user.chars().count() >= MIN_TURN_CHARS && t.assistant.chars().count() >= MIN_TURN_CHARS)
        .collect()
}

/// Prefix the first turn's user text with the capture time.
pub fn annotate_first(mut turns: Vec<ConversationTurn>, at: DateTime<Utc>) -> Vec<ConversationTurn> {
    if let Some(first) = turns.first_mut() {
        first.user = format!("[Temporal details: {}]\n\n{}", readable_time(at), first.user);
    }
    turns
}

/// Full capture pipeline: clean, filter, annotate.
pub fn prepare_for_capture(turns: &[ConversationTurn], at: DateTime<Utc>) -> Vec<ConversationTurn> {
    annotate_first(filter_short_turns(clean_turns(turns)), at)
}
