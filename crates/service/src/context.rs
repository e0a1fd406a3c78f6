//! Cache-key context derivation.

use datalens_core::constants::CONTEXT_WINDOW_TURNS;
use datalens_core::{Role, Turn};
use datalens_store::render_context;

/// Recent-context string folded into the cache key.
///
/// Uses the last turns of the session, with one carve-out: when the most
/// recent exchange was this very question (same normalized user text and no
/// later user turn), that exchange is excluded. Repeating a question
/// therefore hashes to the key of its first asking and hits the cache,
/// while any intervening question changes the context and misses.
#[must_use]
pub fn context_for_key(history: &[Turn], message: &str) -> String {
    let normalized = message.trim().to_lowercase();
    let last_user = history.iter().rposition(|t| t.role == Role::User);

    let window = match last_user {
        Some(i) if history[i].text.trim().to_lowercase() == normalized => &history[..i],
        _ => history,
    };
    render_context(window, CONTEXT_WINDOW_TURNS)
}
