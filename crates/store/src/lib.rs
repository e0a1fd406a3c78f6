//! In-process state for the gateway: conversation history, the response
//! cache, and the learned-pattern log.
//!
//! The orchestrator depends on the [`SessionStore`] and [`ResponseCache`]
//! capabilities, not on these concrete in-memory types; swapping in an
//! external key-value backing changes nothing above this crate. All three
//! stores serialize their read-then-write sequences behind a single lock,
//! and no lock is ever held across an await point by their callers.

mod cache;
mod patterns;
mod session;

pub use cache::{cache_key, CacheEntry, CacheStats, MemoryResponseCache, ResponseCache};
pub use patterns::{PatternLearner, PatternRecord, PatternStats};
pub use session::{render_context, MemorySessionStore, SessionStats, SessionStore};
