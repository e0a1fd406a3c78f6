//! Shared constants for datalens.
//!
//! Centralizes bounds and defaults used across crates.

/// Maximum turns retained per session; older turns are dropped from the front.
pub const MAX_HISTORY_TURNS: usize = 10;

/// Turns of recent context folded into prompts and cache keys.
pub const CONTEXT_WINDOW_TURNS: usize = 3;

/// Default time-to-live for cached responses, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default maximum number of cached responses.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Maximum accepted (phrasing, SQL) records in the learned-pattern log.
pub const SQL_PATTERN_LOG_CAP: usize = 200;

/// Maximum raw phrasings retained per source.
pub const PHRASING_LOG_CAP: usize = 100;

/// Minimum Jaccard similarity for a phrasing to count as a suggestion.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Default number of chunks retrieved on the semantic path.
pub const DEFAULT_TOP_K: usize = 6;

/// Chunks of schema documentation retrieved per request.
pub const SCHEMA_CONTEXT_TOP_K: usize = 3;

/// Timestamp format used in warehouse rows and time predicates.
///
/// Plain `YYYY-MM-DD HH:MM:SS` so that string comparison in the engine
/// orders chronologically and SQLite date functions accept the values.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
