//! Router/orchestrator for the gateway.
//!
//! Sequences one request through classification, cache lookup, intent
//! resolution, the SQL or retrieval path, formatting, cache/pattern
//! write-back, and history append. Each stage is visited at most once per
//! request; failures degrade to a simpler path instead of retrying.

mod chat_service;
mod context;
mod error;
mod format;

pub use chat_service::{ChatService, GatewayStats};
pub use error::ServiceError;
