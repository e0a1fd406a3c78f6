//! Chat-model client for the gateway's language-model collaborator.
//!
//! The gateway uses the model for three things only: classifying a question
//! as SQL-vs-retrieval, generating SQL when no rule matches, and writing a
//! grounded answer over retrieved chunks. Failures are typed and left to the
//! router, which degrades to a simpler path rather than retrying.

mod client;
mod error;
mod prompts;

pub use client::{ChatClient, ChatMessage};
pub use error::LlmError;
pub use prompts::*;
