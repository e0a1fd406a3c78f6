use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TOP_K;
use crate::SourceChoice;

/// Desired presentation of an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Auto,
    Text,
    Table,
    Chart,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Text => "text",
            Self::Table => "table",
            Self::Chart => "chart",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound question for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub message: String,
    #[serde(default)]
    pub source: SourceChoice,
    #[serde(default)]
    pub mode: Mode,
    /// Number of chunks retrieved on the semantic path.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

impl AskRequest {
    /// A request with every optional field at its default.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: SourceChoice::Auto,
            mode: Mode::Auto,
            top_k: DEFAULT_TOP_K,
            session_id: default_session_id(),
        }
    }
}

const fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_session_id() -> String {
    "default".to_owned()
}
