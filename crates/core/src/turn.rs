use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Capitalized label used when rendering conversation context.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// One message in a session's bounded conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
    /// SQL attached to an assistant turn that came off the SQL path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    /// Chart descriptor reference attached to an assistant turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_ref: Option<String>,
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into(), at: Utc::now(), sql: None, chart_ref: None }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            at: Utc::now(),
            sql: None,
            chart_ref: None,
        }
    }

    #[must_use]
    pub fn with_sql(mut self, sql: Option<String>) -> Self {
        self.sql = sql;
        self
    }

    #[must_use]
    pub fn with_chart_ref(mut self, chart_ref: Option<String>) -> Self {
        self.chart_ref = chart_ref;
        self
    }
}
