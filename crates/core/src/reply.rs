use serde::{Deserialize, Serialize};

/// Tabular query result: ordered columns, ordered rows of JSON-typed cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl Table {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of a named column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One response payload, carrying only the fields valid for its mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Reply {
    Text { text: String },
    Table { table: Table },
    Chart { chart_ref: String },
}

impl Reply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text to record in conversation history for this reply.
    #[must_use]
    pub fn history_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Table { table } => format!("Returned a table with {} rows", table.row_count()),
            Self::Chart { .. } => "Generated data visualization".to_owned(),
        }
    }

    #[must_use]
    pub const fn chart_ref(&self) -> Option<&String> {
        match self {
            Self::Chart { chart_ref } => Some(chart_ref),
            Self::Text { .. } | Self::Table { .. } => None,
        }
    }
}

/// Full answer to one `ask` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(flatten)]
    pub reply: Reply,
    /// SQL that produced the result, when the SQL path ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

impl AskResponse {
    #[must_use]
    pub const fn new(reply: Reply, sql: Option<String>) -> Self {
        Self { reply, sql }
    }

    #[must_use]
    pub fn text_only(text: impl Into<String>) -> Self {
        Self { reply: Reply::text(text), sql: None }
    }

    /// Whether this response carries cacheable content (text or table).
    #[must_use]
    pub const fn is_cacheable(&self) -> bool {
        matches!(self.reply, Reply::Text { .. } | Reply::Table { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_serializes_with_mode_tag() {
        let resp = AskResponse::new(Reply::text("42 orders"), Some("SELECT 1;".to_owned()));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["mode"], "text");
        assert_eq!(json["text"], "42 orders");
        assert_eq!(json["sql"], "SELECT 1;");
    }

    #[test]
    fn table_reply_omits_absent_sql() {
        let table = Table {
            columns: vec!["status".to_owned(), "order_count".to_owned()],
            rows: vec![vec!["PAID".into(), 7.into()]],
        };
        let resp = AskResponse::new(Reply::Table { table }, None);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["mode"], "table");
        assert!(json.get("sql").is_none());
        assert_eq!(json["table"]["columns"][0], "status");
    }

    #[test]
    fn response_round_trips_through_json() {
        let resp = AskResponse::new(Reply::Chart { chart_ref: "chart_ab12.json".to_owned() }, None);
        let text = serde_json::to_string(&resp).unwrap();
        let back: AskResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(back, resp);
    }

    #[test]
    fn empty_table_detection() {
        let table = Table { columns: vec!["a".to_owned()], rows: vec![] };
        assert!(table.is_empty());
        let table = Table::default();
        assert!(table.is_empty());
    }
}
