//! Prompt builders for the three model calls the router makes.

use datalens_core::Intent;

use crate::client::ChatMessage;

/// Standing instruction for the SQL-generation call.
const SQL_SYSTEM_PROMPT: &str =
    "You are a data assistant. If the question requires math/aggregation (sum, avg, count, top), \
     write a small SQL for the selected source's warehouse tables. If it's a descriptive question, \
     summarize from retrieved chunks. Keep answers concise.";

/// Messages asking the model to classify a question as SQL or retrieval.
#[must_use]
pub fn intent_messages(
    message: &str,
    schema_context: &str,
    conversation_context: &str,
) -> Vec<ChatMessage> {
    let system = format!(
        "You are a data analytics assistant. Classify user queries as SQL (for aggregations, \
         counts, analytics) or RAG (for descriptive questions). Use provided schema context and \
         conversation history to inform your decision.\n\
         Available Schema Context:\n{schema_context}\n\
         Recent Conversation:\n{conversation_context}\n\
         Reply with 'SQL' for quantitative queries or 'RAG' for descriptive queries."
    );
    vec![ChatMessage::system(system), ChatMessage::user(message)]
}

/// Interpret the classifier's reply; anything that doesn't say SQL is
/// treated as retrieval.
#[must_use]
pub fn parse_intent(response: &str) -> Intent {
    if response.to_uppercase().contains("SQL") {
        Intent::Sql
    } else {
        Intent::Retrieval
    }
}

/// Messages asking the model to generate SQL for an unrecognized shape.
#[must_use]
pub fn sql_messages(message: &str, table: &str, schema_context: &str) -> Vec<ChatMessage> {
    let system = format!(
        "{SQL_SYSTEM_PROMPT}\n\n\
         Schema context:\n{schema_context}\n\n\
         Generate clean SQL for the user's question. Rules:\n\
         - Use proper table and column names from schema\n\
         - Include appropriate WHERE, GROUP BY, ORDER BY clauses\n\
         - Use COALESCE for NULL safety in aggregations\n\
         - Group by relevant dimensions when asked for breakdowns\n\
         - Consider conversation context for follow-up questions\n"
    );
    let user = format!("Query: {message}\nTable: {table}\nGenerate SQL:");
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Messages asking the model to answer from retrieved chunks.
#[must_use]
pub fn answer_messages(
    message: &str,
    chunks: &[String],
    schema_context: &str,
    conversation_context: &str,
) -> Vec<ChatMessage> {
    let context_text = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("Doc {}: {chunk}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let mut parts = vec![
        "You are a helpful data assistant. Answer based on the provided context.".to_owned(),
        format!("Schema Context:\n{schema_context}"),
    ];
    if !conversation_context.is_empty() {
        parts.push(format!("Recent Conversation:\n{conversation_context}"));
    }
    parts.push(format!("Documentation Context:\n{context_text}"));
    parts.push(format!("User Question: {message}"));
    parts.push("Provide a helpful, accurate answer based on the context.".to_owned());

    vec![ChatMessage::system(parts.join("\n\n")), ChatMessage::user(message)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_parsing_defaults_to_retrieval() {
        assert_eq!(parse_intent("SQL"), Intent::Sql);
        assert_eq!(parse_intent("this needs sql aggregation"), Intent::Sql);
        assert_eq!(parse_intent("RAG"), Intent::Retrieval);
        assert_eq!(parse_intent("descriptive"), Intent::Retrieval);
    }

    #[test]
    fn intent_messages_carry_context() {
        let msgs = intent_messages("how many orders", "schema here", "User: hi");
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].content.contains("schema here"));
        assert!(msgs[0].content.contains("User: hi"));
        assert_eq!(msgs[1].content, "how many orders");
    }

    #[test]
    fn sql_messages_name_the_table() {
        let msgs = sql_messages("total revenue", "financial_orders", "ctx");
        assert!(msgs[1].content.contains("Table: financial_orders"));
        assert!(msgs[0].content.contains("COALESCE"));
    }

    #[test]
    fn answer_messages_number_the_chunks() {
        let chunks = vec!["alpha".to_owned(), "beta".to_owned()];
        let msgs = answer_messages("what is alpha", &chunks, "schema", "");
        assert!(msgs[0].content.contains("Doc 1: alpha"));
        assert!(msgs[0].content.contains("Doc 2: beta"));
        assert!(!msgs[0].content.contains("Recent Conversation"));
    }
}
