//! Typed error enum for the vector crate.

use thiserror::Error;

/// Errors from embedding or vector-search operations.
#[derive(Debug, Error)]
pub enum VectorError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("embedding endpoint returned no vectors")]
    EmptyEmbedding,
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}
