use thiserror::Error;

/// Errors from SQL normalization.
///
/// Both variants are fatal for the request that produced the SQL: the query
/// is rejected before it ever reaches the engine.
#[derive(Debug, Error)]
pub enum SqlGenError {
    /// The statement contains a mutating keyword and must not run.
    #[error("refusing to execute mutating SQL (found '{0}')")]
    UnsafeStatement(String),

    /// More than one statement was supplied where exactly one is expected.
    #[error("expected a single SQL statement")]
    MultipleStatements,

    /// Nothing usable was left after cleanup.
    #[error("empty SQL statement")]
    Empty,
}
