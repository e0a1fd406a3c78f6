use thiserror::Error;

/// Fatal per-request failures surfaced to the caller.
///
/// Everything else the router encounters (classification ambiguity, an
/// unmatched rule, a failed model call, a failed SQL execution) is
/// recovered internally by degrading to a simpler path.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Externally generated SQL failed the safety gate and was never
    /// executed.
    #[error("rejected generated SQL: {0}")]
    UnsafeSql(#[from] datalens_sqlgen::SqlGenError),
}
