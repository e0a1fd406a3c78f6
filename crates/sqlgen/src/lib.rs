//! SQL generation for the gateway's aggregate path.
//!
//! Two layers with very different trust levels:
//!
//! - [`compile`] deterministically maps a bounded catalogue of recognized
//!   question shapes to parameterized aggregate SQL. Compiled SQL is trusted
//!   by construction and is executed as-is.
//! - [`normalize`] post-processes SQL obtained from the external model. It
//!   must run before executing every non-rule-compiled query; it is the sole
//!   safety gate in front of the engine.

mod compiler;
mod error;
mod normalize;

pub use compiler::compile;
pub use error::SqlGenError;
pub use normalize::{enforce_limit, extract_sql, normalize};
