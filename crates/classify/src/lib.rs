//! Lexical query classification for the gateway router.
//!
//! Everything in this crate is a pure function of its input text (and, for
//! the time resolver, an explicit clock value): no hidden state, safe to
//! call concurrently without synchronization.

mod lexical;
mod limit;
mod timewindow;

pub use lexical::*;
pub use limit::extract_limit;
pub use timewindow::{resolve_time_window, TimeFilter};
