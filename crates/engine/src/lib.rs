//! Embedded analytical warehouse.
//!
//! SQLite-backed store for the two warehouse tables the gateway aggregates
//! over. The gateway treats this as an external engine behind a narrow
//! interface: `execute(sql) -> Table`. Queries reaching it have either been
//! rule-compiled (trusted by construction) or passed the safety normalizer.

mod error;
mod seed;
mod warehouse;

pub use error::EngineError;
pub use seed::{seed_demo, SeedReport};
pub use warehouse::Warehouse;
