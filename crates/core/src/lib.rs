//! Core types and configuration for datalens
//!
//! This crate contains domain types shared across all other crates.

mod config;
pub mod constants;
mod reply;
mod request;
mod source;
mod turn;

pub use config::*;
pub use reply::*;
pub use request::*;
pub use source::*;
pub use turn::*;
