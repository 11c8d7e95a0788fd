//! Error handling
//!
//! Defines error types and handling for the Atlas server.

pub mod handlers;
pub mod types;

pub use types::*;
