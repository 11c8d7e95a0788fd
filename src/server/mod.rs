//! Server core functionality
//!
//! This module contains the router composition and the listener lifecycle.

pub mod core;

pub use self::core::{AppState, SHUTDOWN_GRACE, Server, build_router, serve_until};
