//! Error handlers
//!
//! Reporting helpers for errors that reach the binary.

use crate::error::types::{AtlasError, StoreError};
use log::error;

/// Log a top-level error
pub fn handle_error(err: &AtlasError) {
    error!("Atlas Server Error: {}", err);
}

/// Convert error to a process exit code
pub fn exit_code(err: &AtlasError) -> u8 {
    match err {
        AtlasError::Config(_) => 78,
        AtlasError::Store(StoreError::UserExists(_) | StoreError::InvalidUsername(_)) => 65,
        AtlasError::Store(_) => 74,
        AtlasError::IoError(_) => 74,
        AtlasError::ShutdownTimeout(_) => 75,
    }
}
