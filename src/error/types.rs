//! Error types
//!
//! Defines domain-specific error types for each part of the Atlas server.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Credential store errors
#[derive(Debug)]
pub enum StoreError {
    UserExists(String),
    InvalidUsername(String),
    Hash(String),
    Io(io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UserExists(u) => write!(f, "user {} already exists", u),
            StoreError::InvalidUsername(u) => write!(f, "invalid username: {:?}", u),
            StoreError::Hash(msg) => write!(f, "password hashing failed: {}", msg),
            StoreError::Io(e) => write!(f, "credential file I/O error: {}", e),
            StoreError::Serialization(e) => write!(f, "credential file is malformed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        StoreError::Io(error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Serialization(error)
    }
}

/// Usage provider errors
#[derive(Debug)]
pub enum UsageError {
    /// The volume statistics call failed for this path.
    Volume(PathBuf, io::Error),
    /// The directory scan could not access its root.
    Scan(PathBuf, io::Error),
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::Volume(p, e) => {
                write!(f, "failed to stat volume for {}: {}", p.display(), e)
            }
            UsageError::Scan(p, e) => write!(f, "failed to scan {}: {}", p.display(), e),
        }
    }
}

impl std::error::Error for UsageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UsageError::Volume(_, e) | UsageError::Scan(_, e) => Some(e),
        }
    }
}

/// Top-level error that encompasses all error types
#[derive(Debug)]
pub enum AtlasError {
    Config(config::ConfigError),
    Store(StoreError),
    IoError(io::Error),
    /// In-flight requests were still running when the shutdown grace ran out.
    ShutdownTimeout(Duration),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::Config(e) => write!(f, "Configuration error: {}", e),
            AtlasError::Store(e) => write!(f, "Credential store error: {}", e),
            AtlasError::IoError(e) => write!(f, "I/O error: {}", e),
            AtlasError::ShutdownTimeout(grace) => {
                write!(f, "Shutdown gave up after {:?} with requests in flight", grace)
            }
        }
    }
}

impl std::error::Error for AtlasError {}

impl From<config::ConfigError> for AtlasError {
    fn from(error: config::ConfigError) -> Self {
        AtlasError::Config(error)
    }
}

impl From<StoreError> for AtlasError {
    fn from(error: StoreError) -> Self {
        AtlasError::Store(error)
    }
}

impl From<io::Error> for AtlasError {
    fn from(error: io::Error) -> Self {
        AtlasError::IoError(error)
    }
}
