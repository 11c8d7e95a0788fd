//! Storage usage reporting
//!
//! Usage providers for the volume holding the share and for the share's own
//! directory tree.

pub mod directory;
pub mod filesystem;
pub mod usage;

pub use directory::{DirectoryUsage, directory_used_bytes};
pub use filesystem::FilesystemUsage;
pub use usage::{Usage, UsageProvider};
