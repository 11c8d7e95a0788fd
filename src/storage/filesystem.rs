//! Volume usage
//!
//! Reports free and used bytes for the filesystem containing a path.

use std::path::Path;

use super::usage::{Usage, UsageProvider};
use crate::error::UsageError;

/// Volume-level usage via `statvfs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemUsage;

#[cfg(unix)]
impl UsageProvider for FilesystemUsage {
    fn usage(&self, path: &Path) -> Result<Usage, UsageError> {
        let stat = nix::sys::statvfs::statvfs(path)
            .map_err(|errno| UsageError::Volume(path.to_path_buf(), errno.into()))?;

        let unit = stat.fragment_size() as u64;
        let free_bytes = (stat.blocks_available() as u64).saturating_mul(unit);
        let total_bytes = (stat.blocks() as u64).saturating_mul(unit);

        Ok(Usage {
            free_bytes,
            used_bytes: total_bytes.saturating_sub(free_bytes),
        })
    }
}

/// Free space reported where no volume statistics call is available
#[cfg(not(unix))]
const FALLBACK_FREE_BYTES: u64 = 100 * 1024 * 1024 * 1024;

#[cfg(not(unix))]
impl UsageProvider for FilesystemUsage {
    fn usage(&self, _path: &Path) -> Result<Usage, UsageError> {
        Ok(Usage {
            free_bytes: FALLBACK_FREE_BYTES,
            used_bytes: 0,
        })
    }
}
