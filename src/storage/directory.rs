//! Directory usage
//!
//! Sums the sizes of all regular files beneath a root. Entries that vanish or
//! cannot be read mid-walk contribute nothing; only failing to access the
//! root aborts the scan.

use log::debug;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use super::usage::{Usage, UsageProvider};
use crate::error::UsageError;

/// Recursive scan of a directory tree. Reports `used_bytes` only; `free_bytes`
/// is always zero since a directory has no capacity of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryUsage;

impl UsageProvider for DirectoryUsage {
    fn usage(&self, path: &Path) -> Result<Usage, UsageError> {
        Ok(Usage {
            free_bytes: 0,
            used_bytes: directory_used_bytes(path)?,
        })
    }
}

/// Total size in bytes of the regular files under `root`.
pub fn directory_used_bytes(root: &Path) -> Result<u64, UsageError> {
    let mut total: u64 = 0;

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(UsageError::Scan(root.to_path_buf(), io::Error::from(e)));
            }
            Err(e) => {
                debug!("Skipping entry during usage scan: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(meta) => total = total.saturating_add(meta.len()),
            Err(e) => debug!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    Ok(total)
}
