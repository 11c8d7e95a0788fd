//! Usage provider contract
//!
//! A usage provider reports free and used bytes for a path. The quota
//! reporter consumes it; it never writes anything.

use std::path::Path;

use crate::error::UsageError;

/// Free and used byte counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub free_bytes: u64,
    pub used_bytes: u64,
}

pub trait UsageProvider: Send + Sync {
    fn usage(&self, path: &Path) -> Result<Usage, UsageError>;
}

impl Usage {
    /// Usage as seen through a fixed quota: used is clamped to the quota and
    /// free is what remains of it.
    pub fn within_quota(quota_bytes: u64, used_bytes: u64) -> Self {
        let used_bytes = used_bytes.min(quota_bytes);
        Self {
            free_bytes: quota_bytes - used_bytes,
            used_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_quota_clamps() {
        assert_eq!(
            Usage::within_quota(10, 15),
            Usage {
                free_bytes: 0,
                used_bytes: 10
            }
        );
    }

    #[test]
    fn test_under_quota() {
        assert_eq!(
            Usage::within_quota(10, 4),
            Usage {
                free_bytes: 6,
                used_bytes: 4
            }
        );
    }

    #[test]
    fn test_exactly_full() {
        assert_eq!(Usage::within_quota(7, 7).free_bytes, 0);
    }
}
