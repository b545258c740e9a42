//! Resident memory ceiling

use crate::domain::{BfAttackError, Result};

const STATUS_PATH: &str = "/proc/self/status";

/// Aborts processing once resident memory exceeds a ceiling
///
/// Resident size is read from `/proc/self/status`. Where that file is not
/// available the check always passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryGuard {
    max_mb: u64,
}

impl MemoryGuard {
    pub fn new(max_mb: u64) -> Self {
        Self { max_mb }
    }

    pub fn max_mb(&self) -> u64 {
        self.max_mb
    }

    /// Current resident set size in MB, if the platform reports it
    pub fn resident_mb() -> Option<u64> {
        let status = std::fs::read_to_string(STATUS_PATH).ok()?;
        parse_vm_rss_kb(&status).map(|kb| kb / 1024)
    }

    /// Fails with `ResourceExhaustion` when above the ceiling
    ///
    /// Returns the measured resident size.
    pub fn check(&self) -> Result<Option<u64>> {
        let used = Self::resident_mb();
        self.check_value(used)?;
        Ok(used)
    }

    fn check_value(&self, used_mb: Option<u64>) -> Result<()> {
        match used_mb {
            Some(used_mb) if used_mb > self.max_mb => {
                tracing::error!(used_mb, limit_mb = self.max_mb, "Memory ceiling exceeded");
                Err(BfAttackError::ResourceExhaustion {
                    used_mb,
                    limit_mb: self.max_mb,
                })
            }
            _ => Ok(()),
        }
    }
}

fn parse_vm_rss_kb(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vm_rss() {
        let status = "Name:\tbfattack\nVmPeak:\t  20000 kB\nVmRSS:\t   10240 kB\nThreads:\t4\n";
        assert_eq!(parse_vm_rss_kb(status), Some(10240));
        assert_eq!(parse_vm_rss_kb("Name:\tx\n"), None);
    }

    #[test]
    fn test_check_value() {
        let guard = MemoryGuard::new(100);
        assert!(guard.check_value(Some(100)).is_ok());
        assert!(guard.check_value(None).is_ok());
        let err = guard.check_value(Some(101)).unwrap_err();
        assert!(matches!(
            err,
            BfAttackError::ResourceExhaustion {
                used_mb: 101,
                limit_mb: 100
            }
        ));
    }

    #[test]
    fn test_generous_ceiling_passes() {
        assert!(MemoryGuard::new(u64::MAX).check().is_ok());
    }
}
