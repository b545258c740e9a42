//! Periodic progress, memory and shutdown checks for record loops

use super::memory::MemoryGuard;
use crate::domain::{BfAttackError, Result};
use crate::log_progress;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Flag raised by the signal handler to cancel a run
pub type ShutdownFlag = Arc<AtomicBool>;

/// Checkpoint called from a record-processing loop
///
/// Every `interval` records it logs progress, fails if a shutdown was
/// requested and enforces the memory ceiling.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    stage: &'static str,
    interval: usize,
    started: Instant,
    guard: MemoryGuard,
    shutdown: ShutdownFlag,
}

impl Checkpoint {
    pub fn new(
        stage: &'static str,
        interval: usize,
        guard: MemoryGuard,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            stage,
            interval: interval.max(1),
            started: Instant::now(),
            guard,
            shutdown,
        }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Called with the number of records processed so far
    pub fn tick(&self, processed: usize) -> Result<()> {
        if processed == 0 || processed % self.interval != 0 {
            return Ok(());
        }
        log_progress!(self.stage, processed, self.started.elapsed());
        self.check()
    }

    /// Shutdown and memory check without progress logging
    pub fn check(&self) -> Result<()> {
        if self.shutdown.load(Ordering::SeqCst) {
            tracing::warn!(stage = self.stage, "Shutdown requested, aborting run");
            return Err(BfAttackError::Shutdown(format!(
                "cancelled during {}",
                self.stage
            )));
        }
        if let Some(used_mb) = self.guard.check()? {
            tracing::debug!(stage = self.stage, memory_mb = used_mb, "Memory use");
        }
        Ok(())
    }

    /// Same checkpoint for another stage, restarting the clock
    pub fn stage(&self, stage: &'static str) -> Self {
        Self {
            stage,
            started: Instant::now(),
            ..self.clone()
        }
    }
}
