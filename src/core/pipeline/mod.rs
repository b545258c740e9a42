//! Run orchestration
//!
//! - [`coordinator`] - Drives one experiment from loading to result rows
//! - [`progress`] - Periodic progress, shutdown and memory checkpoints
//! - [`memory`] - Resident memory ceiling
//! - [`summary`] - Result rows and the run summary

pub mod coordinator;
pub mod memory;
pub mod progress;
pub mod summary;

pub use coordinator::{AttackCoordinator, EncodedDataset};
pub use memory::MemoryGuard;
pub use progress::{Checkpoint, ShutdownFlag};
pub use summary::{AttackSummary, ErrorRow, ResultRecord, ResultRow, RunInfo};
