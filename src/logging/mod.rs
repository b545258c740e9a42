//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels, overridable through `RUST_LOG`
//! - Human readable console output
//! - Optional JSON log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use bfattack::logging::init_logging;
//! use bfattack::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Experiment started");
//! tracing::warn!(pairs = 0, "No pairs aligned");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log progress of a record-processing loop
///
/// Reports the processed count, elapsed time and average time per record.
///
/// # Example
///
/// ```no_run
/// use bfattack::log_progress;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// log_progress!("encode", 100_000, start.elapsed());
/// ```
#[macro_export]
macro_rules! log_progress {
    ($stage:expr, $processed:expr, $elapsed:expr) => {
        tracing::info!(
            stage = $stage,
            processed = $processed,
            elapsed_secs = format!("{:.2}", $elapsed.as_secs_f64()),
            avg_ms_per_record = format!(
                "{:.3}",
                $elapsed.as_secs_f64() * 1000.0 / ($processed as f64).max(1.0)
            ),
            "Progress"
        );
    };
}

/// Log the completion of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use bfattack::log_stage_complete;
/// use std::time::Duration;
///
/// log_stage_complete!("load", 5_000, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            stage = $stage,
            count = $count,
            duration_ms = $duration.as_millis(),
            "Stage completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use bfattack::log_error_with_context;
/// use bfattack::domain::BfAttackError;
///
/// let error = BfAttackError::Configuration("odd bf_len".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let elapsed = Duration::from_millis(250);
        crate::log_progress!("encode", 10usize, elapsed);
        crate::log_stage_complete!("load", 3usize, elapsed);
        let error = crate::domain::BfAttackError::Other("x".to_string());
        crate::log_error_with_context!(&error, "test");
    }
}
