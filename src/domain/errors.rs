//! Domain error types
//!
//! This module defines the error hierarchy for the attack tool. Configuration
//! and data-format problems abort a run before processing, resource
//! exhaustion aborts mid-run. Conditions such as an empty alignment or a
//! record without a guess are results, not errors, and never appear here.

use thiserror::Error;

/// Main error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum BfAttackError {
    /// Contradictory or invalid parameters
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed input data
    #[error("Data format error: {0}")]
    DataFormat(#[from] DatasetError),

    /// Memory ceiling breached during processing
    #[error("Resource exhaustion: memory use {used_mb} MB exceeds limit of {limit_mb} MB")]
    ResourceExhaustion { used_mb: u64, limit_mb: u64 },

    /// Validation errors on domain values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Run cancelled by a shutdown signal
    #[error("Run cancelled: {0}")]
    Shutdown(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Dataset-specific errors
///
/// Errors raised while reading a delimited input file. All of them are fatal
/// for the input source they occur in.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Input file does not exist
    #[error("Dataset file not found: {0}")]
    NotFound(String),

    /// Column separator specification cannot be interpreted
    #[error("Illegal column separator: {0}")]
    IllegalSeparator(String),

    /// A row is shorter than the highest referenced column
    #[error("Row {row} has {found} columns, column {required} is required")]
    MissingColumn {
        row: usize,
        found: usize,
        required: usize,
    },

    /// A row could not be parsed
    #[error("Malformed row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    /// File contains no usable records
    #[error("Dataset contains no records: {0}")]
    Empty(String),
}

impl BfAttackError {
    /// Process exit code associated with this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BfAttackError::Configuration(_) | BfAttackError::Validation(_) => 2,
            BfAttackError::DataFormat(_) => 3,
            BfAttackError::ResourceExhaustion { .. } => 4,
            BfAttackError::Shutdown(_) => 130,
            _ => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for BfAttackError {
    fn from(err: std::io::Error) -> Self {
        BfAttackError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BfAttackError {
    fn from(err: serde_json::Error) -> Self {
        BfAttackError::Serialization(err.to_string())
    }
}

// Conversion from csv::Error
impl From<csv::Error> for BfAttackError {
    fn from(err: csv::Error) -> Self {
        BfAttackError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BfAttackError {
    fn from(err: toml::de::Error) -> Self {
        BfAttackError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BfAttackError::Configuration("odd bf_len".to_string());
        assert_eq!(err.to_string(), "Configuration error: odd bf_len");
    }

    #[test]
    fn test_dataset_error_conversion() {
        let err: BfAttackError = DatasetError::Empty("build.csv".to_string()).into();
        assert!(matches!(err, BfAttackError::DataFormat(_)));
        assert!(err.to_string().contains("build.csv"));
    }

    #[test]
    fn test_resource_exhaustion_display() {
        let err = BfAttackError::ResourceExhaustion {
            used_mb: 2048,
            limit_mb: 1024,
        };
        assert!(err.to_string().contains("2048"));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BfAttackError::Configuration(String::new()).exit_code(), 2);
        assert_eq!(
            BfAttackError::from(DatasetError::NotFound("x".to_string())).exit_code(),
            3
        );
        assert_eq!(BfAttackError::Other(String::new()).exit_code(), 5);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: BfAttackError = io_err.into();
        assert!(matches!(err, BfAttackError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: BfAttackError = toml_err.into();
        assert!(matches!(err, BfAttackError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
