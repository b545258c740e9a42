//! Configuration management.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation for one attack experiment.
//!
//! # Overview
//!
//! The configuration file supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `BFATTACK_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of contradictory parameters before any data is read
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, progress interval, memory ceiling, run seed
//! - [`DatasetConfig`] - build and analysis input files
//! - [`EncodingConfig`] - q, hashing, bit vector length, encoding method
//! - [`HardeningConfig`] - hardening method and its parameters
//! - [`AttackConfig`] - minimum frequency and reconstruction target counts
//! - [`OutputConfig`] - results directory and format
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! max_memory_mb = 16000
//! seed = 42
//!
//! [build]
//! path = "data/ncvoter-a.csv.gz"
//! rec_id_col = 0
//! col_sep = ","
//! header = true
//! attributes = [3]
//!
//! [analysis]
//! path = "data/ncvoter-b.csv.gz"
//! rec_id_col = 0
//! attributes = [3]
//!
//! [encoding]
//! q = 2
//! hash_type = "dh"
//! num_hash_functions = "opt"
//! bf_len = 1000
//! method = "abf"
//!
//! [hardening]
//! method = "balance"
//!
//! [attack]
//! min_freq = 100
//! num_freq_attr_vals = [10, 20]
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    AbfLenType, ApplicationConfig, AttackConfig, BfAttackConfig, ChainSelection, ClkRbfConfig,
    DatasetConfig, EncodingConfig, EncodingMethod, HardeningConfig, HardeningMethod,
    HashFunctionCount, HashType, LoggingConfig, MarkovConfig, OutputConfig, OutputFormat,
    RbfConfig,
};
