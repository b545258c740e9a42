//! Core attack logic.
//!
//! # Modules
//!
//! - [`hashing`] - Token to bit position hashing constructions
//! - [`encoding`] - Record to bit vector encoders
//! - [`hardening`] - Bit vector and token stream hardening
//! - [`attack`] - Frequency alignment, position analysis and reconstruction
//! - [`reident`] - Graph-based re-identification scoring
//! - [`pipeline`] - Orchestration of one experiment
//!
//! # Attack Workflow
//!
//! 1. **Load**: Read the build and analysis datasets
//! 2. **Encode**: Hash every build record into a bit vector and harden it
//! 3. **Align**: Pair frequent bit vectors with frequent plaintext values
//! 4. **Analyse**: Derive candidate q-grams per bit position
//! 5. **Reconstruct**: Guess the most frequent values of encoded records
//! 6. **Score**: Classify the guess graph and compute suspicion statistics
//!
//! # Example
//!
//! ```rust,no_run
//! use bfattack::config::load_config;
//! use bfattack::core::pipeline::AttackCoordinator;
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bfattack.toml")?;
//! let shutdown = Arc::new(AtomicBool::new(false));
//!
//! let coordinator = AttackCoordinator::new(config, shutdown);
//! let summary = coordinator.execute_attack()?;
//!
//! println!("Aligned pairs: {}", summary.aligned_pairs);
//! println!("Result rows: {}", summary.rows.len());
//! # Ok(())
//! # }
//! ```

pub mod attack;
pub mod encoding;
pub mod hardening;
pub mod hashing;
pub mod pipeline;
pub mod reident;
