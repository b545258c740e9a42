// bfattack - Frequency attack on Bloom filter encodings
// Copyright (c) 2025 BF Attack Contributors
// Licensed under the MIT License

//! # bfattack - Frequency attack on Bloom filter encodings
//!
//! bfattack measures how much of a privacy-preserving record linkage (PPRL)
//! encoding can be undone by an attacker who only sees the encoded bit
//! vectors and knows the encoding parameters.
//!
//! ## Overview
//!
//! This library provides:
//! - **Encoding** of records into Bloom filters with four hashing
//!   constructions and four encoding methods
//! - **Hardening** of the encodings with six transforms
//! - **Attacking** the encodings by aligning frequent bit vectors with
//!   frequent plaintext values and inferring which q-grams set which bits
//! - **Scoring** the resulting guesses at entity and attribute level
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Hashing, encoding, hardening, attack, scoring and orchestration
//! - [`adapters`] - Dataset loading and result writing
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bfattack::config::load_config;
//! use bfattack::core::pipeline::AttackCoordinator;
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("bfattack.toml")?;
//!     let coordinator = AttackCoordinator::new(config, Arc::new(AtomicBool::new(false)));
//!
//!     let summary = coordinator.execute_attack()?;
//!     for row in &summary.rows {
//!         println!(
//!             "top {}: {} values guessed uniquely",
//!             row.num_freq_attr_vals, row.guesses.correct_unique
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Building blocks
//!
//! The stages can also be used on their own:
//!
//! ```rust
//! use bfattack::config::HashType;
//! use bfattack::core::hardening::Hardener;
//! use bfattack::core::hashing::HashScheme;
//! use bfattack::domain::{qgrams, BitVector};
//!
//! let scheme = HashScheme::new(HashType::Double, 64, 4, "");
//! let positions = qgrams("smith", 2, false)
//!     .iter()
//!     .flat_map(|t| scheme.generate(t))
//!     .collect::<Vec<_>>();
//! let bv = BitVector::from_positions(64, positions);
//!
//! let balanced = Hardener::balance(64, 42).harden(&bv);
//! assert_eq!(balanced.len(), 128);
//! assert_eq!(balanced.count_ones(), 64);
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`] with a
//! [`domain::BfAttackError`]. An empty alignment is not an error: it yields
//! an error row in the results and a successful run.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
