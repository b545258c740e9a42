//! Domain models and types.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RecordId`])
//! - **Data model** ([`Record`], [`BitVector`], q-gram [`TokenSet`]s)
//! - **Error types** ([`BfAttackError`], [`DatasetError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BfAttackError>`]:
//!
//! ```rust,no_run
//! use bfattack::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = bfattack::config::load_config("bfattack.toml")?;
//!     Ok(())
//! }
//! ```

pub mod bitvector;
pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use bitvector::BitVector;
pub use errors::{BfAttackError, DatasetError};
pub use ids::RecordId;
pub use record::{qgrams, Record, TokenSet};
pub use result::Result;
