//! Bloom filter encoding
//!
//! - [`ResolvedEncoding`] - run parameters with automatic values derived
//! - [`Encoder`] - attribute, long-term key, record-level and keyed
//!   long-term key encodings

pub mod encoder;
pub mod resolved;

pub use encoder::{Encoder, EncoderKind};
pub use resolved::ResolvedEncoding;
