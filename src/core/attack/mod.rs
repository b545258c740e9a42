//! Frequency attack on encoded bit vectors
//!
//! The attack runs in three stages:
//!
//! 1. [`frequency::align`] pairs the most frequent bit vectors with the most
//!    frequent plaintext values while both rankings are free of ties.
//! 2. [`positions::analyze`] derives, per bit position, the q-grams that may
//!    be hashed to it.
//! 3. [`reconstruct::reconstruct`] narrows the most frequent values down to
//!    the ones consistent with each encoded record and emits assignment edges.

pub mod frequency;
pub mod positions;
pub mod reconstruct;

pub use frequency::{align, AlignedPair, FrequencyTable};
pub use positions::{analyze, PositionCandidateMap, PositionStats};
pub use reconstruct::{
    reconstruct, AssignmentEdge, GuessCounts, GuessOutcome, Reconstruction, ReconstructionInput,
};
