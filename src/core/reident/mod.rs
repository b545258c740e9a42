//! Graph-based re-identification scoring
//!
//! Components of the assignment graph are found with a [`UnionFind`] over
//! the combined encoded and plaintext node space.

pub mod scorer;
pub mod union_find;

pub use scorer::{
    classify_components, score, ComponentSummary, Correctness, ReidentificationScore, Shape,
    SuspicionStats,
};
pub use union_find::UnionFind;
