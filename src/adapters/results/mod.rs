//! Result file output

pub mod writer;

pub use writer::{ResultKind, ResultsWriter};
