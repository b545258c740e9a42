//! Dataset ingestion

pub mod reader;

pub use reader::{DatasetReader, LoadedDataset};
