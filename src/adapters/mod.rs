//! Boundary adapters
//!
//! The attack core consumes loaded records and produces result rows. The
//! adapters here own all file I/O around it:
//!
//! - [`dataset`] - Delimited (optionally gzip-compressed) dataset loading
//! - [`results`] - Appending result rows as CSV or JSON Lines

pub mod dataset;
pub mod results;
