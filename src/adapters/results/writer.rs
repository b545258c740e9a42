//! Results file writer
//!
//! Rows are appended to a file named after the two datasets and the date.
//! CSV files get a header only when they are created.

use crate::config::OutputFormat;
use crate::core::pipeline::ResultRecord;
use crate::domain::{BfAttackError, Result};
use chrono::{NaiveDate, Utc};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Which result file a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Per target-count attack results
    Attack,
    /// Runs where alignment yielded no pairs
    Error,
}

impl ResultKind {
    fn suffix(self) -> &'static str {
        match self {
            ResultKind::Attack => "ent-attr",
            ResultKind::Error => "error",
        }
    }
}

/// Appends result rows to per-experiment files
#[derive(Debug, Clone)]
pub struct ResultsWriter {
    directory: PathBuf,
    format: OutputFormat,
    build_name: String,
    analysis_name: String,
    date: NaiveDate,
}

impl ResultsWriter {
    pub fn new(
        directory: impl AsRef<Path>,
        format: OutputFormat,
        build_name: &str,
        analysis_name: &str,
    ) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            format,
            build_name: build_name.to_string(),
            analysis_name: analysis_name.to_string(),
            date: Utc::now().date_naive(),
        }
    }

    /// Fixes the date used in file names
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Path rows of `kind` are appended to
    pub fn path(&self, kind: ResultKind) -> PathBuf {
        let extension = match self.format {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "jsonl",
        };
        self.directory.join(format!(
            "bf-attack-results-{}-{}-{}-{}.{}",
            self.build_name,
            self.analysis_name,
            self.date.format("%Y%m%d"),
            kind.suffix(),
            extension
        ))
    }

    /// Appends one row, creating the directory and file as needed
    pub fn append<R: ResultRecord>(&self, kind: ResultKind, row: &R) -> Result<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            BfAttackError::Io(format!(
                "Failed to create results directory {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        let path = self.path(kind);
        let is_new = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        match self.format {
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(file);
                if is_new {
                    writer.write_record(row.header())?;
                }
                writer.write_record(row.values())?;
                writer.flush()?;
            }
            OutputFormat::Json => {
                let mut writer = BufWriter::new(file);
                serde_json::to_writer(&mut writer, row)?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
        }

        tracing::debug!(path = %path.display(), new_file = is_new, "Result row written");
        Ok(path)
    }
}
