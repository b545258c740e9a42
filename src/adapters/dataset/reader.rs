//! Delimited dataset reader
//!
//! Reads plain or gzip-compressed delimited files into [`Record`]s together
//! with the lookup tables the attack needs.

use crate::config::DatasetConfig;
use crate::core::attack::FrequencyTable;
use crate::domain::record::normalise;
use crate::domain::{DatasetError, Record, RecordId, Result};
use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant};

/// Field value marking a withdrawn row
const REMOVED_MARKER: &str = "removed";

/// Field value marking a suppressed row
const CONFIDENTIAL_MARKER: &str = "confidential";

/// A dataset loaded into memory
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    /// File name without directories and extensions
    pub name: String,

    /// Names of the selected columns, from the header when present
    pub attr_names: Vec<String>,

    /// Kept records in file order
    pub records: Vec<Record>,

    /// Joined attribute value of each record
    pub id_to_value: HashMap<RecordId, String>,

    /// Record ids holding each joined value
    pub value_to_ids: HashMap<String, BTreeSet<RecordId>>,

    /// Occurrences of each joined value
    pub value_freqs: FrequencyTable<String>,

    /// Rows skipped for a `removed` field
    pub num_removed: usize,

    /// Rows skipped for a `confidential` field
    pub num_confidential: usize,

    pub load_time: Duration,
}

impl LoadedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, record: Record, value: String) {
        self.value_freqs.add(value.clone());
        self.value_to_ids
            .entry(value.clone())
            .or_default()
            .insert(record.id.clone());
        self.id_to_value.insert(record.id.clone(), value);
        self.records.push(record);
    }
}

/// Reader for one configured dataset
pub struct DatasetReader<'a> {
    config: &'a DatasetConfig,
}

impl<'a> DatasetReader<'a> {
    pub fn new(config: &'a DatasetConfig) -> Self {
        Self { config }
    }

    /// Loads the configured file
    ///
    /// `on_row` is called with the number of data rows read so far and may
    /// abort loading.
    ///
    /// # Errors
    ///
    /// Returns a data-format error when the file is missing, the separator
    /// is illegal, a row is too short or unparsable, or no record is kept.
    pub fn load(&self, on_row: impl FnMut(usize) -> Result<()>) -> Result<LoadedDataset> {
        let path = Path::new(&self.config.path);
        if !path.exists() {
            return Err(DatasetError::NotFound(self.config.path.clone()).into());
        }

        let file = File::open(path)?;
        let input: Box<dyn Read> = if self.config.path.ends_with("gz") {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        self.load_from(input, on_row)
    }

    /// Loads from any reader, treating it as the configured file
    pub fn load_from<R: Read>(
        &self,
        input: R,
        mut on_row: impl FnMut(usize) -> Result<()>,
    ) -> Result<LoadedDataset> {
        let started = Instant::now();
        let separator = self
            .config
            .separator()
            .map_err(DatasetError::IllegalSeparator)?;

        let mut reader = ReaderBuilder::new()
            .delimiter(separator)
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        let required = self
            .config
            .attributes
            .iter()
            .copied()
            .chain(std::iter::once(self.config.rec_id_col))
            .max()
            .unwrap_or(0);

        tracing::info!(
            path = %self.config.path,
            separator = %(separator as char).escape_default(),
            attributes = ?self.config.attributes,
            "Loading dataset"
        );

        let mut dataset = LoadedDataset {
            name: self.config.base_name(),
            attr_names: self.config.attributes.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        };

        let mut rows = 0usize;
        for (line, row) in reader.records().enumerate() {
            let row_num = line + 1;
            let row = row.map_err(|e| DatasetError::MalformedRow {
                row: row_num,
                message: e.to_string(),
            })?;

            if line == 0 && self.config.header {
                dataset.attr_names = self.header_names(&row);
                continue;
            }

            rows += 1;
            on_row(rows)?;

            if row.iter().any(|f| f == REMOVED_MARKER) {
                dataset.num_removed += 1;
                continue;
            }
            if row.iter().any(|f| f == CONFIDENTIAL_MARKER) {
                dataset.num_confidential += 1;
                continue;
            }

            if row.len() <= required {
                return Err(DatasetError::MissingColumn {
                    row: row_num,
                    found: row.len(),
                    required,
                }
                .into());
            }

            let id = RecordId::new(&row[self.config.rec_id_col]).map_err(|message| {
                DatasetError::MalformedRow {
                    row: row_num,
                    message,
                }
            })?;
            let record = Record::new(id, row.iter());
            let value = record.joined_value(&self.config.attributes);
            dataset.insert(record, value);
        }

        if dataset.is_empty() {
            return Err(DatasetError::Empty(self.config.path.clone()).into());
        }

        dataset.load_time = started.elapsed();
        tracing::info!(
            name = %dataset.name,
            records = dataset.len(),
            unique_values = dataset.value_freqs.len(),
            removed = dataset.num_removed,
            confidential = dataset.num_confidential,
            attr_names = ?dataset.attr_names,
            duration_ms = dataset.load_time.as_millis(),
            "Dataset loaded"
        );

        Ok(dataset)
    }

    fn header_names(&self, header: &StringRecord) -> Vec<String> {
        self.config
            .attributes
            .iter()
            .map(|&c| header.get(c).map(normalise).unwrap_or_else(|| c.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BfAttackError;

    fn config(attributes: Vec<usize>, header: bool) -> DatasetConfig {
        DatasetConfig {
            path: "data/ncvoter-a.csv.gz".to_string(),
            rec_id_col: 0,
            col_sep: ",".to_string(),
            header,
            attributes,
        }
    }

    fn load(config: &DatasetConfig, data: &str) -> Result<LoadedDataset> {
        DatasetReader::new(config).load_from(data.as_bytes(), |_| Ok(()))
    }

    #[test]
    fn test_load_builds_lookup_tables() {
        let cfg = config(vec![1, 2], true);
        let data = "id,First,Last\n\
                    a-1, Peter ,SMITH\n\
                    a-2,anna,jones\n\
                    a-3,peter,smith\n";
        let ds = load(&cfg, data).unwrap();

        assert_eq!(ds.name, "ncvoter-a");
        assert_eq!(ds.attr_names, vec!["first", "last"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.value_freqs.get(&"peter smith".to_string()), 2);

        let id = RecordId::new("1").unwrap();
        assert_eq!(ds.id_to_value[&id], "peter smith");
        assert_eq!(ds.value_to_ids["peter smith"].len(), 2);
    }

    #[test]
    fn test_marker_rows_are_counted_and_skipped() {
        let cfg = config(vec![1], false);
        let data = "1,smith\n2,removed\n3,confidential\n4,jones\n";
        let ds = load(&cfg, data).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.num_removed, 1);
        assert_eq!(ds.num_confidential, 1);
        assert_eq!(ds.attr_names, vec!["1"]);
    }

    #[test]
    fn test_markers_match_the_raw_field_only() {
        let cfg = config(vec![1], false);
        let data = "1,Removed\n2, confidential \n3,removed\n";
        let ds = load(&cfg, data).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.num_removed, 1);
        assert_eq!(ds.num_confidential, 0);
        // Kept rows are still normalised
        assert_eq!(ds.value_freqs.get(&"removed".to_string()), 1);
        assert_eq!(ds.value_freqs.get(&"confidential".to_string()), 1);
    }

    #[test]
    fn test_short_row_is_data_format_error() {
        let cfg = config(vec![2], false);
        let err = load(&cfg, "1,a,b\n2,c\n").unwrap_err();
        assert!(matches!(
            err,
            BfAttackError::DataFormat(DatasetError::MissingColumn { row: 2, .. })
        ));
    }

    #[test]
    fn test_tab_separator() {
        let mut cfg = config(vec![1], false);
        cfg.col_sep = "tab".to_string();
        let ds = load(&cfg, "1\tsmith\n2\tjones\n").unwrap();
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_header_only_is_empty() {
        let cfg = config(vec![1], true);
        let err = load(&cfg, "id,name\n").unwrap_err();
        assert!(matches!(err, BfAttackError::DataFormat(DatasetError::Empty(_))));
    }

    #[test]
    fn test_missing_file() {
        let mut cfg = config(vec![1], false);
        cfg.path = "/nonexistent/file.csv".to_string();
        let err = DatasetReader::new(&cfg).load(|_| Ok(())).unwrap_err();
        assert!(matches!(err, BfAttackError::DataFormat(DatasetError::NotFound(_))));
    }

    #[test]
    fn test_row_callback_can_abort() {
        let cfg = config(vec![1], false);
        let result = DatasetReader::new(&cfg).load_from("1,a\n2,b\n".as_bytes(), |n| {
            if n == 2 {
                Err(BfAttackError::Shutdown("stop".to_string()))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(BfAttackError::Shutdown(_))));
    }
}
