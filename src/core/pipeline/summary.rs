//! Result rows and run summary
//!
//! One [`ResultRow`] is produced per target count. When alignment yields no
//! pairs a single [`ErrorRow`] replaces them.

use crate::core::attack::GuessCounts;
use crate::core::reident::{ComponentSummary, ReidentificationScore, SuspicionStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// A row that can be written as CSV columns or as a JSON object
pub trait ResultRecord: Serialize {
    /// Column names, in output order
    fn header(&self) -> Vec<String>;

    /// Column values, matching [`ResultRecord::header`]
    fn values(&self) -> Vec<String>;
}

/// Parameters and measurements identifying one experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInfo {
    pub timestamp: DateTime<Utc>,
    pub q: usize,
    pub hash_type: String,
    /// Hash function count, `a/b/c` for per-attribute counts
    pub num_hash: String,
    pub bf_len: usize,
    pub encoding: String,
    pub padded: bool,
    pub hardening: String,
    pub min_freq: usize,
    pub build_name: String,
    pub analysis_name: String,
    pub build_attrs: Vec<String>,
    pub analysis_attrs: Vec<String>,
    pub build_records: usize,
    pub analysis_records: usize,
    pub load_secs: f64,
    pub encode_secs: f64,
    pub one_bits_mean: f64,
    pub one_bits_std: f64,
    pub memory_mb: u64,
}

impl RunInfo {
    fn header() -> Vec<String> {
        [
            "timestamp",
            "q",
            "hash_type",
            "num_hash_funct",
            "bf_len",
            "encode",
            "padded",
            "hardening",
            "min_freq",
            "build_data_set_name",
            "analysis_data_set_name",
            "build_attr_list",
            "analysis_attr_list",
            "build_num_rec",
            "analysis_num_rec",
            "load_time_sec",
            "encode_time_sec",
            "bf_one_bits_mean",
            "bf_one_bits_std",
            "memory_mb",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn values(&self) -> Vec<String> {
        vec![
            self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.q.to_string(),
            self.hash_type.clone(),
            self.num_hash.clone(),
            self.bf_len.to_string(),
            self.encoding.clone(),
            self.padded.to_string(),
            self.hardening.clone(),
            self.min_freq.to_string(),
            self.build_name.clone(),
            self.analysis_name.clone(),
            self.build_attrs.join(";"),
            self.analysis_attrs.join(";"),
            self.build_records.to_string(),
            self.analysis_records.to_string(),
            secs(self.load_secs),
            secs(self.encode_secs),
            format!("{:.2}", self.one_bits_mean),
            format!("{:.2}", self.one_bits_std),
            self.memory_mb.to_string(),
        ]
    }
}

/// Outcome of one target count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    #[serde(flatten)]
    pub run: RunInfo,
    pub num_freq_attr_vals: usize,
    pub aligned_pairs: usize,
    pub analysis_secs: f64,
    pub guesses: GuessCounts,
    pub suspicion: SuspicionStats,
    pub attribute: ComponentSummary,
    pub entity: ComponentSummary,
    pub reident_secs: f64,
}

impl ResultRow {
    pub fn new(
        run: RunInfo,
        num_freq_attr_vals: usize,
        aligned_pairs: usize,
        analysis_time: Duration,
        guesses: GuessCounts,
        score: &ReidentificationScore,
    ) -> Self {
        Self {
            run,
            num_freq_attr_vals,
            aligned_pairs,
            analysis_secs: analysis_time.as_secs_f64(),
            guesses,
            suspicion: score.suspicion,
            attribute: score.attribute,
            entity: score.entity,
            reident_secs: score.elapsed_secs,
        }
    }
}

impl ResultRecord for ResultRow {
    fn header(&self) -> Vec<String> {
        let mut header = RunInfo::header();
        header.extend(
            [
                "num_freq_attr_val",
                "num_aligned_pairs",
                "analysis_time_sec",
                "num_corr_1_guess",
                "num_corr_m_guess",
                "num_wrong_guess",
                "num_no_guess",
                "ps_max",
                "ps_min",
                "ps_avr",
                "ps_med",
                "ps_marketer",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        header.extend(self.attribute.columns().into_iter().map(|(l, _)| format!("attr-{l}")));
        header.extend(self.entity.columns().into_iter().map(|(l, _)| format!("ent-{l}")));
        header.push("reident_time_sec".to_string());
        header
    }

    fn values(&self) -> Vec<String> {
        let mut values = self.run.values();
        values.extend([
            self.num_freq_attr_vals.to_string(),
            self.aligned_pairs.to_string(),
            secs(self.analysis_secs),
            self.guesses.correct_unique.to_string(),
            self.guesses.correct_ambiguous.to_string(),
            self.guesses.wrong.to_string(),
            self.guesses.no_guess.to_string(),
            format!("{:.4}", self.suspicion.max),
            format!("{:.4}", self.suspicion.min),
            format!("{:.4}", self.suspicion.mean),
            format!("{:.4}", self.suspicion.median),
            self.suspicion.marketer.to_string(),
        ]);
        values.extend(self.attribute.columns().into_iter().map(|(_, c)| c.to_string()));
        values.extend(self.entity.columns().into_iter().map(|(_, c)| c.to_string()));
        values.push(secs(self.reident_secs));
        values
    }
}

/// Degenerate outcome when no pair survives alignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRow {
    #[serde(flatten)]
    pub run: RunInfo,
    pub num_freq_attr_vals: Vec<usize>,
    pub reason: String,
}

impl ResultRecord for ErrorRow {
    fn header(&self) -> Vec<String> {
        let mut header = RunInfo::header();
        header.push("num_freq_attr_val_list".to_string());
        header.push("reason".to_string());
        header
    }

    fn values(&self) -> Vec<String> {
        let mut values = self.run.values();
        values.push(
            self.num_freq_attr_vals
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(";"),
        );
        values.push(self.reason.clone());
        values
    }
}

fn secs(value: f64) -> String {
    format!("{value:.3}")
}

/// Summary of one attack run
#[derive(Debug, Clone, Default)]
pub struct AttackSummary {
    /// Records in the build dataset
    pub build_records: usize,

    /// Records in the analysis dataset
    pub analysis_records: usize,

    /// Pairs that survived frequency alignment
    pub aligned_pairs: usize,

    /// Result rows written
    pub rows: Vec<ResultRow>,

    /// Set when alignment produced no pairs
    pub error_row: Option<ErrorRow>,

    /// Duration of the run
    pub duration: Duration,
}

impl AttackSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the attack could be carried out at all
    pub fn is_degenerate(&self) -> bool {
        self.error_row.is_some()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            build_records = self.build_records,
            analysis_records = self.analysis_records,
            aligned_pairs = self.aligned_pairs,
            result_rows = self.rows.len(),
            duration_secs = format!("{:.2}", self.duration.as_secs_f64()),
            "Attack completed"
        );

        for row in &self.rows {
            tracing::info!(
                num_freq_attr_vals = row.num_freq_attr_vals,
                correct_unique = row.guesses.correct_unique,
                correct_ambiguous = row.guesses.correct_ambiguous,
                wrong = row.guesses.wrong,
                no_guess = row.guesses.no_guess,
                marketer = row.suspicion.marketer,
                "Target count result"
            );
        }

        if let Some(ref error) = self.error_row {
            tracing::warn!(reason = %error.reason, "No attack possible");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_info() -> RunInfo {
        RunInfo {
            timestamp: Utc::now(),
            q: 2,
            hash_type: "dh".to_string(),
            num_hash: "4".to_string(),
            bf_len: 20,
            encoding: "abf".to_string(),
            padded: false,
            hardening: "none".to_string(),
            min_freq: 2,
            build_name: "a".to_string(),
            analysis_name: "b".to_string(),
            build_attrs: vec!["last".to_string()],
            analysis_attrs: vec!["last".to_string()],
            build_records: 5,
            analysis_records: 5,
            load_secs: 0.1,
            encode_secs: 0.2,
            one_bits_mean: 7.5,
            one_bits_std: 0.5,
            memory_mb: 12,
        }
    }

    #[test]
    fn test_result_row_header_matches_values() {
        let row = ResultRow::new(
            run_info(),
            10,
            2,
            Duration::from_millis(5),
            GuessCounts::default(),
            &ReidentificationScore::default(),
        );
        let header = row.header();
        assert_eq!(header.len(), row.values().len());
        // 20 run columns, 12 attack columns, 2 x 17 scorer columns, timing
        assert_eq!(header.len(), 20 + 12 + 34 + 1);
        assert!(header.contains(&"attr-1-1-p".to_string()));
        assert!(header.contains(&"ent-wrng".to_string()));
    }

    #[test]
    fn test_error_row_header_matches_values() {
        let row = ErrorRow {
            run: run_info(),
            num_freq_attr_vals: vec![10, 20],
            reason: "no aligned pairs".to_string(),
        };
        let values = row.values();
        assert_eq!(row.header().len(), values.len());
        assert_eq!(values[values.len() - 2], "10;20");
    }

    #[test]
    fn test_result_row_serializes_flat_run_info() {
        let row = ResultRow::new(
            run_info(),
            10,
            2,
            Duration::ZERO,
            GuessCounts::default(),
            &ReidentificationScore::default(),
        );
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["q"], 2);
        assert_eq!(json["entity"]["m-m-w"], 0);
    }

    #[test]
    fn test_summary_degenerate() {
        let mut summary = AttackSummary::new().with_duration(Duration::from_secs(1));
        assert!(!summary.is_degenerate());
        summary.error_row = Some(ErrorRow {
            run: run_info(),
            num_freq_attr_vals: vec![1],
            reason: "x".to_string(),
        });
        assert!(summary.is_degenerate());
        summary.log_summary();
    }
}
