//! Attack coordinator - main orchestrator of one experiment
//!
//! This module runs the full pipeline: load both datasets, encode and harden
//! the build records, align frequencies, then analyse, reconstruct and score
//! once per configured target count, writing one result row each.

use super::memory::MemoryGuard;
use super::progress::{Checkpoint, ShutdownFlag};
use super::summary::{AttackSummary, ErrorRow, ResultRow, RunInfo};
use crate::adapters::dataset::{DatasetReader, LoadedDataset};
use crate::adapters::results::{ResultKind, ResultsWriter};
use crate::config::BfAttackConfig;
use crate::core::attack::{align, analyze, reconstruct, FrequencyTable, ReconstructionInput};
use crate::core::encoding::{Encoder, ResolvedEncoding};
use crate::core::hardening::{Hardener, MarkovChain};
use crate::core::reident::score;
use crate::domain::{BitVector, RecordId, Result};
use crate::log_stage_complete;
use chrono::Utc;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Encoded build dataset
#[derive(Debug, Clone, Default)]
pub struct EncodedDataset {
    /// Hardened bit vector per record id
    pub vectors: BTreeMap<RecordId, BitVector>,

    /// Length of the hardened vectors
    pub bf_len: usize,

    pub one_bits_mean: f64,
    pub one_bits_std: f64,
    pub encode_time: Duration,
}

impl EncodedDataset {
    /// Occurrences of each distinct vector
    pub fn frequencies(&self) -> FrequencyTable<BitVector> {
        self.vectors.values().cloned().collect()
    }
}

/// Attack coordinator
pub struct AttackCoordinator {
    config: BfAttackConfig,
    shutdown: ShutdownFlag,
}

impl AttackCoordinator {
    pub fn new(config: BfAttackConfig, shutdown: ShutdownFlag) -> Self {
        Self { config, shutdown }
    }

    fn checkpoint(&self, stage: &'static str) -> Checkpoint {
        Checkpoint::new(
            stage,
            self.config.application.progress_interval,
            MemoryGuard::new(self.config.application.max_memory_mb),
            self.shutdown.clone(),
        )
    }

    /// Execute the attack
    ///
    /// This is the main entry point of a run. It:
    /// 1. Loads the build and analysis datasets
    /// 2. Resolves derived encoding parameters and the run seed
    /// 3. Encodes and hardens every build record
    /// 4. Aligns bit vector and value frequencies
    /// 5. For each target count:
    ///    - Truncates the aligned pairs
    ///    - Analyses bit positions
    ///    - Reconstructs the most frequent values
    ///    - Scores re-identification and writes a result row
    ///
    /// An empty alignment writes an error row instead and still succeeds.
    pub fn execute_attack(&self) -> Result<AttackSummary> {
        let start_time = Instant::now();
        let mut summary = AttackSummary::new();

        tracing::info!("Starting attack");

        let (build, analysis) = self.load_datasets()?;
        summary.build_records = build.len();
        summary.analysis_records = analysis.len();

        let seed = self.run_seed();
        let resolved = ResolvedEncoding::resolve(
            &self.config.encoding,
            &self.config.build.attributes,
            &build.records,
        )?;
        let encoded = self.encode(&build, &resolved, seed)?;

        let writer = ResultsWriter::new(
            &self.config.output.directory,
            self.config.output.format,
            &build.name,
            &analysis.name,
        );
        let run_info = || RunInfo {
            timestamp: Utc::now(),
            q: resolved.q,
            hash_type: resolved.hash_type.as_str().to_string(),
            num_hash: resolved.num_hash_label(),
            bf_len: resolved.bf_len,
            encoding: resolved.method.as_str().to_string(),
            padded: resolved.padded,
            hardening: self.config.hardening.method.as_str().to_string(),
            min_freq: self.config.attack.min_freq,
            build_name: build.name.clone(),
            analysis_name: analysis.name.clone(),
            build_attrs: build.attr_names.clone(),
            analysis_attrs: analysis.attr_names.clone(),
            build_records: build.len(),
            analysis_records: analysis.len(),
            load_secs: (build.load_time + analysis.load_time).as_secs_f64(),
            encode_secs: encoded.encode_time.as_secs_f64(),
            one_bits_mean: encoded.one_bits_mean,
            one_bits_std: encoded.one_bits_std,
            memory_mb: MemoryGuard::resident_mb().unwrap_or(0),
        };

        let mut pairs = align(
            &encoded.frequencies(),
            &analysis.value_freqs,
            self.config.attack.min_freq,
        );
        summary.aligned_pairs = pairs.len();

        if pairs.is_empty() {
            tracing::warn!(
                min_freq = self.config.attack.min_freq,
                "No frequent bit vector could be aligned with a plaintext value"
            );
            let row = ErrorRow {
                run: run_info(),
                num_freq_attr_vals: self.config.attack.num_freq_attr_vals.clone(),
                reason: "no aligned pairs".to_string(),
            };
            let path = writer.append(ResultKind::Error, &row)?;
            tracing::info!(path = %path.display(), "Error row written");
            summary.error_row = Some(row);
            let summary = summary.with_duration(start_time.elapsed());
            summary.log_summary();
            return Ok(summary);
        }

        for &num_freq in &self.config.attack.num_freq_attr_vals {
            // Truncation carries over to later target counts.
            pairs.truncate(num_freq);

            let analysis_start = Instant::now();
            let position_map = analyze(&pairs, encoded.bf_len, resolved.q);
            let targets = analysis.value_freqs.most_frequent(num_freq);

            let checkpoint = self.checkpoint("reconstruct");
            let reconstruction = reconstruct(
                &ReconstructionInput {
                    targets: &targets,
                    encoded: &encoded.vectors,
                    true_values: &build.id_to_value,
                    value_to_ids: &analysis.value_to_ids,
                },
                &position_map,
                |visited| checkpoint.tick(visited),
            )?;
            let analysis_time = analysis_start.elapsed();

            let scores = score(&reconstruction.edges, analysis.len());
            let row = ResultRow::new(
                run_info(),
                num_freq,
                pairs.len(),
                analysis_time,
                reconstruction.counts,
                &scores,
            );
            let path = writer.append(ResultKind::Attack, &row)?;
            tracing::info!(
                num_freq_attr_vals = num_freq,
                aligned_pairs = pairs.len(),
                path = %path.display(),
                "Result row written"
            );
            summary.rows.push(row);
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Loads the build dataset and, when configured separately, the analysis
    /// dataset
    pub fn load_datasets(&self) -> Result<(LoadedDataset, LoadedDataset)> {
        let checkpoint = self.checkpoint("load");
        let build = DatasetReader::new(&self.config.build).load(|n| checkpoint.tick(n))?;

        let analysis = match self.config.analysis {
            Some(ref analysis_config) => {
                let checkpoint = checkpoint.stage("load");
                DatasetReader::new(analysis_config).load(|n| checkpoint.tick(n))?
            }
            None => build.clone(),
        };

        if build.attr_names != analysis.attr_names {
            tracing::warn!(
                build = ?build.attr_names,
                analysis = ?analysis.attr_names,
                "Build and analysis attribute names differ"
            );
        }

        Ok((build, analysis))
    }

    /// Configured seed, otherwise one drawn for this run
    fn run_seed(&self) -> u64 {
        match self.config.application.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random();
                tracing::info!(seed, "No seed configured, drew run seed");
                seed
            }
        }
    }

    /// Encodes and hardens every build record
    ///
    /// Records are processed in parallel, one chunk of `progress_interval`
    /// records at a time, with a checkpoint after each chunk.
    pub fn encode(
        &self,
        build: &LoadedDataset,
        resolved: &ResolvedEncoding,
        seed: u64,
    ) -> Result<EncodedDataset> {
        let started = Instant::now();
        let encoder = Encoder::new(resolved, seed);
        let hardener = Hardener::from_config(&self.config.hardening, encoder.bf_len(), seed, || {
            let chain = MarkovChain::train_records(
                &build.records,
                &encoder.columns(),
                resolved.q,
                resolved.padded,
            );
            tracing::info!(tokens = chain.len(), "Markov chain trained");
            chain
        });

        tracing::info!(
            encoding = resolved.method.as_str(),
            hardening = hardener.method().as_str(),
            bf_len = encoder.bf_len(),
            hardened_len = hardener.output_len(encoder.bf_len()),
            records = build.len(),
            "Encoding build dataset"
        );

        let checkpoint = self.checkpoint("encode");
        let mut vectors = BTreeMap::new();
        let mut processed = 0usize;
        for chunk in build.records.chunks(checkpoint.interval()) {
            let encoded: Vec<(RecordId, BitVector)> = chunk
                .par_iter()
                .map(|record| -> Result<(RecordId, BitVector)> {
                    let tokens = hardener.harden_tokens(record.id.as_str(), encoder.tokens(record))?;
                    let bv = hardener.harden(&encoder.encode_tokens(&tokens));
                    Ok((record.id.clone(), bv))
                })
                .collect::<Result<_>>()?;
            vectors.extend(encoded);

            processed += chunk.len();
            checkpoint.tick(processed)?;
        }

        let (one_bits_mean, one_bits_std) = mean_std(vectors.values().map(BitVector::count_ones));
        let encode_time = started.elapsed();
        log_stage_complete!("encode", vectors.len(), encode_time);
        tracing::info!(
            one_bits_mean = format!("{one_bits_mean:.2}"),
            one_bits_std = format!("{one_bits_std:.2}"),
            "Bit vector statistics"
        );

        Ok(EncodedDataset {
            vectors,
            bf_len: hardener.output_len(encoder.bf_len()),
            one_bits_mean,
            one_bits_std,
            encode_time,
        })
    }
}

/// Population mean and standard deviation
fn mean_std(values: impl Iterator<Item = usize>) -> (f64, f64) {
    let values: Vec<f64> = values.map(|v| v as f64).collect();
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
