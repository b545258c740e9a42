//! Run command implementation
//!
//! This module implements the `run` command, which executes one attack
//! experiment over every configured target count.

use crate::config::{load_config, BfAttackConfig, HardeningMethod};
use crate::core::pipeline::{AttackCoordinator, ShutdownFlag};
use crate::domain::BfAttackError;
use crate::log_error_with_context;
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Override the q-gram length
    #[arg(long)]
    pub q: Option<usize>,

    /// Override the bit vector length
    #[arg(long)]
    pub bf_len: Option<usize>,

    /// Override the hardening method
    #[arg(long)]
    pub hardening: Option<HardeningMethod>,

    /// Override the run seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the minimum alignment frequency
    #[arg(long)]
    pub min_freq: Option<usize>,

    /// Override the target counts (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub num_freq: Option<Vec<usize>>,
}

impl RunArgs {
    /// Apply CLI overrides to a loaded configuration
    pub fn apply_overrides(&self, config: &mut BfAttackConfig) {
        if let Some(q) = self.q {
            tracing::info!(q, "Overriding q from CLI");
            config.encoding.q = q;
        }
        if let Some(bf_len) = self.bf_len {
            tracing::info!(bf_len, "Overriding bf_len from CLI");
            config.encoding.bf_len = bf_len;
        }
        if let Some(method) = self.hardening {
            tracing::info!(hardening = %method, "Overriding hardening from CLI");
            config.hardening.method = method;
        }
        if let Some(seed) = self.seed {
            tracing::info!(seed, "Overriding seed from CLI");
            config.application.seed = Some(seed);
        }
        if let Some(min_freq) = self.min_freq {
            tracing::info!(min_freq, "Overriding min_freq from CLI");
            config.attack.min_freq = min_freq;
        }
        if let Some(ref num_freq) = self.num_freq {
            tracing::info!(num_freq = ?num_freq, "Overriding target counts from CLI");
            config.attack.num_freq_attr_vals = num_freq.clone();
        }
    }

    /// Execute the run command
    pub async fn execute(&self, config_path: &str, shutdown: ShutdownFlag) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(e.exit_code());
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        println!("🚀 Starting attack...");
        println!(
            "  Encoding: {} ({}, q={}, bf_len={})",
            config.encoding.method,
            config.encoding.hash_type,
            config.encoding.q,
            config.encoding.bf_len
        );
        println!("  Hardening: {}", config.hardening.method);
        println!("  Target counts: {:?}", config.attack.num_freq_attr_vals);
        println!();

        let output_dir = config.output.directory.clone();
        let coordinator = AttackCoordinator::new(config, shutdown);
        let result = tokio::task::spawn_blocking(move || coordinator.execute_attack()).await?;

        let summary = match result {
            Ok(s) => s,
            Err(e) => {
                log_error_with_context!(&e, "Attack failed");
                eprintln!("Attack failed: {e}");
                if matches!(e, BfAttackError::Shutdown(_)) {
                    println!("⚠️  Run cancelled, no results written for the remaining target counts");
                }
                return Ok(e.exit_code());
            }
        };

        println!();
        println!("📊 Attack Summary:");
        println!("  Build records: {}", summary.build_records);
        println!("  Analysis records: {}", summary.analysis_records);
        println!("  Aligned pairs: {}", summary.aligned_pairs);
        if summary.is_degenerate() {
            println!("  No attack possible: no bit vector could be aligned");
        }
        for row in &summary.rows {
            println!(
                "  N={:<6} correct unique {:<5} ambiguous {:<5} wrong {:<5} no guess {:<5} marketer {}",
                row.num_freq_attr_vals,
                row.guesses.correct_unique,
                row.guesses.correct_ambiguous,
                row.guesses.wrong,
                row.guesses.no_guess,
                row.suspicion.marketer
            );
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!("  Results directory: {output_dir}");
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BfAttackConfig, DatasetConfig, EncodingConfig};

    fn config() -> BfAttackConfig {
        BfAttackConfig {
            application: Default::default(),
            build: DatasetConfig {
                path: "data/a.csv".to_string(),
                rec_id_col: 0,
                col_sep: ",".to_string(),
                header: true,
                attributes: vec![1],
            },
            analysis: None,
            encoding: EncodingConfig::default(),
            hardening: Default::default(),
            attack: Default::default(),
            output: Default::default(),
            logging: Default::default(),
        }
    }

    #[test]
    fn test_apply_overrides() {
        let args = RunArgs {
            q: Some(3),
            bf_len: Some(64),
            hardening: Some(HardeningMethod::Fold),
            seed: Some(9),
            min_freq: Some(4),
            num_freq: Some(vec![5, 10]),
        };
        let mut cfg = config();
        args.apply_overrides(&mut cfg);
        assert_eq!(cfg.encoding.q, 3);
        assert_eq!(cfg.encoding.bf_len, 64);
        assert_eq!(cfg.hardening.method, HardeningMethod::Fold);
        assert_eq!(cfg.application.seed, Some(9));
        assert_eq!(cfg.attack.min_freq, 4);
        assert_eq!(cfg.attack.num_freq_attr_vals, vec![5, 10]);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut cfg = config();
        RunArgs::default().apply_overrides(&mut cfg);
        assert_eq!(cfg.encoding.q, EncodingConfig::default().q);
        assert_eq!(cfg.application.seed, None);
    }
}
