//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! a configuration file without reading any dataset.

use crate::config::{load_config, BfAttackConfig, EncodingMethod};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        println!("✅ Configuration is valid");
        println!();
        for line in Self::summary_lines(&config) {
            println!("  {line}");
        }
        println!();
        Ok(0)
    }

    fn summary_lines(config: &BfAttackConfig) -> Vec<String> {
        let mut lines = vec![
            "Configuration Summary:".to_string(),
            format!("Log Level: {}", config.application.log_level),
            format!(
                "Seed: {}",
                config
                    .application
                    .seed
                    .map_or_else(|| "drawn per run".to_string(), |s| s.to_string())
            ),
            format!(
                "Build Dataset: {} (attributes {:?})",
                config.build.path, config.build.attributes
            ),
            format!(
                "Analysis Dataset: {} (attributes {:?})",
                config.analysis_dataset().path,
                config.analysis_dataset().attributes
            ),
            format!(
                "Encoding: {} / {} (q={}, k={}, bf_len={}, padded={})",
                config.encoding.method,
                config.encoding.hash_type.description(),
                config.encoding.q,
                config.encoding.num_hash_functions,
                config.encoding.bf_len,
                config.encoding.padded
            ),
        ];
        match config.encoding.method {
            EncodingMethod::Rbf => lines.push(format!(
                "Record-level Sizing: {:?}, bit percentages {:?}",
                config.encoding.rbf.abf_len_type, config.encoding.rbf.bit_percentages
            )),
            EncodingMethod::ClkRbf => lines.push(format!(
                "Per-attribute Hash Functions: {:?}",
                config.encoding.clkrbf.num_hash_functions
            )),
            _ => {}
        }
        lines.push(format!("Hardening: {}", config.hardening.method));
        lines.push(format!("Minimum Frequency: {}", config.attack.min_freq));
        lines.push(format!(
            "Target Counts: {:?}",
            config.attack.num_freq_attr_vals
        ));
        lines.push(format!(
            "Results: {} ({:?})",
            config.output.directory, config.output.format
        ));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines() {
        let config: BfAttackConfig = toml::from_str(
            r#"
[build]
path = "a.csv"
attributes = [1, 2]

[encoding]
method = "clkrbf"
clkrbf = { num_hash_functions = [5, 10] }
"#,
        )
        .unwrap();
        let lines = ValidateArgs::summary_lines(&config);
        assert!(lines.iter().any(|l| l.contains("[5, 10]")));
        assert!(lines.iter().any(|l| l.contains("drawn per run")));
        assert!(lines.iter().any(|l| l.starts_with("Analysis Dataset: a.csv")));
    }
}
