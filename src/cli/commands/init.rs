//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "bfattack.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing bfattack configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [build] and [analysis] at your datasets");
                println!("  2. Choose the encoding and hardening to evaluate");
                println!("  3. Validate configuration: bfattack validate-config");
                println!("  4. Run the attack: bfattack run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# bfattack configuration file
# Frequency attack on Bloom filter encodings

[application]
log_level = "info"
max_memory_mb = 16000

[build]
path = "data/ncvoter-a.csv.gz"
rec_id_col = 0
col_sep = ","
header = true
attributes = [3]

[analysis]
path = "data/ncvoter-b.csv.gz"
rec_id_col = 0
col_sep = ","
header = true
attributes = [3]

[encoding]
q = 2
hash_type = "dh"
num_hash_functions = "opt"
bf_len = 1000
method = "abf"
padded = false

[hardening]
method = "none"

[attack]
min_freq = 100
num_freq_attr_vals = [10, 20, 50]

[output]
directory = "results"
format = "csv"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# bfattack configuration file
#
# One file describes one experiment: which datasets to read, how the build
# dataset is encoded and hardened, and which target counts to attack.
#
# Values of the form ${VAR} are replaced from the environment, and any key
# can be overridden with BFATTACK_<SECTION>_<KEY>.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Records between progress messages, memory and shutdown checks
progress_interval = 100000

# Resident memory ceiling in MB; exceeding it aborts the run
max_memory_mb = 16000

# Seed for all randomised steps; drawn once per run when omitted
# seed = 42

# ============================================================================
# Datasets
# ============================================================================
# Dataset the encoded bit vectors are built from
[build]
path = "data/ncvoter-a.csv.gz"   # .gz files are decompressed
rec_id_col = 0
col_sep = ","                    # single character, "tab", or "\"|\""
header = true
attributes = [3]                 # column indices of the encoded attributes

# Dataset plaintext frequencies are taken from (defaults to [build])
[analysis]
path = "data/ncvoter-b.csv.gz"
rec_id_col = 0
col_sep = ","
header = true
attributes = [3]

# ============================================================================
# Encoding
# ============================================================================
[encoding]
# q-gram length
q = 2

# Hashing: dh (double), edh (enhanced double), th (triple), rh (random)
hash_type = "dh"

# Hash function count, or "opt" to fill about half of the bits
num_hash_functions = "opt"

# Bit vector length
bf_len = 1000

# Encoding: abf (one attribute), clk (long-term key),
#           rbf (record-level), clkrbf (long-term key, k per attribute)
method = "abf"

# Pad values with q-1 sentinel characters on both sides
padded = false

# Optional key prefixed to every token before hashing
# secret_key = "${BFATTACK_SECRET_KEY}"

# Record-level encoding: attribute filter sizing and share of bits
# [encoding.rbf]
# abf_len_type = "dynamic"       # static | dynamic
# bit_percentages = [0.5, 0.5]

# Keyed long-term key: hash function count per attribute
# [encoding.clkrbf]
# num_hash_functions = [10, 20]

# ============================================================================
# Hardening
# ============================================================================
[hardening]
# none | balance | fold | rule90 | wxor | resample | mchain
method = "none"

# Explicit seed for the balancing permutation
# balance_seed = 7

# Seed string for resampling
resample_seed = "samplebf76"

# Window size for windowed XOR
window_size = 2

[hardening.markov]
# Synthetic tokens added per real token
chain_len = 2

# freq (most probable successors) | prob (weighted draws)
selection = "freq"

# ============================================================================
# Attack
# ============================================================================
[attack]
# Bit vectors and values rarer than this are not aligned
min_freq = 100

# Numbers of most frequent values to reconstruct, one result row each
num_freq_attr_vals = [10, 20, 50]

# ============================================================================
# Output
# ============================================================================
[output]
directory = "results"

# csv | json (one JSON object per line)
format = "csv"

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON logs to a rotating file as well as the console
local_enabled = false
local_path = "logs"

# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BfAttackConfig;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "bfattack.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "bfattack.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config_is_valid() {
        let config: BfAttackConfig = toml::from_str(&InitArgs::generate_minimal_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.attack.num_freq_attr_vals, vec![10, 20, 50]);
    }

    #[test]
    fn test_generate_config_with_examples_is_valid() {
        let content = InitArgs::generate_config_with_examples();
        assert!(content.contains("num_freq_attr_vals"));
        let config: BfAttackConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.hardening.markov.chain_len, 2);
    }
}
