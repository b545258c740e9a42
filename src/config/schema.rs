//! Configuration schema types
//!
//! This module defines the configuration structure of one attack experiment.
//! Every field maps onto the TOML file; derived values (automatic hash
//! function count, dynamic ABF lengths) are not stored here but resolved once
//! during setup, see [`crate::core::encoding::ResolvedEncoding`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bit-position hashing construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashType {
    /// Double hashing
    #[serde(rename = "dh", alias = "double")]
    Double,
    /// Enhanced double hashing
    #[serde(rename = "edh", alias = "enhanced-double")]
    EnhancedDouble,
    /// Triple hashing
    #[serde(rename = "th", alias = "triple")]
    Triple,
    /// Random hashing
    #[serde(rename = "rh", alias = "random")]
    Random,
}

impl HashType {
    /// Short configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            HashType::Double => "dh",
            HashType::EnhancedDouble => "edh",
            HashType::Triple => "th",
            HashType::Random => "rh",
        }
    }

    /// Human readable name
    pub fn description(&self) -> &'static str {
        match self {
            HashType::Double => "Double hashing",
            HashType::EnhancedDouble => "Enhanced double hashing",
            HashType::Triple => "Triple hashing",
            HashType::Random => "Random hashing",
        }
    }
}

impl FromStr for HashType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dh" | "double" => Ok(HashType::Double),
            "edh" | "enhanced-double" => Ok(HashType::EnhancedDouble),
            "th" | "triple" => Ok(HashType::Triple),
            "rh" | "random" => Ok(HashType::Random),
            _ => Err(format!(
                "Invalid hash type '{s}'. Must be one of: dh, edh, th, rh"
            )),
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker for the automatic hash-function count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoFill {
    /// Fill on average 50% of the bits
    #[serde(rename = "opt")]
    Opt,
}

/// Number of hash functions: a fixed count or `"opt"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HashFunctionCount {
    /// Fixed positive count
    Fixed(usize),
    /// Derived from the build dataset so that about half the bits are set
    Auto(AutoFill),
}

impl Default for HashFunctionCount {
    fn default() -> Self {
        HashFunctionCount::Fixed(default_num_hash_functions())
    }
}

impl FromStr for HashFunctionCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("opt") {
            return Ok(HashFunctionCount::Auto(AutoFill::Opt));
        }
        s.parse::<usize>()
            .map(HashFunctionCount::Fixed)
            .map_err(|_| format!("Invalid hash function count '{s}'. Use a positive integer or 'opt'"))
    }
}

impl fmt::Display for HashFunctionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashFunctionCount::Fixed(k) => write!(f, "{k}"),
            HashFunctionCount::Auto(_) => f.write_str("opt"),
        }
    }
}

/// Attribute-to-bit-vector encoding method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMethod {
    /// Attribute-level Bloom filter (one attribute)
    Abf,
    /// Cryptographic long-term key (all attributes OR-ed into one filter)
    Clk,
    /// Record-level Bloom filter (weighted sampling from per-attribute filters)
    Rbf,
    /// Long-term key with a per-attribute hash function count
    ClkRbf,
}

impl EncodingMethod {
    /// Short configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingMethod::Abf => "abf",
            EncodingMethod::Clk => "clk",
            EncodingMethod::Rbf => "rbf",
            EncodingMethod::ClkRbf => "clkrbf",
        }
    }
}

impl FromStr for EncodingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abf" | "attribute" => Ok(EncodingMethod::Abf),
            "clk" | "long-term-key" => Ok(EncodingMethod::Clk),
            "rbf" | "record-weighted" => Ok(EncodingMethod::Rbf),
            "clkrbf" | "keyed-long-term-key" => Ok(EncodingMethod::ClkRbf),
            _ => Err(format!(
                "Invalid encoding method '{s}'. Must be one of: abf, clk, rbf, clkrbf"
            )),
        }
    }
}

impl fmt::Display for EncodingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardening applied to encoded bit vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HardeningMethod {
    /// No hardening
    #[default]
    None,
    /// Append complement and permute
    Balance,
    /// XOR-fold the two halves
    Fold,
    /// One generation of the rule-90 cellular automaton
    Rule90,
    /// Windowed XOR
    Wxor,
    /// Seeded resampling
    Resample,
    /// Markov-chain token augmentation before encoding
    Mchain,
}

impl HardeningMethod {
    /// Short configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            HardeningMethod::None => "none",
            HardeningMethod::Balance => "balance",
            HardeningMethod::Fold => "fold",
            HardeningMethod::Rule90 => "rule90",
            HardeningMethod::Wxor => "wxor",
            HardeningMethod::Resample => "resample",
            HardeningMethod::Mchain => "mchain",
        }
    }
}

impl FromStr for HardeningMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(HardeningMethod::None),
            "balance" => Ok(HardeningMethod::Balance),
            "fold" => Ok(HardeningMethod::Fold),
            "rule90" => Ok(HardeningMethod::Rule90),
            "wxor" | "windowed-xor" => Ok(HardeningMethod::Wxor),
            "resample" => Ok(HardeningMethod::Resample),
            "mchain" | "markov-chain" => Ok(HardeningMethod::Mchain),
            _ => Err(format!(
                "Invalid hardening method '{s}'. Must be one of: none, balance, fold, rule90, wxor, resample, mchain"
            )),
        }
    }
}

impl fmt::Display for HardeningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How per-attribute filter lengths are chosen for record-level encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AbfLenType {
    /// Every attribute filter has the configured `bf_len`
    #[default]
    Static,
    /// Length derived from the attribute's average q-gram count
    Dynamic,
}

/// Token selection for Markov-chain hardening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChainSelection {
    /// Most probable transitions
    #[default]
    Freq,
    /// Weighted random draws
    Prob,
}

/// Results file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma separated with a header row
    #[default]
    Csv,
    /// One JSON object per line
    Json,
}

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BfAttackConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Dataset the encoded bit vectors are built from
    pub build: DatasetConfig,

    /// Dataset plaintext frequencies are taken from (defaults to `build`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<DatasetConfig>,

    /// Encoding parameters
    pub encoding: EncodingConfig,

    /// Hardening parameters
    #[serde(default)]
    pub hardening: HardeningConfig,

    /// Attack parameters
    #[serde(default)]
    pub attack: AttackConfig,

    /// Results output
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BfAttackConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first contradictory or invalid value
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.build.validate("build")?;
        if let Some(ref analysis) = self.analysis {
            analysis.validate("analysis")?;
        }
        self.encoding.validate(self.build.attributes.len())?;
        self.hardening.validate(self.encoding.bf_len)?;
        self.attack.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// The analysis dataset, falling back to the build dataset
    pub fn analysis_dataset(&self) -> &DatasetConfig {
        self.analysis.as_ref().unwrap_or(&self.build)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Records between progress messages and memory checks
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Resident memory ceiling in megabytes
    #[serde(default = "default_max_memory_mb")]
    pub max_memory_mb: u64,

    /// Run seed for every randomised step; drawn once per run when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.progress_interval == 0 {
            return Err("application.progress_interval must be > 0".to_string());
        }

        if self.max_memory_mb == 0 {
            return Err("application.max_memory_mb must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            progress_interval: default_progress_interval(),
            max_memory_mb: default_max_memory_mb(),
            seed: None,
        }
    }
}

/// Delimited input dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the file (`.gz` is decompressed)
    pub path: String,

    /// Column holding the record identifier
    #[serde(default)]
    pub rec_id_col: usize,

    /// Column separator: a single character, `tab`, or a quoted character
    #[serde(default = "default_col_sep")]
    pub col_sep: String,

    /// Whether the first line holds column names
    #[serde(default = "default_true")]
    pub header: bool,

    /// Columns whose values are encoded / guessed
    pub attributes: Vec<usize>,
}

impl DatasetConfig {
    fn validate(&self, section: &str) -> Result<(), String> {
        if self.path.is_empty() {
            return Err(format!("{section}.path cannot be empty"));
        }
        if self.attributes.is_empty() {
            return Err(format!("{section}.attributes cannot be empty"));
        }
        parse_col_sep(&self.col_sep).map_err(|e| format!("{section}.col_sep: {e}"))?;
        Ok(())
    }

    /// Resolved separator byte
    pub fn separator(&self) -> Result<u8, String> {
        parse_col_sep(&self.col_sep)
    }

    /// File name without directories and `.csv`/`.gz` extensions
    pub fn base_name(&self) -> String {
        let file = self.path.rsplit('/').next().unwrap_or(&self.path);
        file.replace(".csv", "").replace(".gz", "")
    }
}

/// Interprets a column separator specification
///
/// Accepts a single ASCII character, the word `tab`, or a character wrapped in
/// double quotes such as `"|"`.
pub fn parse_col_sep(sep: &str) -> Result<u8, String> {
    let bytes = sep.as_bytes();
    match bytes {
        [c] => Ok(*c),
        _ if sep == "tab" => Ok(b'\t'),
        [b'"', c, b'"'] => Ok(*c),
        _ => Err(format!("Illegal column separator format: {sep}")),
    }
}

/// Encoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// q-gram length
    #[serde(default = "default_q")]
    pub q: usize,

    /// Hashing construction
    #[serde(default = "default_hash_type")]
    pub hash_type: HashType,

    /// Number of hash functions (`"opt"` fills about 50% of bits)
    #[serde(default)]
    pub num_hash_functions: HashFunctionCount,

    /// Bit vector length
    #[serde(default = "default_bf_len")]
    pub bf_len: usize,

    /// Encoding method
    #[serde(default = "default_encoding_method")]
    pub method: EncodingMethod,

    /// Pad values with q-1 sentinel characters on both sides
    #[serde(default)]
    pub padded: bool,

    /// Key mixed into every token before hashing
    #[serde(default)]
    pub secret_key: String,

    /// Record-level encoding parameters
    #[serde(default)]
    pub rbf: RbfConfig,

    /// Keyed long-term key parameters
    #[serde(default)]
    pub clkrbf: ClkRbfConfig,
}

impl EncodingConfig {
    fn validate(&self, num_attributes: usize) -> Result<(), String> {
        if self.q == 0 {
            return Err("encoding.q must be >= 1".to_string());
        }

        if self.bf_len < 2 {
            return Err(format!("encoding.bf_len must be > 1, got {}", self.bf_len));
        }

        if let HashFunctionCount::Fixed(k) = self.num_hash_functions {
            if k == 0 {
                return Err("encoding.num_hash_functions must be >= 1 or 'opt'".to_string());
            }
        }

        match self.method {
            EncodingMethod::Abf if num_attributes != 1 => {
                return Err(format!(
                    "encoding.method 'abf' encodes exactly one attribute, {num_attributes} configured"
                ));
            }
            EncodingMethod::Rbf => self.rbf.validate(num_attributes)?,
            EncodingMethod::ClkRbf => self.clkrbf.validate(num_attributes)?,
            _ => {}
        }

        Ok(())
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            q: default_q(),
            hash_type: default_hash_type(),
            num_hash_functions: HashFunctionCount::default(),
            bf_len: default_bf_len(),
            method: default_encoding_method(),
            padded: false,
            secret_key: String::new(),
            rbf: RbfConfig::default(),
            clkrbf: ClkRbfConfig::default(),
        }
    }
}

/// Record-level (weighted) encoding parameters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RbfConfig {
    /// Static or dynamic attribute filter length
    #[serde(default)]
    pub abf_len_type: AbfLenType,

    /// Share of the final vector's bits sampled from each attribute
    #[serde(default)]
    pub bit_percentages: Vec<f64>,
}

impl RbfConfig {
    fn validate(&self, num_attributes: usize) -> Result<(), String> {
        if self.bit_percentages.len() != num_attributes {
            return Err(format!(
                "encoding.rbf.bit_percentages needs one entry per attribute ({} given, {} attributes)",
                self.bit_percentages.len(),
                num_attributes
            ));
        }
        if self.bit_percentages.iter().any(|p| !(*p > 0.0 && *p <= 1.0)) {
            return Err("encoding.rbf.bit_percentages must lie in (0, 1]".to_string());
        }
        let total: f64 = self.bit_percentages.iter().sum();
        if total > 1.0 + 1e-9 {
            return Err(format!(
                "encoding.rbf.bit_percentages must sum to at most 1, got {total:.3}"
            ));
        }
        Ok(())
    }
}

/// Keyed long-term key parameters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClkRbfConfig {
    /// Hash function count per attribute
    #[serde(default)]
    pub num_hash_functions: Vec<usize>,
}

impl ClkRbfConfig {
    fn validate(&self, num_attributes: usize) -> Result<(), String> {
        if self.num_hash_functions.len() != num_attributes {
            return Err(format!(
                "encoding.clkrbf.num_hash_functions needs one entry per attribute ({} given, {} attributes)",
                self.num_hash_functions.len(),
                num_attributes
            ));
        }
        if self.num_hash_functions.contains(&0) {
            return Err("encoding.clkrbf.num_hash_functions entries must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Hardening configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardeningConfig {
    /// Hardening method
    #[serde(default)]
    pub method: HardeningMethod,

    /// Explicit seed for the balancing permutation
    #[serde(default)]
    pub balance_seed: Option<u64>,

    /// Seed string for resampling
    #[serde(default = "default_resample_seed")]
    pub resample_seed: String,

    /// Window size for windowed XOR
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Markov-chain parameters
    #[serde(default)]
    pub markov: MarkovConfig,
}

impl HardeningConfig {
    fn validate(&self, bf_len: usize) -> Result<(), String> {
        match self.method {
            HardeningMethod::Fold if bf_len % 2 != 0 => Err(format!(
                "hardening 'fold' needs an even bf_len, got {bf_len}"
            )),
            HardeningMethod::Wxor if self.window_size < 2 || self.window_size > bf_len => {
                Err(format!(
                    "hardening.window_size must be between 2 and bf_len ({bf_len}), got {}",
                    self.window_size
                ))
            }
            HardeningMethod::Resample if self.resample_seed.is_empty() => {
                Err("hardening.resample_seed cannot be empty".to_string())
            }
            HardeningMethod::Mchain if self.markov.chain_len == 0 => {
                Err("hardening.markov.chain_len must be >= 1".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl Default for HardeningConfig {
    fn default() -> Self {
        Self {
            method: HardeningMethod::None,
            balance_seed: None,
            resample_seed: default_resample_seed(),
            window_size: default_window_size(),
            markov: MarkovConfig::default(),
        }
    }
}

/// Markov-chain hardening parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkovConfig {
    /// Synthetic tokens added per real token
    #[serde(default = "default_chain_len")]
    pub chain_len: usize,

    /// Token selection strategy
    #[serde(default)]
    pub selection: ChainSelection,
}

impl Default for MarkovConfig {
    fn default() -> Self {
        Self {
            chain_len: default_chain_len(),
            selection: ChainSelection::Freq,
        }
    }
}

/// Attack configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackConfig {
    /// Minimum frequency of bit vectors and values considered for alignment
    #[serde(default = "default_min_freq")]
    pub min_freq: usize,

    /// Numbers of most frequent values to reconstruct, evaluated in order
    #[serde(default = "default_num_freq_attr_vals")]
    pub num_freq_attr_vals: Vec<usize>,
}

impl AttackConfig {
    fn validate(&self) -> Result<(), String> {
        if self.min_freq == 0 {
            return Err("attack.min_freq must be >= 1".to_string());
        }
        if self.num_freq_attr_vals.is_empty() {
            return Err("attack.num_freq_attr_vals cannot be empty".to_string());
        }
        if self.num_freq_attr_vals.contains(&0) {
            return Err("attack.num_freq_attr_vals entries must be >= 1".to_string());
        }
        Ok(())
    }
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            min_freq: default_min_freq(),
            num_freq_attr_vals: default_num_freq_attr_vals(),
        }
    }
}

/// Results output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory result files are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// File format
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::Csv,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_progress_interval() -> usize {
    100_000
}

fn default_max_memory_mb() -> u64 {
    70_000
}

fn default_col_sep() -> String {
    ",".to_string()
}

fn default_q() -> usize {
    2
}

fn default_hash_type() -> HashType {
    HashType::Double
}

fn default_num_hash_functions() -> usize {
    10
}

fn default_bf_len() -> usize {
    1000
}

fn default_encoding_method() -> EncodingMethod {
    EncodingMethod::Clk
}

fn default_resample_seed() -> String {
    "samplebf76".to_string()
}

fn default_window_size() -> usize {
    2
}

fn default_chain_len() -> usize {
    4
}

fn default_min_freq() -> usize {
    2
}

fn default_num_freq_attr_vals() -> Vec<usize> {
    vec![10, 20]
}

fn default_output_directory() -> String {
    ".".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn base_config() -> BfAttackConfig {
        BfAttackConfig {
            application: ApplicationConfig::default(),
            build: DatasetConfig {
                path: "data/build.csv.gz".to_string(),
                rec_id_col: 0,
                col_sep: ",".to_string(),
                header: true,
                attributes: vec![1],
            },
            analysis: None,
            encoding: EncodingConfig {
                method: EncodingMethod::Abf,
                ..EncodingConfig::default()
            },
            hardening: HardeningConfig::default(),
            attack: AttackConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_base_config_is_valid() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_fold_requires_even_length() {
        let mut config = base_config();
        config.hardening.method = HardeningMethod::Fold;
        config.encoding.bf_len = 999;
        let err = config.validate().unwrap_err();
        assert!(err.contains("even"));

        config.encoding.bf_len = 1000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_abf_requires_single_attribute() {
        let mut config = base_config();
        config.build.attributes = vec![1, 2];
        assert!(config.validate().is_err());

        config.encoding.method = EncodingMethod::Clk;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rbf_percentages_validation() {
        let mut config = base_config();
        config.build.attributes = vec![1, 2];
        config.encoding.method = EncodingMethod::Rbf;
        config.encoding.rbf.bit_percentages = vec![0.5];
        assert!(config.validate().is_err());

        config.encoding.rbf.bit_percentages = vec![0.7, 0.6];
        assert!(config.validate().is_err());

        config.encoding.rbf.bit_percentages = vec![0.6, 0.4];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clkrbf_hash_counts_validation() {
        let mut config = base_config();
        config.build.attributes = vec![1, 2];
        config.encoding.method = EncodingMethod::ClkRbf;
        config.encoding.clkrbf.num_hash_functions = vec![10, 0];
        assert!(config.validate().is_err());

        config.encoding.clkrbf.num_hash_functions = vec![10, 15];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_attack_config_validation() {
        let mut config = base_config();
        config.attack.min_freq = 0;
        assert!(config.validate().is_err());

        config.attack.min_freq = 1;
        config.attack.num_freq_attr_vals = vec![10, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wxor_window_validation() {
        let mut config = base_config();
        config.hardening.method = HardeningMethod::Wxor;
        config.hardening.window_size = 1;
        assert!(config.validate().is_err());
        config.hardening.window_size = 3;
        assert!(config.validate().is_ok());
    }

    #[test_case(",", Some(b',') ; "comma")]
    #[test_case("tab", Some(b'\t') ; "tab keyword")]
    #[test_case("\"|\"", Some(b'|') ; "quoted pipe")]
    #[test_case(";;", None ; "two characters")]
    fn test_parse_col_sep(spec: &str, expected: Option<u8>) {
        assert_eq!(parse_col_sep(spec).ok(), expected);
    }

    #[test]
    fn test_hash_function_count_parsing() {
        #[derive(Deserialize)]
        struct Wrapper {
            k: HashFunctionCount,
        }

        let fixed: Wrapper = toml::from_str("k = 15").unwrap();
        assert_eq!(fixed.k, HashFunctionCount::Fixed(15));

        let auto: Wrapper = toml::from_str("k = \"opt\"").unwrap();
        assert_eq!(auto.k, HashFunctionCount::Auto(AutoFill::Opt));

        assert!(toml::from_str::<Wrapper>("k = \"many\"").is_err());
        assert_eq!("opt".parse::<HashFunctionCount>().unwrap().to_string(), "opt");
    }

    #[test]
    fn test_enum_names() {
        assert_eq!("edh".parse::<HashType>().unwrap(), HashType::EnhancedDouble);
        assert_eq!("mchain".parse::<HardeningMethod>().unwrap(), HardeningMethod::Mchain);
        assert_eq!("clkrbf".parse::<EncodingMethod>().unwrap(), EncodingMethod::ClkRbf);
        assert!("salt".parse::<HardeningMethod>().is_err());
    }

    #[test]
    fn test_dataset_base_name() {
        let config = base_config();
        assert_eq!(config.build.base_name(), "build");
        assert_eq!(config.analysis_dataset().base_name(), "build");
    }
}
