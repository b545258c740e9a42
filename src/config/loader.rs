//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BfAttackConfig;
use crate::domain::errors::BfAttackError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BfAttackConfig
/// 4. Applies environment variable overrides (BFATTACK_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if the file cannot be read or parsed, a
/// referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use bfattack::config::loader::load_config;
///
/// let config = load_config("bfattack.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BfAttackConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BfAttackError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BfAttackError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BfAttackConfig = toml::from_str(&contents)
        .map_err(|e| BfAttackError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BfAttackError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BfAttackError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BfAttackError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Parses an override value, reporting the variable name on failure
fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| {
        BfAttackError::Configuration(format!("Invalid value for {name}: {e}"))
    })
}

/// Applies environment variable overrides using BFATTACK_* prefix
///
/// Environment variables follow the pattern: BFATTACK_<SECTION>_<KEY>
/// For example: BFATTACK_ENCODING_BF_LEN, BFATTACK_HARDENING_METHOD
fn apply_env_overrides(config: &mut BfAttackConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("BFATTACK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("BFATTACK_APPLICATION_MAX_MEMORY_MB") {
        config.application.max_memory_mb = parse_override("BFATTACK_APPLICATION_MAX_MEMORY_MB", &val)?;
    }
    if let Ok(val) = std::env::var("BFATTACK_APPLICATION_SEED") {
        config.application.seed = Some(parse_override("BFATTACK_APPLICATION_SEED", &val)?);
    }

    // Dataset overrides
    if let Ok(val) = std::env::var("BFATTACK_BUILD_PATH") {
        config.build.path = val;
    }
    if let Ok(val) = std::env::var("BFATTACK_ANALYSIS_PATH") {
        if let Some(ref mut analysis) = config.analysis {
            analysis.path = val;
        }
    }

    // Encoding overrides
    if let Ok(val) = std::env::var("BFATTACK_ENCODING_Q") {
        config.encoding.q = parse_override("BFATTACK_ENCODING_Q", &val)?;
    }
    if let Ok(val) = std::env::var("BFATTACK_ENCODING_BF_LEN") {
        config.encoding.bf_len = parse_override("BFATTACK_ENCODING_BF_LEN", &val)?;
    }
    if let Ok(val) = std::env::var("BFATTACK_ENCODING_HASH_TYPE") {
        config.encoding.hash_type = parse_override("BFATTACK_ENCODING_HASH_TYPE", &val)?;
    }
    if let Ok(val) = std::env::var("BFATTACK_ENCODING_NUM_HASH_FUNCTIONS") {
        config.encoding.num_hash_functions =
            parse_override("BFATTACK_ENCODING_NUM_HASH_FUNCTIONS", &val)?;
    }
    if let Ok(val) = std::env::var("BFATTACK_ENCODING_SECRET_KEY") {
        config.encoding.secret_key = val;
    }

    // Hardening overrides
    if let Ok(val) = std::env::var("BFATTACK_HARDENING_METHOD") {
        config.hardening.method = parse_override("BFATTACK_HARDENING_METHOD", &val)?;
    }
    if let Ok(val) = std::env::var("BFATTACK_HARDENING_BALANCE_SEED") {
        config.hardening.balance_seed = Some(parse_override("BFATTACK_HARDENING_BALANCE_SEED", &val)?);
    }

    // Attack overrides
    if let Ok(val) = std::env::var("BFATTACK_ATTACK_MIN_FREQ") {
        config.attack.min_freq = parse_override("BFATTACK_ATTACK_MIN_FREQ", &val)?;
    }

    // Output overrides
    if let Ok(val) = std::env::var("BFATTACK_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("BFATTACK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("BFATTACK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
