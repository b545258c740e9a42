//! Encoding parameters resolved once per run
//!
//! The configured hash function count may be `"opt"` and record-level
//! filters may be sized dynamically. Both depend on the build dataset, so
//! they are derived here, before encoding starts, into plain values.

use crate::config::{AbfLenType, EncodingConfig, EncodingMethod, HashFunctionCount, HashType};
use crate::core::hashing::{average_token_count, optimal_num_hash_functions};
use crate::domain::errors::BfAttackError;
use crate::domain::record::{qgrams, Record};
use crate::domain::Result;
use serde::Serialize;

/// Fully resolved encoding parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEncoding {
    pub method: EncodingMethod,
    pub hash_type: HashType,
    pub q: usize,
    pub padded: bool,
    pub bf_len: usize,
    pub secret_key: String,

    /// Encoded columns, in configuration order
    pub columns: Vec<usize>,

    /// Hash function count shared by all attributes
    pub num_hash: usize,

    /// Per-attribute hash function counts (keyed long-term key only)
    pub attr_num_hash: Vec<usize>,

    /// Per-attribute ABF lengths (record-level encoding only)
    pub abf_lens: Vec<usize>,

    /// Per-attribute number of bits sampled into the final vector
    /// (record-level encoding only); sums to `bf_len`
    pub attr_bits: Vec<usize>,
}

impl ResolvedEncoding {
    /// Resolves derived parameters against the build dataset
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `"opt"` is requested but the build
    /// records yield no q-grams.
    pub fn resolve(config: &EncodingConfig, columns: &[usize], build: &[Record]) -> Result<Self> {
        let num_hash = match config.num_hash_functions {
            HashFunctionCount::Fixed(k) => k,
            HashFunctionCount::Auto(_) => {
                let avg = average_token_count(build, columns, config.q, config.padded);
                let k = optimal_num_hash_functions(config.bf_len, avg)?;
                tracing::info!(
                    avg_qgrams = format!("{avg:.2}"),
                    num_hash = k,
                    "Derived hash function count for half-filled bit vectors"
                );
                k
            }
        };

        let attr_num_hash = match config.method {
            EncodingMethod::ClkRbf => config.clkrbf.num_hash_functions.clone(),
            _ => vec![num_hash; columns.len()],
        };

        let (abf_lens, attr_bits) = if config.method == EncodingMethod::Rbf {
            let attr_bits = split_bits(config.bf_len, &config.rbf.bit_percentages)?;
            let abf_lens = match config.rbf.abf_len_type {
                AbfLenType::Static => attr_bits.clone(),
                AbfLenType::Dynamic => columns
                    .iter()
                    .map(|&col| {
                        let avg = average_attribute_qgrams(build, col, config.q, config.padded);
                        dynamic_abf_len(num_hash, avg)
                    })
                    .collect(),
            };
            tracing::debug!(?abf_lens, ?attr_bits, "Resolved record-level filter sizes");
            (abf_lens, attr_bits)
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(Self {
            method: config.method,
            hash_type: config.hash_type,
            q: config.q,
            padded: config.padded,
            bf_len: config.bf_len,
            secret_key: config.secret_key.clone(),
            columns: columns.to_vec(),
            num_hash,
            attr_num_hash,
            abf_lens,
            attr_bits,
        })
    }

    /// Hash function count as reported in results
    ///
    /// The keyed long-term key reports its per-attribute counts.
    pub fn num_hash_label(&self) -> String {
        match self.method {
            EncodingMethod::ClkRbf => self
                .attr_num_hash
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("/"),
            _ => self.num_hash.to_string(),
        }
    }
}

/// Splits `bf_len` bits across attributes by weight
///
/// Every attribute but the last gets `floor(w * bf_len)` bits (at least one);
/// the last gets the remainder so the total is exactly `bf_len`.
pub fn split_bits(bf_len: usize, weights: &[f64]) -> Result<Vec<usize>> {
    let Some((_, head)) = weights.split_last() else {
        return Err(BfAttackError::Configuration(
            "Record-level encoding needs at least one attribute weight".to_string(),
        ));
    };
    let mut bits: Vec<usize> = head
        .iter()
        .map(|w| ((w * bf_len as f64).floor() as usize).max(1))
        .collect();
    let used: usize = bits.iter().sum();
    if used >= bf_len {
        return Err(BfAttackError::Configuration(format!(
            "Attribute weights leave no bits for the last attribute of a {bf_len}-bit vector"
        )));
    }
    bits.push(bf_len - used);
    Ok(bits)
}

/// Length at which an attribute filter is expected to be half full
///
/// `ceil(1 / (1 - 0.5^(1 / (k * g))))`, at least one.
pub fn dynamic_abf_len(num_hash: usize, avg_qgrams: f64) -> usize {
    let inserts = num_hash as f64 * avg_qgrams;
    if inserts <= 0.0 {
        return 1;
    }
    let len = 1.0 / (1.0 - 0.5f64.powf(1.0 / inserts));
    (len.ceil() as usize).max(1)
}

fn average_attribute_qgrams(records: &[Record], column: usize, q: usize, padded: bool) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: usize = records
        .iter()
        .map(|rec| qgrams(rec.field(column), q, padded).len())
        .sum();
    total as f64 / records.len() as f64
}
