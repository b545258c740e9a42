//! Bloom filter hardening
//!
//! A [`Hardener`] replaces an encoded bit vector with a transformed one.
//! Markov-chain hardening is the exception: it works on the token sets
//! before encoding, via [`Hardener::harden_tokens`], and leaves vectors
//! untouched.
//!
//! | Method   | Output length | Transform                                     |
//! |----------|---------------|-----------------------------------------------|
//! | balance  | 2L            | append complement, seeded permutation          |
//! | fold     | L/2           | `out[i] = in[i] ^ in[i + L/2]`                 |
//! | rule90   | L             | `out[i] = in[i-1] ^ in[i+1]` (circular)        |
//! | wxor     | L             | XOR over a circular window of `w` bits         |
//! | resample | L             | `out[i] = in[a_i] ^ in[b_i]`, seeded `a`, `b`  |
//! | mchain   | L             | successor tokens added before encoding         |

pub mod markov;

pub use markov::MarkovChain;

use crate::config::{ChainSelection, HardeningConfig, HardeningMethod};
use crate::domain::record::TokenSet;
use crate::domain::{BitVector, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Bit vector (or token stream) hardening strategy
#[derive(Debug, Clone)]
pub enum Hardener {
    None,

    /// Complement appended, then permuted over all `2L` positions
    Balance { permutation: Vec<usize> },

    Fold,

    Rule90,

    Wxor { window: usize },

    /// Each output bit XORs two seeded source positions
    Resample { sources: Vec<(usize, usize)> },

    Mchain {
        chain: MarkovChain,
        chain_len: usize,
        selection: ChainSelection,
        seed: u64,
    },
}

impl Hardener {
    /// Builds the hardener for vectors of length `input_len`
    ///
    /// `run_seed` is used where the configuration carries no explicit seed.
    /// `train` is only invoked for Markov-chain hardening and must return the
    /// model trained on the build dataset.
    pub fn from_config(
        config: &HardeningConfig,
        input_len: usize,
        run_seed: u64,
        train: impl FnOnce() -> MarkovChain,
    ) -> Self {
        match config.method {
            HardeningMethod::None => Self::None,
            HardeningMethod::Balance => {
                Self::balance(input_len, config.balance_seed.unwrap_or(run_seed))
            }
            HardeningMethod::Fold => Self::Fold,
            HardeningMethod::Rule90 => Self::Rule90,
            HardeningMethod::Wxor => Self::Wxor {
                window: config.window_size,
            },
            HardeningMethod::Resample => Self::resample(input_len, &config.resample_seed),
            HardeningMethod::Mchain => Self::Mchain {
                chain: train(),
                chain_len: config.markov.chain_len,
                selection: config.markov.selection,
                seed: run_seed,
            },
        }
    }

    /// Balancing for vectors of length `input_len`
    pub fn balance(input_len: usize, seed: u64) -> Self {
        Self::Balance {
            permutation: balance_permutation(input_len, seed),
        }
    }

    /// Resampling for vectors of length `input_len`
    ///
    /// The seed string is digested into the generator seed, so the same
    /// string always yields the same source positions.
    pub fn resample(input_len: usize, seed: &str) -> Self {
        let digest = Sha256::digest(seed.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from_be_bytes(head));
        let sources = (0..input_len)
            .map(|_| (rng.gen_range(0..input_len), rng.gen_range(0..input_len)))
            .collect();
        Self::Resample { sources }
    }

    /// Configuration name
    pub fn method(&self) -> HardeningMethod {
        match self {
            Self::None => HardeningMethod::None,
            Self::Balance { .. } => HardeningMethod::Balance,
            Self::Fold => HardeningMethod::Fold,
            Self::Rule90 => HardeningMethod::Rule90,
            Self::Wxor { .. } => HardeningMethod::Wxor,
            Self::Resample { .. } => HardeningMethod::Resample,
            Self::Mchain { .. } => HardeningMethod::Mchain,
        }
    }

    /// Length of hardened vectors for inputs of length `input_len`
    pub fn output_len(&self, input_len: usize) -> usize {
        match self {
            Self::Balance { .. } => 2 * input_len,
            Self::Fold => input_len / 2,
            _ => input_len,
        }
    }

    /// Token-level hardening applied before encoding
    ///
    /// Identity for every method except Markov-chain augmentation.
    pub fn harden_tokens(&self, record_id: &str, token_sets: Vec<TokenSet>) -> Result<Vec<TokenSet>> {
        match self {
            Self::Mchain {
                chain,
                chain_len,
                selection,
                seed,
            } => {
                let mut rng = ChaCha8Rng::seed_from_u64(markov::record_seed(*seed, record_id));
                chain.augment(&token_sets, *chain_len, *selection, &mut rng)
            }
            _ => Ok(token_sets),
        }
    }

    /// Bit-level hardening applied after encoding
    pub fn harden(&self, bv: &BitVector) -> BitVector {
        let len = bv.len();
        match self {
            Self::None | Self::Mchain { .. } => bv.clone(),
            Self::Balance { permutation } => {
                debug_assert_eq!(permutation.len(), 2 * len, "balancing built for another length");
                let doubled: Vec<bool> = bv.iter().chain(bv.iter().map(|b| !b)).collect();
                let out: Vec<bool> = permutation.iter().map(|&p| doubled[p]).collect();
                BitVector::from_bools(&out)
            }
            Self::Fold => {
                // Odd lengths are rejected by configuration validation; the
                // middle bit of an odd vector would be dropped here.
                let half = len / 2;
                let out: Vec<bool> = (0..half).map(|i| bv.get(i) ^ bv.get(i + half)).collect();
                BitVector::from_bools(&out)
            }
            Self::Rule90 => {
                if len == 0 {
                    return bv.clone();
                }
                let out: Vec<bool> = (0..len)
                    .map(|i| bv.get((i + len - 1) % len) ^ bv.get((i + 1) % len))
                    .collect();
                BitVector::from_bools(&out)
            }
            Self::Wxor { window } => {
                if len == 0 {
                    return bv.clone();
                }
                let out: Vec<bool> = (0..len)
                    .map(|i| (0..*window).fold(false, |acc, j| acc ^ bv.get((i + j) % len)))
                    .collect();
                BitVector::from_bools(&out)
            }
            Self::Resample { sources } => {
                let out: Vec<bool> = sources
                    .iter()
                    .take(len)
                    .map(|&(a, b)| bv.get(a) ^ bv.get(b))
                    .collect();
                BitVector::from_bools(&out)
            }
        }
    }
}

fn balance_permutation(input_len: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut permutation: Vec<usize> = (0..2 * input_len).collect();
    permutation.shuffle(&mut rng);
    permutation
}
