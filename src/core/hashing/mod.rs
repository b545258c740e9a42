//! Token to bit-position hashing
//!
//! A [`HashScheme`] maps a q-gram token to a set of positions in
//! `[0, bf_len)`. Four constructions are supported:
//!
//! - **Double hashing**: `(h1 + i*h2) mod L`
//! - **Enhanced double hashing**: `(h1 + i*h2 + i^2) mod L`
//! - **Triple hashing**: `(h1 + i*h2 + i*(i-1)/2 * h3) mod L`
//! - **Random hashing**: a generator seeded from `h1` draws `k` distinct positions
//!
//! `h1`, `h2` and `h3` are SHA-1, MD5 and SHA-224 digests of the (optionally
//! keyed) token, read as big-endian integers and reduced modulo `L`.
//!
//! # Example
//!
//! ```
//! use bfattack::config::HashType;
//! use bfattack::core::hashing::HashScheme;
//!
//! let scheme = HashScheme::new(HashType::Double, 100, 5, "");
//! let positions = scheme.generate("sm");
//! assert!(!positions.is_empty() && positions.len() <= 5);
//! assert!(positions.iter().all(|&p| p < 100));
//! ```

use crate::config::HashType;
use crate::domain::errors::BfAttackError;
use crate::domain::record::{qgrams_of_all, Record};
use crate::domain::Result;
use md5::Md5;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha1::Sha1;
use sha2::{Digest, Sha224};
use std::collections::BTreeSet;

/// Deterministic token to bit-position generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashScheme {
    kind: HashType,
    bf_len: usize,
    num_hash: usize,
    key: Vec<u8>,
}

impl HashScheme {
    /// Creates a scheme for vectors of length `bf_len` using `num_hash`
    /// hash functions; `key` is prepended to every token before hashing
    pub fn new(kind: HashType, bf_len: usize, num_hash: usize, key: &str) -> Self {
        Self {
            kind,
            bf_len,
            num_hash,
            key: key.as_bytes().to_vec(),
        }
    }

    /// Hashing construction
    pub fn kind(&self) -> HashType {
        self.kind
    }

    /// Length of the vectors positions are generated for
    pub fn bf_len(&self) -> usize {
        self.bf_len
    }

    /// Number of hash functions
    pub fn num_hash(&self) -> usize {
        self.num_hash
    }

    /// Bit positions of a token
    ///
    /// Colliding positions collapse, so fewer than `k` positions may be
    /// returned. The result depends only on the token, key, `bf_len` and `k`.
    pub fn generate(&self, token: &str) -> BTreeSet<usize> {
        if self.bf_len == 0 || self.num_hash == 0 {
            return BTreeSet::new();
        }
        let len = self.bf_len as u128;
        let k = self.num_hash as u128;

        match self.kind {
            HashType::Double => {
                let (h1, h2) = (self.digest_mod::<Sha1>(token), self.digest_mod::<Md5>(token));
                (0..k).map(|i| ((h1 + i * h2) % len) as usize).collect()
            }
            HashType::EnhancedDouble => {
                let (h1, h2) = (self.digest_mod::<Sha1>(token), self.digest_mod::<Md5>(token));
                (0..k)
                    .map(|i| ((h1 + i * h2 + i * i) % len) as usize)
                    .collect()
            }
            HashType::Triple => {
                let h1 = self.digest_mod::<Sha1>(token);
                let h2 = self.digest_mod::<Md5>(token);
                let h3 = self.digest_mod::<Sha224>(token);
                (0..k)
                    .map(|i| {
                        let tri = (i * i.saturating_sub(1) / 2) % len;
                        ((h1 + i * h2 + tri * h3) % len) as usize
                    })
                    .collect()
            }
            HashType::Random => {
                let digest = self.digest::<Sha1>(token);
                let mut seed = [0u8; 8];
                seed.copy_from_slice(&digest[..8]);
                let mut rng = ChaCha8Rng::seed_from_u64(u64::from_be_bytes(seed));
                let amount = self.num_hash.min(self.bf_len);
                rand::seq::index::sample(&mut rng, self.bf_len, amount)
                    .into_iter()
                    .collect()
            }
        }
    }

    fn digest<D: Digest>(&self, token: &str) -> Vec<u8> {
        let mut hasher = D::new();
        hasher.update(&self.key);
        hasher.update(token.as_bytes());
        hasher.finalize().to_vec()
    }

    /// Digest read as a big-endian integer, reduced modulo `bf_len`
    fn digest_mod<D: Digest>(&self, token: &str) -> u128 {
        let len = self.bf_len as u128;
        self.digest::<D>(token)
            .iter()
            .fold(0u128, |acc, &b| (acc * 256 + b as u128) % len)
    }
}

/// Average size of the per-record token set over the selected columns
///
/// Each record contributes the size of the union of its attribute q-gram sets.
pub fn average_token_count(records: &[Record], columns: &[usize], q: usize, padded: bool) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: usize = records
        .iter()
        .map(|rec| qgrams_of_all(columns.iter().map(|&c| rec.field(c)), q, padded).len())
        .sum();
    total as f64 / records.len() as f64
}

/// Hash function count that sets on average about half of the bits
///
/// `round(ln(2) * bf_len / avg_tokens)`, at least one.
///
/// # Errors
///
/// Returns a configuration error when the average token count is zero, as no
/// count can be derived.
pub fn optimal_num_hash_functions(bf_len: usize, avg_tokens: f64) -> Result<usize> {
    if avg_tokens <= 0.0 {
        return Err(BfAttackError::Configuration(
            "Cannot derive hash function count: records produce no q-grams".to_string(),
        ));
    }
    let k = (std::f64::consts::LN_2 * bf_len as f64 / avg_tokens).round() as usize;
    Ok(k.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(HashType::Double ; "double")]
    #[test_case(HashType::EnhancedDouble ; "enhanced double")]
    #[test_case(HashType::Triple ; "triple")]
    #[test_case(HashType::Random ; "random")]
    fn test_generate_is_deterministic(kind: HashType) {
        let scheme = HashScheme::new(kind, 1000, 20, "");
        let first = scheme.generate("jo");
        let second = scheme.clone().generate("jo");
        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert!(first.len() <= 20);
    }

    #[test]
    fn test_random_hashing_draws_distinct_positions() {
        let scheme = HashScheme::new(HashType::Random, 1000, 30, "");
        assert_eq!(scheme.generate("ab").len(), 30);
    }

    #[test]
    fn test_random_hashing_caps_at_length() {
        let scheme = HashScheme::new(HashType::Random, 8, 30, "");
        assert_eq!(scheme.generate("ab").len(), 8);
    }

    #[test]
    fn test_key_changes_positions() {
        let plain = HashScheme::new(HashType::Double, 1000, 10, "");
        let keyed = HashScheme::new(HashType::Double, 1000, 10, "secret");
        assert_ne!(plain.generate("sm"), keyed.generate("sm"));
    }

    #[test]
    fn test_different_tokens_differ() {
        let scheme = HashScheme::new(HashType::Triple, 1000, 10, "");
        assert_ne!(scheme.generate("sm"), scheme.generate("mi"));
    }

    #[test]
    fn test_digest_mod_matches_big_integer_reduction() {
        // A length of 256 keeps only the last digest byte.
        let scheme = HashScheme::new(HashType::Double, 256, 1, "");
        let digest = scheme.digest::<Sha1>("xy");
        let expected = *digest.last().unwrap() as usize;
        assert_eq!(scheme.generate("xy").into_iter().next(), Some(expected));
    }

    #[test]
    fn test_optimal_num_hash_functions() {
        // ln(2) * 1000 / 6.93 ~= 100
        assert_eq!(optimal_num_hash_functions(1000, 6.931_471_8).unwrap(), 100);
        assert_eq!(optimal_num_hash_functions(10, 1000.0).unwrap(), 1);
        assert!(optimal_num_hash_functions(1000, 0.0).is_err());
    }

    #[test]
    fn test_average_token_count() {
        let records = vec![
            Record::new(RecordId::new("1").unwrap(), ["1", "smith", "jo"]),
            Record::new(RecordId::new("2").unwrap(), ["2", "ann", "ann"]),
        ];
        // {sm,mi,it,th,jo} = 5 and {an,nn} = 2
        assert!((average_token_count(&records, &[1, 2], 2, false) - 3.5).abs() < 1e-9);
        assert_eq!(average_token_count(&[], &[1], 2, false), 0.0);
    }

    proptest! {
        #[test]
        fn prop_positions_in_range(
            token in "[a-z]{1,4}",
            bf_len in 2usize..2048,
            k in 1usize..40,
            kind in prop_oneof![
                Just(HashType::Double),
                Just(HashType::EnhancedDouble),
                Just(HashType::Triple),
                Just(HashType::Random),
            ],
        ) {
            let scheme = HashScheme::new(kind, bf_len, k, "");
            let positions = scheme.generate(&token);
            prop_assert!(positions.iter().all(|&p| p < bf_len));
            prop_assert!(positions.len() <= k);
            prop_assert_eq!(positions, scheme.generate(&token));
        }
    }
}
