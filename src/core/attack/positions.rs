//! Bit position analysis
//!
//! For each bit position, collects the q-grams that may have been hashed to
//! it. A token of an aligned value is a candidate for every position the
//! aligned vector sets, and is ruled out for every position it leaves at
//! zero.

use super::frequency::AlignedPair;
use crate::domain::record::{qgrams, TokenSet};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Candidate tokens per bit position with accumulated likelihood scores
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionCandidateMap {
    candidates: Vec<BTreeMap<String, f64>>,
    forbidden: Vec<usize>,
}

impl PositionCandidateMap {
    /// Number of positions
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Remaining candidates of a position; empty when uninformative
    pub fn candidates(&self, pos: usize) -> Option<&BTreeMap<String, f64>> {
        self.candidates.get(pos)
    }

    /// Whether a position carries any evidence
    pub fn is_informative(&self, pos: usize) -> bool {
        self.candidates.get(pos).is_some_and(|c| !c.is_empty())
    }

    /// Number of tokens ruled out at a position
    pub fn forbidden_count(&self, pos: usize) -> usize {
        self.forbidden.get(pos).copied().unwrap_or(0)
    }

    /// Summary of forbidden and remaining candidate counts over positions
    pub fn stats(&self) -> PositionStats {
        let candidate_counts: Vec<usize> = self.candidates.iter().map(BTreeMap::len).collect();
        let (min_forbidden, mean_forbidden, max_forbidden) = min_mean_max(&self.forbidden);
        let (min_candidates, mean_candidates, max_candidates) = min_mean_max(&candidate_counts);
        PositionStats {
            min_forbidden,
            mean_forbidden,
            max_forbidden,
            min_candidates,
            mean_candidates,
            max_candidates,
        }
    }
}

/// Per-position count statistics of one analysis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PositionStats {
    pub min_forbidden: usize,
    pub mean_forbidden: f64,
    pub max_forbidden: usize,
    pub min_candidates: usize,
    pub mean_candidates: f64,
    pub max_candidates: usize,
}

/// Builds the candidate map from aligned pairs
///
/// Every token of a value gets score `1 / |tokens|` at each position its
/// paired vector sets. Tokens seen at a zero bit of a position are then
/// removed from that position's candidates. Values are tokenised without
/// padding. Positions are analysed in parallel; each reads all pairs.
pub fn analyze(pairs: &[AlignedPair], bf_len: usize, q: usize) -> PositionCandidateMap {
    let evidence: Vec<(&AlignedPair, TokenSet)> = pairs
        .iter()
        .map(|pair| (pair, qgrams(&pair.plaintext, q, false)))
        .collect();

    let (candidates, forbidden): (Vec<_>, Vec<_>) = (0..bf_len)
        .into_par_iter()
        .map(|pos| {
            let mut possible: BTreeMap<String, f64> = BTreeMap::new();
            let mut impossible: BTreeSet<&str> = BTreeSet::new();

            for (pair, tokens) in &evidence {
                if tokens.is_empty() {
                    continue;
                }
                if pair.encoded.get(pos) {
                    let share = 1.0 / tokens.len() as f64;
                    for token in tokens {
                        *possible.entry(token.clone()).or_insert(0.0) += share;
                    }
                } else {
                    impossible.extend(tokens.iter().map(String::as_str));
                }
            }

            possible.retain(|token, _| !impossible.contains(token.as_str()));
            (possible, impossible.len())
        })
        .unzip();

    let map = PositionCandidateMap {
        candidates,
        forbidden,
    };

    let stats = map.stats();
    tracing::info!(
        pairs = pairs.len(),
        min_forbidden = stats.min_forbidden,
        mean_forbidden = format!("{:.1}", stats.mean_forbidden),
        max_forbidden = stats.max_forbidden,
        min_candidates = stats.min_candidates,
        mean_candidates = format!("{:.1}", stats.mean_candidates),
        max_candidates = stats.max_candidates,
        "Bit position analysis complete"
    );

    map
}

fn min_mean_max(values: &[usize]) -> (usize, f64, usize) {
    if values.is_empty() {
        return (0, 0.0, 0);
    }
    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    let mean = values.iter().sum::<usize>() as f64 / values.len() as f64;
    (min, mean, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BitVector;
    use proptest::prelude::*;

    fn pair(bits: &str, value: &str) -> AlignedPair {
        AlignedPair {
            encoded: BitVector::from_01(bits).unwrap(),
            encoded_freq: 1,
            plaintext: value.to_string(),
            plaintext_freq: 1,
        }
    }

    #[test]
    fn test_one_bits_add_scored_candidates() {
        let map = analyze(&[pair("10", "abc")], 2, 2);
        let pos0 = map.candidates(0).unwrap();
        assert_eq!(pos0.len(), 2);
        assert!((pos0["ab"] - 0.5).abs() < 1e-9);
        assert!((pos0["bc"] - 0.5).abs() < 1e-9);
        assert!(!map.is_informative(1));
        assert_eq!(map.forbidden_count(1), 2);
    }

    #[test]
    fn test_zero_bits_remove_candidates() {
        // "ab" is set at position 0 by the first pair and zero by the second.
        let map = analyze(&[pair("11", "abc"), pair("01", "ab")], 2, 2);
        let pos0 = map.candidates(0).unwrap();
        assert!(!pos0.contains_key("ab"));
        assert!(pos0.contains_key("bc"));
        // Position 1 keeps everything and accumulates scores.
        let pos1 = map.candidates(1).unwrap();
        assert!((pos1["ab"] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_stats() {
        let map = analyze(&[pair("100", "abc")], 3, 2);
        let stats = map.stats();
        assert_eq!(stats.min_candidates, 0);
        assert_eq!(stats.max_candidates, 2);
        assert_eq!(stats.max_forbidden, 2);
        assert!((stats.mean_forbidden - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pairs_are_uninformative() {
        let map = analyze(&[], 4, 2);
        assert_eq!(map.len(), 4);
        assert!((0..4).all(|p| !map.is_informative(p)));
        assert_eq!(map.stats(), PositionStats::default());
    }

    proptest! {
        #[test]
        fn prop_zero_bit_tokens_never_candidates(
            rows in prop::collection::vec(("[01]{8}", "[a-d]{2,5}"), 1..8),
        ) {
            let pairs: Vec<AlignedPair> = rows.iter().map(|(b, v)| pair(b, v)).collect();
            let map = analyze(&pairs, 8, 2);
            for p in &pairs {
                let tokens = qgrams(&p.plaintext, 2, false);
                for pos in 0..8 {
                    if !p.encoded.get(pos) {
                        let cands = map.candidates(pos).unwrap();
                        prop_assert!(tokens.iter().all(|t| !cands.contains_key(t)));
                    }
                }
            }
        }
    }
}
