//! Frequency tables and frequency alignment

use crate::domain::BitVector;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Occurrence counts of values
///
/// Iteration order carries no meaning; [`FrequencyTable::ranked`] sorts
/// explicitly by descending frequency, breaking ties by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<K: Eq + Hash> {
    counts: HashMap<K, usize>,
}

impl<K: Eq + Hash> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Ord + Clone> FrequencyTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `key`
    pub fn add(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Frequency of `key`, zero if never seen
    pub fn get(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Keys occurring at least `min_freq` times, most frequent first
    pub fn ranked(&self, min_freq: usize) -> Vec<(K, usize)> {
        let mut ranked: Vec<(K, usize)> = self
            .counts
            .iter()
            .filter(|(_, &freq)| freq >= min_freq)
            .map(|(k, &freq)| (k.clone(), freq))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// The `n` most frequent keys
    pub fn most_frequent(&self, n: usize) -> Vec<K> {
        self.ranked(0).into_iter().take(n).map(|(k, _)| k).collect()
    }
}

impl<K: Eq + Hash + Ord + Clone> FromIterator<K> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::new();
        for key in iter {
            table.add(key);
        }
        table
    }
}

/// A frequent bit vector paired with the equally ranked plaintext value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedPair {
    #[serde(serialize_with = "serialize_bits")]
    pub encoded: BitVector,
    pub encoded_freq: usize,
    pub plaintext: String,
    pub plaintext_freq: usize,
}

fn serialize_bits<S: serde::Serializer>(bv: &BitVector, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&bv.to_01())
}

/// Pairs frequent bit vectors and plaintext values rank by rank
///
/// Only items occurring at least `min_freq` times take part. When the shorter
/// ranking holds a single item, that one pair is returned. Otherwise pairs
/// are emitted while both rankings strictly decrease: the scan stops at the
/// first rank whose frequency equals the next rank's frequency on either
/// side, and that rank is not emitted.
pub fn align(
    encoded_freqs: &FrequencyTable<BitVector>,
    plaintext_freqs: &FrequencyTable<String>,
    min_freq: usize,
) -> Vec<AlignedPair> {
    let encoded = encoded_freqs.ranked(min_freq);
    let plaintext = plaintext_freqs.ranked(min_freq);
    let max_rank = encoded.len().min(plaintext.len());

    tracing::info!(
        min_freq,
        frequent_bit_vectors = encoded.len(),
        frequent_values = plaintext.len(),
        "Aligning frequent bit vectors with frequent values"
    );

    let pair = |rank: usize| AlignedPair {
        encoded: encoded[rank].0.clone(),
        encoded_freq: encoded[rank].1,
        plaintext: plaintext[rank].0.clone(),
        plaintext_freq: plaintext[rank].1,
    };

    if max_rank == 1 {
        return vec![pair(0)];
    }

    let mut aligned = Vec::new();
    for rank in 0..max_rank {
        if tied(&encoded, rank) || tied(&plaintext, rank) {
            tracing::warn!(
                rank,
                encoded_freq = encoded[rank].1,
                plaintext_freq = plaintext[rank].1,
                "Two bit vectors or two values share a frequency, alignment stops"
            );
            break;
        }
        aligned.push(pair(rank));
    }

    tracing::info!(aligned = aligned.len(), "Frequency alignment complete");
    aligned
}

/// True if the item at `rank` shares its frequency with the next one
fn tied<K>(ranking: &[(K, usize)], rank: usize) -> bool {
    ranking
        .get(rank + 1)
        .is_some_and(|next| next.1 == ranking[rank].1)
}
