//! First-order q-gram transition model for Markov-chain hardening
//!
//! The model is trained once per run on the build dataset's values and then
//! passed explicitly to the hardener. Each record receives `chain_len`
//! successor tokens it does not already contain, which are encoded alongside
//! the real ones.

use crate::config::ChainSelection;
use crate::domain::record::{qgram_sequence, Record, TokenSet};
use crate::domain::{BfAttackError, Result};
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Successor tokens of one token with their transition probabilities,
/// most probable first
type Successors = Vec<(String, f64)>;

/// Trained transition model
#[derive(Debug, Clone, Default)]
pub struct MarkovChain {
    q: usize,
    padded: bool,
    transitions: BTreeMap<String, Successors>,
}

impl MarkovChain {
    /// Counts token transitions over a sequence of values
    ///
    /// Each value is split into its ordered q-gram sequence and every pair
    /// of consecutive q-grams counts as one transition.
    pub fn train<'a>(values: impl IntoIterator<Item = &'a str>, q: usize, padded: bool) -> Self {
        let mut counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

        for value in values {
            let sequence = qgram_sequence(value, q, padded);
            for pair in sequence.windows(2) {
                *counts
                    .entry(pair[0].clone())
                    .or_default()
                    .entry(pair[1].clone())
                    .or_default() += 1;
            }
        }

        let transitions = counts
            .into_iter()
            .map(|(from, to)| {
                let total: usize = to.values().sum();
                let mut successors: Successors = to
                    .into_iter()
                    .map(|(tok, n)| (tok, n as f64 / total as f64))
                    .collect();
                // Stable sort keeps the lexical order among equal probabilities.
                successors.sort_by(|a, b| b.1.total_cmp(&a.1));
                (from, successors)
            })
            .collect();

        Self {
            q,
            padded,
            transitions,
        }
    }

    /// Trains on records, joining the selected columns of each with a space
    ///
    /// Transitions across an attribute boundary (`"th"` to `"h "`) are
    /// learned as well.
    pub fn train_records(records: &[Record], columns: &[usize], q: usize, padded: bool) -> Self {
        let values: Vec<String> = records.iter().map(|r| r.joined_value(columns)).collect();
        Self::train(values.iter().map(String::as_str), q, padded)
    }

    /// Number of tokens with at least one known successor
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn q(&self) -> usize {
        self.q
    }

    pub fn padded(&self) -> bool {
        self.padded
    }

    /// Transition probability from one token to another
    pub fn probability(&self, from: &str, to: &str) -> f64 {
        self.transitions
            .get(from)
            .and_then(|succ| succ.iter().find(|(tok, _)| tok == to))
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    /// Adds `chain_len` synthetic tokens to one record's token sets
    ///
    /// Candidates are the successors of the record's real tokens that are not
    /// real tokens themselves. A candidate reachable from several real tokens
    /// is weighted by the sum of its transition probabilities and is placed in
    /// the attribute set of the token that leads to it most strongly.
    /// [`ChainSelection::Freq`] takes the heaviest candidates,
    /// [`ChainSelection::Prob`] draws them by weight without replacement.
    /// Fewer than `chain_len` tokens are added only when the model has no
    /// more candidates.
    pub fn augment<R: Rng + ?Sized>(
        &self,
        token_sets: &[TokenSet],
        chain_len: usize,
        selection: ChainSelection,
        rng: &mut R,
    ) -> Result<Vec<TokenSet>> {
        let mut candidates = self.candidates(token_sets);
        let picked: Vec<Candidate> = match selection {
            ChainSelection::Freq => {
                // Stable sort keeps the lexical order among equal weights.
                candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));
                candidates.into_iter().take(chain_len).collect()
            }
            ChainSelection::Prob => {
                let mut picked = Vec::with_capacity(chain_len.min(candidates.len()));
                while picked.len() < chain_len && !candidates.is_empty() {
                    let weights = WeightedIndex::new(candidates.iter().map(|c| c.weight))
                        .map_err(|e| {
                            BfAttackError::Other(format!("Invalid transition weights: {e}"))
                        })?;
                    picked.push(candidates.remove(weights.sample(rng)));
                }
                picked
            }
        };

        let mut augmented = token_sets.to_vec();
        for candidate in picked {
            augmented[candidate.set].insert(candidate.token);
        }
        Ok(augmented)
    }

    /// New successor tokens of a record, in lexical order
    fn candidates(&self, token_sets: &[TokenSet]) -> Vec<Candidate> {
        let is_real = |token: &str| token_sets.iter().any(|set| set.contains(token));
        let mut by_token: BTreeMap<&str, Candidate> = BTreeMap::new();

        for (set, tokens) in token_sets.iter().enumerate() {
            for successors in tokens.iter().filter_map(|t| self.transitions.get(t)) {
                for (token, p) in successors.iter().filter(|(t, _)| !is_real(t.as_str())) {
                    let entry = by_token.entry(token.as_str()).or_insert_with(|| Candidate {
                        token: token.clone(),
                        set,
                        weight: 0.0,
                        strongest: 0.0,
                    });
                    entry.weight += *p;
                    if *p > entry.strongest {
                        entry.strongest = *p;
                        entry.set = set;
                    }
                }
            }
        }

        by_token.into_values().collect()
    }
}

/// Synthetic token proposed for a record
#[derive(Debug)]
struct Candidate {
    token: String,
    /// Attribute set the token is added to
    set: usize,
    weight: f64,
    strongest: f64,
}

/// Seed for one record's random draws
///
/// Mixes the run seed with a digest of the record id so that results do not
/// depend on the order records are processed in.
pub fn record_seed(run_seed: u64, record_id: &str) -> u64 {
    let digest = Sha256::digest(record_id.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    run_seed ^ u64::from_be_bytes(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::qgrams;
    use crate::domain::RecordId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use test_case::test_case;

    fn tokens(items: &[&str]) -> TokenSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn synthetic(real: &[TokenSet], augmented: &[TokenSet]) -> Vec<String> {
        real.iter()
            .zip(augmented)
            .flat_map(|(r, a)| a.difference(r).cloned())
            .collect()
    }

    #[test]
    fn test_train_counts_transitions() {
        let chain = MarkovChain::train(["smith", "smart"], 2, false);
        // sm -> mi (1), sm -> ma (1)
        assert!((chain.probability("sm", "mi") - 0.5).abs() < 1e-9);
        assert!((chain.probability("sm", "ma") - 0.5).abs() < 1e-9);
        assert_eq!(chain.probability("th", "zz"), 0.0);
    }

    #[test]
    fn test_train_records_crosses_attribute_boundary() {
        let records = vec![Record::new(RecordId::new("1").unwrap(), ["1", "Smith", "Anna"])];
        let chain = MarkovChain::train_records(&records, &[1, 2], 2, false);
        assert_eq!(chain.probability("th", "h "), 1.0);
        assert_eq!(chain.probability("h ", " a"), 1.0);
        assert_eq!(chain.probability(" a", "an"), 1.0);
    }

    #[test]
    fn test_freq_selection_takes_most_probable() {
        let chain = MarkovChain::train(["anna", "anne", "anne"], 2, false);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = chain
            .augment(&[tokens(&["nn"])], 1, ChainSelection::Freq, &mut rng)
            .unwrap();
        // nn -> ne (2/3) beats nn -> na (1/3)
        assert_eq!(out, vec![tokens(&["ne", "nn"])]);
    }

    #[test_case(ChainSelection::Freq, 1 ; "freq one")]
    #[test_case(ChainSelection::Freq, 2 ; "freq two")]
    #[test_case(ChainSelection::Prob, 1 ; "prob one")]
    #[test_case(ChainSelection::Prob, 2 ; "prob two")]
    fn test_adds_chain_len_new_tokens_per_record(selection: ChainSelection, chain_len: usize) {
        let chain = MarkovChain::train(["smart", "jolly", "smith", "jones"], 2, false);
        // sm -> ma and jo -> ol are the only successors outside the record
        let real = vec![qgrams("smith", 2, false), qgrams("jones", 2, false)];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let out = chain.augment(&real, chain_len, selection, &mut rng).unwrap();

        let added = synthetic(&real, &out);
        assert_eq!(added.len(), chain_len);
        for token in &added {
            assert!(["ma", "ol"].contains(&token.as_str()));
            assert!(real.iter().all(|set| !set.contains(token)));
        }
    }

    #[test]
    fn test_freq_ties_break_lexically_and_stay_in_their_attribute() {
        let chain = MarkovChain::train(["smart", "jolly", "smith", "jones"], 2, false);
        let real = vec![qgrams("smith", 2, false), qgrams("jones", 2, false)];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = chain.augment(&real, 1, ChainSelection::Freq, &mut rng).unwrap();
        assert!(out[0].contains("ma"));
        assert_eq!(out[1], real[1]);
    }

    #[test]
    fn test_stops_when_no_new_successors_remain() {
        let chain = MarkovChain::train(["smart", "jolly", "smith", "jones"], 2, false);
        let real = vec![qgrams("smith", 2, false), qgrams("jones", 2, false)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let out = chain.augment(&real, 5, ChainSelection::Prob, &mut rng).unwrap();
        assert_eq!(synthetic(&real, &out).len(), 2);

        // Every successor of a value seen once is already one of its tokens
        let single = MarkovChain::train(["smith", "jones"], 2, false);
        let real = vec![qgrams("smith", 2, false)];
        let out = single.augment(&real, 1, ChainSelection::Freq, &mut rng).unwrap();
        assert_eq!(out, real);
    }

    #[test]
    fn test_prob_selection_is_seeded() {
        let chain = MarkovChain::train(["anna", "anne", "annie", "andy"], 2, false);
        let input = vec![tokens(&["an", "nn"])];
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            chain.augment(&input, 2, ChainSelection::Prob, &mut rng).unwrap()
        };
        assert_eq!(draw(9), draw(9));
        assert!(draw(9)[0].is_superset(&input[0]));
        assert_eq!(draw(9)[0].len(), input[0].len() + 2);
    }

    #[test]
    fn test_unknown_tokens_are_kept_without_successors() {
        let chain = MarkovChain::train(["ab"], 2, false);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = chain
            .augment(&[tokens(&["zz"])], 4, ChainSelection::Freq, &mut rng)
            .unwrap();
        assert_eq!(out, vec![tokens(&["zz"])]);
    }

    #[test]
    fn test_record_seed_depends_on_id() {
        assert_eq!(record_seed(5, "17"), record_seed(5, "17"));
        assert_ne!(record_seed(5, "17"), record_seed(5, "18"));
    }
}
