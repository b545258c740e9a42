//! Value reconstruction from the position candidate map

use super::positions::PositionCandidateMap;
use crate::domain::{BitVector, RecordId, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Classification of one attempted target value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessOutcome {
    /// The only surviving candidate is the true value
    CorrectUnique,
    /// The true value survives among others
    CorrectAmbiguous,
    /// Candidates survive but the true value is not among them
    Wrong,
    /// Every candidate was eliminated
    NoGuess,
}

impl GuessOutcome {
    fn classify(truth: &str, survivors: &BTreeSet<String>) -> Self {
        if survivors.is_empty() {
            Self::NoGuess
        } else if !survivors.contains(truth) {
            Self::Wrong
        } else if survivors.len() == 1 {
            Self::CorrectUnique
        } else {
            Self::CorrectAmbiguous
        }
    }
}

/// Outcome counts over the attempted target values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GuessCounts {
    pub correct_unique: usize,
    pub correct_ambiguous: usize,
    pub wrong: usize,
    pub no_guess: usize,
}

impl GuessCounts {
    fn record(&mut self, outcome: GuessOutcome) {
        match outcome {
            GuessOutcome::CorrectUnique => self.correct_unique += 1,
            GuessOutcome::CorrectAmbiguous => self.correct_ambiguous += 1,
            GuessOutcome::Wrong => self.wrong += 1,
            GuessOutcome::NoGuess => self.no_guess += 1,
        }
    }

    /// Number of attempted values
    pub fn total(&self) -> usize {
        self.correct_unique + self.correct_ambiguous + self.wrong + self.no_guess
    }
}

/// Guess linking an encoded record to a plaintext record
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentEdge {
    pub encoded_id: RecordId,
    pub plaintext_id: RecordId,
    /// Bit vector of the encoded record
    pub encoded_value: BitVector,
    /// Plaintext value the encoded record was built from
    pub true_value: String,
    pub guessed_value: String,
    pub confidence: f64,
}

/// Result of attempting one unique target value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub true_value: String,
    /// Encoded record chosen to represent the value
    pub encoded_id: RecordId,
    pub outcome: GuessOutcome,
    pub survivors: BTreeSet<String>,
}

/// Everything one reconstruction pass produced
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    pub counts: GuessCounts,
    pub outcomes: Vec<TargetOutcome>,
    pub edges: Vec<AssignmentEdge>,
}

/// Inputs of a reconstruction pass
pub struct ReconstructionInput<'a> {
    /// The most frequent plaintext values to reconstruct
    pub targets: &'a [String],
    /// Encoded bit vector of each build record
    pub encoded: &'a BTreeMap<RecordId, BitVector>,
    /// True plaintext value of each build record
    pub true_values: &'a HashMap<RecordId, String>,
    /// Plaintext record ids holding each analysis value
    pub value_to_ids: &'a HashMap<String, BTreeSet<RecordId>>,
}

/// Guesses target values of encoded records
///
/// Records are visited in ascending id order and each unique target value is
/// attempted once, on the first record holding it. All targets start as
/// candidates; every one bit with a non-empty candidate map removes the
/// targets containing none of that position's tokens as a substring. An
/// emptied candidate set ends the attempt as a no-guess.
///
/// `on_record` is called with the number of records visited so far and may
/// abort the pass.
pub fn reconstruct(
    input: &ReconstructionInput<'_>,
    position_map: &PositionCandidateMap,
    mut on_record: impl FnMut(usize) -> Result<()>,
) -> Result<Reconstruction> {
    let target_set: BTreeSet<&str> = input.targets.iter().map(String::as_str).collect();
    let mut attempted: BTreeSet<&str> = BTreeSet::new();
    let mut result = Reconstruction::default();

    tracing::info!(
        targets = input.targets.len(),
        records = input.encoded.len(),
        "Reconstructing most frequent values"
    );

    for (visited, (rec_id, bv)) in input.encoded.iter().enumerate() {
        on_record(visited + 1)?;

        let Some(truth) = input.true_values.get(rec_id) else {
            continue;
        };
        if !target_set.contains(truth.as_str()) || attempted.contains(truth.as_str()) {
            continue;
        }
        attempted.insert(truth.as_str());

        let survivors = surviving_candidates(bv, input.targets, position_map);
        let outcome = GuessOutcome::classify(truth, &survivors);
        result.counts.record(outcome);

        tracing::debug!(
            record = %rec_id,
            true_value = %truth,
            ?outcome,
            survivors = survivors.len(),
            "Attempted value"
        );

        for guess in &survivors {
            for plain_id in input.value_to_ids.get(guess).into_iter().flatten() {
                result.edges.push(AssignmentEdge {
                    encoded_id: rec_id.clone(),
                    plaintext_id: plain_id.clone(),
                    encoded_value: bv.clone(),
                    true_value: truth.clone(),
                    guessed_value: guess.clone(),
                    confidence: 1.0,
                });
            }
        }

        result.outcomes.push(TargetOutcome {
            true_value: truth.clone(),
            encoded_id: rec_id.clone(),
            outcome,
            survivors,
        });
    }

    tracing::info!(
        correct_unique = result.counts.correct_unique,
        correct_ambiguous = result.counts.correct_ambiguous,
        wrong = result.counts.wrong,
        no_guess = result.counts.no_guess,
        edges = result.edges.len(),
        "Reconstruction complete"
    );

    Ok(result)
}

/// Targets consistent with every informative one bit of a vector
fn surviving_candidates(
    bv: &BitVector,
    targets: &[String],
    position_map: &PositionCandidateMap,
) -> BTreeSet<String> {
    let mut survivors: BTreeSet<String> = targets.iter().cloned().collect();

    for pos in bv.iter_ones() {
        if let Some(tokens) = position_map.candidates(pos).filter(|c| !c.is_empty()) {
            survivors.retain(|value| tokens.keys().any(|t| value.contains(t.as_str())));
        }
        if survivors.is_empty() {
            break;
        }
    }

    survivors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attack::frequency::AlignedPair;
    use crate::core::attack::positions::analyze;

    fn id(s: &str) -> RecordId {
        RecordId::new(s).unwrap()
    }

    fn bv(s: &str) -> BitVector {
        BitVector::from_01(s).unwrap()
    }

    struct Fixture {
        targets: Vec<String>,
        encoded: BTreeMap<RecordId, BitVector>,
        true_values: HashMap<RecordId, String>,
        value_to_ids: HashMap<String, BTreeSet<RecordId>>,
    }

    impl Fixture {
        fn new(rows: &[(&str, &str, &str)], targets: &[&str]) -> Self {
            let mut fixture = Fixture {
                targets: targets.iter().map(|s| s.to_string()).collect(),
                encoded: BTreeMap::new(),
                true_values: HashMap::new(),
                value_to_ids: HashMap::new(),
            };
            for (rid, bits, value) in rows {
                fixture.encoded.insert(id(rid), bv(bits));
                fixture.true_values.insert(id(rid), value.to_string());
                fixture
                    .value_to_ids
                    .entry(value.to_string())
                    .or_default()
                    .insert(id(rid));
            }
            fixture
        }

        fn input(&self) -> ReconstructionInput<'_> {
            ReconstructionInput {
                targets: &self.targets,
                encoded: &self.encoded,
                true_values: &self.true_values,
                value_to_ids: &self.value_to_ids,
            }
        }
    }

    fn pair(bits: &str, value: &str) -> AlignedPair {
        AlignedPair {
            encoded: bv(bits),
            encoded_freq: 2,
            plaintext: value.to_string(),
            plaintext_freq: 2,
        }
    }

    #[test]
    fn test_unique_guess_emits_edges_per_plaintext_id() {
        // Position 0 holds "ab", position 1 holds "xy".
        let map = analyze(&[pair("10", "ab"), pair("01", "xy")], 2, 2);
        let fixture = Fixture::new(
            &[("1", "10", "ab"), ("2", "01", "xy"), ("3", "10", "ab")],
            &["ab", "xy"],
        );
        let result = reconstruct(&fixture.input(), &map, |_| Ok(())).unwrap();

        assert_eq!(result.counts.correct_unique, 2);
        assert_eq!(result.counts.total(), 2);
        // "ab" resolved once (record 1) and linked to plaintext ids 1 and 3.
        let ab_edges: Vec<_> = result.edges.iter().filter(|e| e.true_value == "ab").collect();
        assert_eq!(ab_edges.len(), 2);
        assert!(ab_edges.iter().all(|e| e.encoded_id == id("1")));
        assert!(ab_edges.iter().all(|e| e.confidence == 1.0));
    }

    #[test]
    fn test_uninformative_vector_is_ambiguous() {
        let map = analyze(&[], 2, 2);
        let fixture = Fixture::new(&[("1", "11", "ab"), ("2", "11", "xy")], &["ab", "xy"]);
        let result = reconstruct(&fixture.input(), &map, |_| Ok(())).unwrap();
        assert_eq!(result.counts.correct_ambiguous, 2);
    }

    #[test]
    fn test_conflicting_positions_yield_no_guess() {
        let map = analyze(&[pair("10", "ab"), pair("01", "xy")], 2, 2);
        let fixture = Fixture::new(&[("1", "11", "ab")], &["ab", "xy"]);
        let result = reconstruct(&fixture.input(), &map, |_| Ok(())).unwrap();
        assert_eq!(result.counts.no_guess, 1);
        assert!(result.edges.is_empty());
        assert_eq!(result.outcomes[0].outcome, GuessOutcome::NoGuess);
    }

    #[test]
    fn test_wrong_guess() {
        let map = analyze(&[pair("10", "ab"), pair("01", "xy")], 2, 2);
        // Record holding "ab" was encoded like "xy".
        let fixture = Fixture::new(&[("1", "01", "ab")], &["ab", "xy"]);
        let result = reconstruct(&fixture.input(), &map, |_| Ok(())).unwrap();
        assert_eq!(result.counts.wrong, 1);
    }

    #[test]
    fn test_non_target_records_are_skipped() {
        let map = analyze(&[], 2, 2);
        let fixture = Fixture::new(&[("1", "10", "zz")], &["ab"]);
        let result = reconstruct(&fixture.input(), &map, |_| Ok(())).unwrap();
        assert_eq!(result.counts.total(), 0);
    }

    #[test]
    fn test_callback_error_aborts() {
        let map = analyze(&[], 2, 2);
        let fixture = Fixture::new(&[("1", "10", "ab")], &["ab"]);
        let result = reconstruct(&fixture.input(), &map, |_| {
            Err(crate::domain::BfAttackError::Shutdown("stop".to_string()))
        });
        assert!(result.is_err());
    }
}
