//! Record domain model and q-gram tokenisation

use super::ids::RecordId;
use std::collections::BTreeSet;

/// Character used to pad attribute values before q-gram extraction
pub const PAD_CHAR: char = '\u{1}';

/// Set of q-gram tokens
///
/// Ordered so that iteration (and any seeded random selection driven by it)
/// is reproducible.
pub type TokenSet = BTreeSet<String>;

/// A loaded record
///
/// Holds every field of the input row, lowercased and trimmed, in column
/// order. Encoders pick the columns they are configured for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Normalised record identifier
    pub id: RecordId,

    /// All normalised field values in column order
    pub fields: Vec<String>,
}

impl Record {
    /// Creates a record, normalising every field
    pub fn new(id: RecordId, fields: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            id,
            fields: fields.into_iter().map(|f| normalise(f.as_ref())).collect(),
        }
    }

    /// Value of one column, empty if the column is missing
    pub fn field(&self, column: usize) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// Selected column values joined by a single space
    pub fn joined_value(&self, columns: &[usize]) -> String {
        columns
            .iter()
            .map(|&c| self.field(c))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lowercases and trims an attribute value
pub fn normalise(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Extracts the set of q-grams of a value
///
/// With padding, `q - 1` pad characters are added at both ends, so any
/// non-empty value produces at least one token. Without padding a value
/// shorter than `q` produces no tokens.
///
/// # Examples
///
/// ```
/// use bfattack::domain::record::qgrams;
///
/// let tokens = qgrams("smith", 2, false);
/// assert_eq!(tokens.len(), 4);
/// assert!(tokens.contains("sm"));
/// assert!(qgrams("a", 2, false).is_empty());
/// ```
pub fn qgrams(value: &str, q: usize, padded: bool) -> TokenSet {
    qgram_sequence(value, q, padded).into_iter().collect()
}

/// Ordered q-grams of a value, duplicates kept
pub fn qgram_sequence(value: &str, q: usize, padded: bool) -> Vec<String> {
    let mut chars: Vec<char> = Vec::with_capacity(value.len() + 2 * q);
    if padded && q > 1 {
        chars.extend(std::iter::repeat(PAD_CHAR).take(q - 1));
    }
    chars.extend(value.chars());
    if padded && q > 1 {
        chars.extend(std::iter::repeat(PAD_CHAR).take(q - 1));
    }

    if q == 0 || chars.len() < q {
        return Vec::new();
    }
    chars.windows(q).map(|w| w.iter().collect()).collect()
}

/// Union of the q-gram sets of several values
pub fn qgrams_of_all<'a>(
    values: impl IntoIterator<Item = &'a str>,
    q: usize,
    padded: bool,
) -> TokenSet {
    let mut all = TokenSet::new();
    for value in values {
        all.extend(qgrams(value, q, padded));
    }
    all
}
