//! Domain identifier types with validation
//!
//! Record identifiers are compared across the encoded and plaintext datasets
//! during entity re-identification, so both sides must normalise them the
//! same way.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record identifier newtype wrapper
///
/// Identifiers are lowercased and trimmed. An identifier containing a hyphen
/// is reduced to the part after the first hyphen.
///
/// # Examples
///
/// ```
/// use bfattack::domain::ids::RecordId;
///
/// let id = RecordId::new(" Rec-00042 ").unwrap();
/// assert_eq!(id.as_str(), "00042");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new normalised RecordId
    ///
    /// # Returns
    ///
    /// Returns `Err` if the identifier is empty after normalisation
    pub fn new(id: impl AsRef<str>) -> Result<Self, String> {
        let mut id = id.as_ref().trim().to_lowercase();
        if let Some((_, rest)) = id.split_once('-') {
            id = rest.trim().to_string();
        }
        if id.is_empty() {
            return Err("Record ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the record ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("12345", "12345" ; "plain id")]
    #[test_case("  ABC12 ", "abc12" ; "trimmed and lowercased")]
    #[test_case("rec-77", "77" ; "hyphen prefix removed")]
    #[test_case("a-b-c", "b-c" ; "only first hyphen splits")]
    fn test_record_id_normalisation(input: &str, expected: &str) {
        assert_eq!(RecordId::new(input).unwrap().as_str(), expected);
    }

    #[test]
    fn test_record_id_empty() {
        assert!(RecordId::new("   ").is_err());
        assert!(RecordId::new("rec-").is_err());
    }

    #[test]
    fn test_record_id_ordering() {
        let a = RecordId::new("1").unwrap();
        let b = RecordId::new("2").unwrap();
        assert!(a < b);
    }
}
