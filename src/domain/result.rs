//! Result type alias
//!
//! This module provides a convenient Result type alias that uses
//! `BfAttackError` as the error type.

use super::errors::BfAttackError;

/// Result type alias for attack operations
///
/// # Examples
///
/// ```
/// use bfattack::domain::result::Result;
/// use bfattack::domain::errors::BfAttackError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BfAttackError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BfAttackError>;
