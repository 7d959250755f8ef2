//! Unified error types for the domain layer
//!
//! Mutators report addressing failures through [`DomainError`]; parsing an
//! inbound game-state document reports through [`DocumentError`]. Neither is
//! ever fatal: callers log and carry on.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A roster slot, standee or condition code that does not exist
    #[error("Entity not found: {entity_type} {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for values that can never be applied.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// # Example
    /// ```ignore
    /// impl FromStr for Condition {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         Self::from_name(s).ok_or_else(|| DomainError::parse(format!("Unknown condition: {}", s)))
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Returns true for addressing failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure to read a game-state document as a whole.
///
/// Individual roster items that cannot be classified are not errors; they are
/// reported as [`crate::UnknownRosterEntry`] values alongside the parsed state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The payload is not valid JSON, or `currentList` is not an array.
    #[error("Invalid game state JSON: {0}")]
    InvalidJson(String),

    /// The payload parsed, but the top level is not a JSON object.
    #[error("Game state document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Serializing the current state failed.
    #[error("Failed to serialize game state: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson(err.to_string())
    }
}
