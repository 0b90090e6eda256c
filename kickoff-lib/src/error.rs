//! Error types for Kickoff

use thiserror::Error;

/// Result type alias for Kickoff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while interpreting a constraint
///
/// A low-confidence interpretation is not an error; it is reported as
/// [`Outcome::Unclear`](crate::render::Outcome::Unclear).
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to reach or decode the embedding provider
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Failed to store or retrieve from the corpus store
    #[error("store error: {0}")]
    Store(String),

    /// Missing or malformed query text
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Returns `true` for infrastructure faults raised by an external
    /// collaborator (embedding provider or corpus store).
    #[must_use]
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, Self::Embedding(_) | Self::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_failures_are_distinguished() {
        assert!(Error::Embedding("rate limited".into()).is_collaborator_failure());
        assert!(Error::Store("length mismatch".into()).is_collaborator_failure());
        assert!(!Error::InvalidInput("empty query".into()).is_collaborator_failure());
    }

    #[test]
    fn test_display_carries_category() {
        let err = Error::InvalidInput("query must not be blank".into());
        assert_eq!(err.to_string(), "invalid input: query must not be blank");
    }
}
