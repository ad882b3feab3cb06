//! Error types for model validation and decoding.

use thiserror::Error;

/// Errors raised while validating or decoding API payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// The response matched none of the shapes this endpoint is known to return.
    #[error("unrecognized response shape: {0}")]
    AmbiguousShape(String),
}

impl ModelError {
    /// Returns true if this error was raised before any request was made.
    pub fn is_validation(&self) -> bool {
        matches!(self, ModelError::MissingField { .. })
    }
}
