//! Error types for ID parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or validating IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty.
    #[error("ID cannot be empty")]
    Empty,

    /// The ID contains whitespace.
    #[error("ID cannot contain whitespace: '{0}'")]
    Whitespace(String),

    /// The ID contains a character that would change the meaning of a URL.
    #[error("ID contains reserved character '{character}': '{id}'")]
    ReservedCharacter { character: char, id: String },
}
