// ABOUTME: Error types for building processors, loaders and field specs.
// ABOUTME: Running a pipeline never fails; these errors only surface at construction time.

use thiserror::Error;

/// Errors raised while configuring extraction, never while running it.
#[derive(Debug, Error)]
pub enum SiftError {
    /// A regular expression handed to a processor failed to compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A source document could not be parsed.
    #[error("failed to parse document: {0}")]
    Document(String),

    /// A field or record spec is malformed.
    #[error("invalid spec: {0}")]
    Spec(String),

    /// Encoded input could not be decoded.
    #[error("failed to decode: {0}")]
    Decode(String),
}

impl SiftError {
    /// Creates a Pattern error from a failed regex compilation.
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        SiftError::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a Document error from any displayable parse failure.
    pub fn document(err: impl std::fmt::Display) -> Self {
        SiftError::Document(err.to_string())
    }

    /// Creates a Spec error with a custom message.
    pub fn spec(msg: impl Into<String>) -> Self {
        SiftError::Spec(msg.into())
    }

    /// Creates a Decode error from any displayable failure.
    pub fn decode(err: impl std::fmt::Display) -> Self {
        SiftError::Decode(err.to_string())
    }
}

/// Result alias used across the sift crates.
pub type Result<T> = std::result::Result<T, SiftError>;
