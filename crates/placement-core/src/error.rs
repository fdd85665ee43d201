//! # Error Types
//!
//! Errors raised while constructing core primitives. All errors use
//! `thiserror` and carry the offending input so callers can report it.

use thiserror::Error;

/// Errors from core primitive construction and parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An identifier failed validation.
    #[error("invalid identifier {input:?}: {reason}")]
    InvalidIdentifier {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A calendar date could not be parsed.
    #[error("invalid calendar date {input:?}: {reason}")]
    InvalidDate {
        /// The rejected input.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A timestamp could not be parsed.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },
}
