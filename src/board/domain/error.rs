//! Error types for board domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The email address is not usable as a notification recipient.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// Ranks start at one.
    #[error("invalid task order {0}, expected a positive integer")]
    InvalidOrder(u32),

    /// No rank exists past the current maximum.
    #[error("task order overflow: column has no rank left to assign")]
    OrderOverflow,
}

/// Error returned while parsing column states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown column state: {0}")]
pub struct ParseColumnStateError(pub String);
