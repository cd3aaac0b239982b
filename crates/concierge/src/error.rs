//! Error types for concierge operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConciergeError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Nonexistent local time: {0}")]
    NonexistentLocalTime(String),
}

pub type Result<T> = std::result::Result<T, ConciergeError>;
