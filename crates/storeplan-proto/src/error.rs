//! Key and range error types.

use thiserror::Error;

/// Errors raised while constructing keys or key ranges.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The lower bound sorts after the upper bound.
    #[error("invalid key range: lower bound is greater than upper bound")]
    InvertedRange,

    /// Both bounds are the same key and at least one of them is open.
    #[error("invalid key range: bounds are equal and at least one is open")]
    EmptyRange,

    /// A key value the storage engine cannot order.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
