//! Storeplan key types.
//!
//! This crate defines the values a storage executor works with when it
//! replays a migration plan or scans an index:
//!
//! - [`key`] - Native key values and their engine ordering
//! - [`range`] - Key ranges and the typestate [`RangeBuilder`]
//! - [`error`] - Key and range error types

pub mod error;
pub mod key;
pub mod range;

pub use error::Error;
pub use key::Key;
pub use range::{Bounded, HasLower, HasUpper, KeyRange, NoBound, RangeBuilder};

/// Result type for key and range construction.
pub type Result<T> = std::result::Result<T, Error>;
