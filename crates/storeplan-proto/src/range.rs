//! Key ranges and the chainable range builder.
//!
//! [`RangeBuilder`] tracks which bounds have been set in its type parameter,
//! so a second lower (or upper) bound simply is not offered:
//!
//! ```text
//! NoBound --greater_*--> HasLower --less_*-----> Bounded
//!    |                                              ^
//!    +----less_*-------> HasUpper --greater_*-------+
//!    +----only---------------------------------------+
//! ```
//!
//! `HasLower`, `HasUpper` and `Bounded` can all be turned into a native
//! [`KeyRange`] with `build()`; nothing is converted before that call.

use crate::error::Error;
use std::marker::PhantomData;
use std::ops::{Bound, RangeBounds};

/// A scan range over keys of type `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange<K> {
    lower: Bound<K>,
    upper: Bound<K>,
}

impl<K> KeyRange<K> {
    /// Range matching exactly one key.
    pub fn only(key: K) -> Self
    where
        K: Clone,
    {
        Self {
            lower: Bound::Included(key.clone()),
            upper: Bound::Included(key),
        }
    }

    /// Range with only a lower bound.
    pub fn lower_bound(key: K, open: bool) -> Self {
        Self {
            lower: make_bound(key, open),
            upper: Bound::Unbounded,
        }
    }

    /// Range with only an upper bound.
    pub fn upper_bound(key: K, open: bool) -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: make_bound(key, open),
        }
    }

    /// Range with both bounds.
    ///
    /// Fails if `lower > upper`, or if they are equal and either side is open.
    pub fn bound(lower: K, upper: K, lower_open: bool, upper_open: bool) -> Result<Self, Error>
    where
        K: Ord,
    {
        Self::from_bounds(make_bound(lower, lower_open), make_bound(upper, upper_open))
    }

    fn from_bounds(lower: Bound<K>, upper: Bound<K>) -> Result<Self, Error>
    where
        K: Ord,
    {
        if let (Some((lo, lo_open)), Some((hi, hi_open))) = (bound_key(&lower), bound_key(&upper)) {
            if lo > hi {
                return Err(Error::InvertedRange);
            }
            if lo == hi && (lo_open || hi_open) {
                return Err(Error::EmptyRange);
            }
        }
        Ok(Self { lower, upper })
    }

    /// Lower bound of the range.
    pub fn lower(&self) -> Bound<&K> {
        self.lower.as_ref()
    }

    /// Upper bound of the range.
    pub fn upper(&self) -> Bound<&K> {
        self.upper.as_ref()
    }

    /// Check if the range has no lower and no upper bound.
    pub fn is_unbounded(&self) -> bool {
        matches!(
            (&self.lower, &self.upper),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }

    /// Split into the native `(lower, upper)` bound pair.
    pub fn into_bounds(self) -> (Bound<K>, Bound<K>) {
        (self.lower, self.upper)
    }

    /// Start a chainable builder.
    pub fn builder() -> RangeBuilder<K, NoBound> {
        RangeBuilder::new()
    }
}

impl<K> RangeBounds<K> for KeyRange<K> {
    fn start_bound(&self) -> Bound<&K> {
        self.lower.as_ref()
    }

    fn end_bound(&self) -> Bound<&K> {
        self.upper.as_ref()
    }
}

fn make_bound<K>(key: K, open: bool) -> Bound<K> {
    if open {
        Bound::Excluded(key)
    } else {
        Bound::Included(key)
    }
}

fn bound_key<K>(bound: &Bound<K>) -> Option<(&K, bool)> {
    match bound {
        Bound::Included(k) => Some((k, false)),
        Bound::Excluded(k) => Some((k, true)),
        Bound::Unbounded => None,
    }
}

/// Builder state: no bound set yet.
#[derive(Debug, Clone, Copy)]
pub struct NoBound;

/// Builder state: only the lower bound is set.
#[derive(Debug, Clone, Copy)]
pub struct HasLower;

/// Builder state: only the upper bound is set.
#[derive(Debug, Clone, Copy)]
pub struct HasUpper;

/// Builder state: both bounds are set.
#[derive(Debug, Clone, Copy)]
pub struct Bounded;

/// Chainable construction of a [`KeyRange`].
#[derive(Debug, Clone)]
pub struct RangeBuilder<K, S = NoBound> {
    lower: Bound<K>,
    upper: Bound<K>,
    _state: PhantomData<S>,
}

impl<K, S> RangeBuilder<K, S> {
    fn advance<T>(lower: Bound<K>, upper: Bound<K>) -> RangeBuilder<K, T> {
        RangeBuilder {
            lower,
            upper,
            _state: PhantomData,
        }
    }
}

impl<K> RangeBuilder<K, NoBound> {
    /// Create a builder with no bounds.
    pub fn new() -> Self {
        Self::advance(Bound::Unbounded, Bound::Unbounded)
    }

    /// Keys strictly greater than `key`.
    pub fn greater_than(self, key: K) -> RangeBuilder<K, HasLower> {
        Self::advance(Bound::Excluded(key), self.upper)
    }

    /// Keys greater than or equal to `key`.
    pub fn greater_or_equal(self, key: K) -> RangeBuilder<K, HasLower> {
        Self::advance(Bound::Included(key), self.upper)
    }

    /// Keys strictly less than `key`.
    pub fn less_than(self, key: K) -> RangeBuilder<K, HasUpper> {
        Self::advance(self.lower, Bound::Excluded(key))
    }

    /// Keys less than or equal to `key`.
    pub fn less_or_equal(self, key: K) -> RangeBuilder<K, HasUpper> {
        Self::advance(self.lower, Bound::Included(key))
    }

    /// Exactly `key`.
    pub fn only(self, key: K) -> RangeBuilder<K, Bounded>
    where
        K: Clone,
    {
        Self::advance(Bound::Included(key.clone()), Bound::Included(key))
    }
}

impl<K> Default for RangeBuilder<K, NoBound> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RangeBuilder<K, HasLower> {
    /// Close the range below `key`.
    pub fn less_than(self, key: K) -> RangeBuilder<K, Bounded> {
        Self::advance(self.lower, Bound::Excluded(key))
    }

    /// Close the range at `key`, inclusive.
    pub fn less_or_equal(self, key: K) -> RangeBuilder<K, Bounded> {
        Self::advance(self.lower, Bound::Included(key))
    }

    /// Convert to a lower-bounded range.
    pub fn build(self) -> KeyRange<K> {
        KeyRange {
            lower: self.lower,
            upper: Bound::Unbounded,
        }
    }
}

impl<K> RangeBuilder<K, HasUpper> {
    /// Close the range above `key`.
    pub fn greater_than(self, key: K) -> RangeBuilder<K, Bounded> {
        Self::advance(Bound::Excluded(key), self.upper)
    }

    /// Close the range at `key`, inclusive.
    pub fn greater_or_equal(self, key: K) -> RangeBuilder<K, Bounded> {
        Self::advance(Bound::Included(key), self.upper)
    }

    /// Convert to an upper-bounded range.
    pub fn build(self) -> KeyRange<K> {
        KeyRange {
            lower: Bound::Unbounded,
            upper: self.upper,
        }
    }
}

impl<K: Ord> RangeBuilder<K, Bounded> {
    /// Convert to a fully bounded range, rejecting empty or inverted bounds.
    pub fn build(self) -> Result<KeyRange<K>, Error> {
        KeyRange::from_bounds(self.lower, self.upper)
    }
}
