//! Alignment cost newtype wrapper.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative accumulated alignment cost.
///
/// `+inf` means "no viable alignment" and must never be recorded as a match.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct AlignmentCost(f64);

impl AlignmentCost {
    /// Sentinel for searches that found nothing.
    pub const INFINITY: Self = Self(f64::INFINITY);

    /// Zero cost.
    pub const ZERO: Self = Self(0.0);

    /// Create a cost from a raw value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw cost value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return true if this cost denotes a viable alignment.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Divide by a length, e.g. the matched window or reference length.
    ///
    /// A zero length leaves the cost unchanged.
    #[must_use]
    pub fn per_step(self, len: usize) -> Self {
        if len == 0 {
            return self;
        }
        Self(self.0 / len as f64)
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for AlignmentCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
