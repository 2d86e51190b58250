//! Global band, local step weights and channel generalization for DTW.

use std::ops::RangeInclusive;

/// Sakoe-Chiba style band expressed as a fraction of the longer sequence.
///
/// The radius for an `n × m` alignment is
/// `max(|n - m|, round((max(n, m) - 1) * width_factor))`, so the end cell
/// `(n, m)` is always reachable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandConstraint {
    width_factor: f64,
}

impl BandConstraint {
    /// A band that admits every cell.
    pub const UNCONSTRAINED: Self = Self { width_factor: 1.0 };

    /// Create a band from a width factor. Values outside `[0, 1]` are clamped;
    /// NaN is treated as `0`.
    #[must_use]
    pub fn new(width_factor: f64) -> Self {
        let width_factor = if width_factor.is_nan() {
            0.0
        } else {
            width_factor.clamp(0.0, 1.0)
        };
        Self { width_factor }
    }

    /// Return the clamped width factor.
    #[must_use]
    pub fn width_factor(&self) -> f64 {
        self.width_factor
    }

    /// Band radius for an `n × m` alignment.
    #[must_use]
    pub fn radius(&self, n: usize, m: usize) -> usize {
        let longest = n.max(m);
        let scaled = ((longest.saturating_sub(1)) as f64 * self.width_factor).round() as usize;
        n.abs_diff(m).max(scaled)
    }

    /// Columns evaluated in 1-based row `row` of a matrix with `m` columns.
    #[must_use]
    pub fn columns(&self, row: usize, m: usize, radius: usize) -> RangeInclusive<usize> {
        row.saturating_sub(radius).max(1)..=(row + radius).min(m)
    }
}

impl Default for BandConstraint {
    fn default() -> Self {
        Self::new(0.1)
    }
}

/// Multipliers applied to the predecessor costs of a DTW step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocalWeights {
    /// `(1, 1, 1)`.
    #[default]
    Symmetric,
    /// `(1, 1, 2)`: diagonal steps cost double.
    Asymmetric,
}

impl LocalWeights {
    /// Return `(horizontal, vertical, diagonal)`.
    #[must_use]
    pub fn triple(self) -> (f64, f64, f64) {
        match self {
            Self::Symmetric => (1.0, 1.0, 1.0),
            Self::Asymmetric => (1.0, 1.0, 2.0),
        }
    }
}

/// How multichannel sequences are aligned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Generalization {
    /// One warping path over full rows.
    #[default]
    Dependent,
    /// One warping path per channel; costs are summed.
    Independent,
}
