//! Linear resampling of multichannel sequences.

use crate::sequence::{Sequence, SequenceView};

/// Fractional positions closer than this to a sample snap onto it.
const SNAP_EPSILON: f64 = 1e-6;

/// Which side of a length mismatch gets resampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Shrink the longer sequence to the shorter length.
    #[default]
    ToSmaller,
    /// Stretch the shorter sequence to the longer length.
    ToBigger,
}

/// Resample `sequence` to `new_len` rows by per-channel linear interpolation.
///
/// `new_len` is raised to at least 2. Resampling to the current length, or
/// resampling an empty sequence, returns an unchanged copy.
#[must_use = "returns a new resampled sequence; the input is unchanged"]
pub fn resample(sequence: SequenceView<'_>, new_len: usize) -> Sequence {
    let old_len = sequence.len();
    if new_len == old_len || old_len == 0 {
        return sequence.to_sequence();
    }
    let new_len = new_len.max(2);
    let channels = sequence.channels();
    let last = old_len.saturating_sub(1);
    let delta = last as f64 / (new_len - 1) as f64;

    let mut data = Vec::with_capacity(new_len * channels);
    for i in 0..new_len {
        let position = i as f64 * delta;
        let lower = (position.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        let fraction = position - lower as f64;

        let a = sequence.row(lower);
        if fraction < SNAP_EPSILON {
            data.extend_from_slice(a);
        } else {
            let b = sequence.row(upper);
            data.extend(a.iter().zip(b).map(|(x, y)| x + fraction * (y - x)));
        }
    }
    Sequence::from_flat_unchecked(data, channels)
}

/// A sequence that was either left alone or resampled.
#[derive(Debug, Clone)]
pub enum Resampled<'a> {
    /// Unchanged input.
    Borrowed(SequenceView<'a>),
    /// Resampled copy.
    Owned(Sequence),
}

impl Resampled<'_> {
    /// Borrow as a view.
    #[must_use]
    pub fn as_view(&self) -> SequenceView<'_> {
        match self {
            Self::Borrowed(view) => *view,
            Self::Owned(sequence) => sequence.as_view(),
        }
    }
}

/// Bring `x` and `y` to a common length.
///
/// Only the sequence on the resampled side of `strategy` is touched; equal
/// lengths leave both unchanged.
#[must_use]
pub fn reconcile<'a>(
    x: SequenceView<'a>,
    y: SequenceView<'a>,
    strategy: Interpolation,
) -> (Resampled<'a>, Resampled<'a>) {
    let (n, m) = (x.len(), y.len());
    if n == m {
        return (Resampled::Borrowed(x), Resampled::Borrowed(y));
    }
    let x_is_shorter = n < m;
    let resize_x = match strategy {
        Interpolation::ToSmaller => !x_is_shorter,
        Interpolation::ToBigger => x_is_shorter,
    };
    let target_len = match strategy {
        Interpolation::ToSmaller => n.min(m),
        Interpolation::ToBigger => n.max(m),
    };
    if resize_x {
        (Resampled::Owned(resample(x, target_len)), Resampled::Borrowed(y))
    } else {
        (Resampled::Borrowed(x), Resampled::Owned(resample(y, target_len)))
    }
}
