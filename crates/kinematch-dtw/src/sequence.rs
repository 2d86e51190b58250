//! Multichannel sequence types with validation guarantees.

use std::ops::RangeInclusive;

use crate::error::DtwError;

/// Owned, validated multichannel sequence.
///
/// Rows are stored contiguously in row-major order: row `i` occupies
/// `data[i * channels..(i + 1) * channels]`. A sequence built through the
/// public constructors is non-empty, has at least one channel and holds
/// only finite values. The one exception is [`Sequence::mask`], which
/// overwrites rows of a working copy with `+inf`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    data: Vec<f64>,
    channels: usize,
}

impl Sequence {
    /// Build a sequence from a list of rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | `rows` is empty |
    /// | [`DtwError::ZeroChannels`] | The first row is empty |
    /// | [`DtwError::InconsistentChannels`] | A row differs in length from the first |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DtwError> {
        let Some(first) = rows.first() else {
            return Err(DtwError::EmptySequence);
        };
        let channels = first.len();
        if channels == 0 {
            return Err(DtwError::ZeroChannels);
        }

        let mut data = Vec::with_capacity(rows.len() * channels);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != channels {
                return Err(DtwError::InconsistentChannels {
                    row,
                    expected: channels,
                    got: values.len(),
                });
            }
            data.extend(values);
        }
        Self::from_flat(data, channels)
    }

    /// Build a sequence from a row-major buffer.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | `data` is empty |
    /// | [`DtwError::ZeroChannels`] | `channels` is zero |
    /// | [`DtwError::InconsistentChannels`] | `data.len()` is not a multiple of `channels` |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn from_flat(data: Vec<f64>, channels: usize) -> Result<Self, DtwError> {
        if data.is_empty() {
            return Err(DtwError::EmptySequence);
        }
        if channels == 0 {
            return Err(DtwError::ZeroChannels);
        }
        if data.len() % channels != 0 {
            return Err(DtwError::InconsistentChannels {
                row: data.len() / channels,
                expected: channels,
                got: data.len() % channels,
            });
        }
        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(DtwError::NonFiniteValue {
                row: index / channels,
                channel: index % channels,
            });
        }
        Ok(Self { data, channels })
    }

    /// Build a single-channel sequence.
    ///
    /// # Errors
    ///
    /// Same as [`Sequence::from_flat`] with one channel.
    pub fn univariate(values: Vec<f64>) -> Result<Self, DtwError> {
        Self::from_flat(values, 1)
    }

    /// Build a sequence without validation. Masked (`+inf`) rows are allowed.
    pub(crate) fn from_flat_unchecked(data: Vec<f64>, channels: usize) -> Self {
        debug_assert!(channels > 0 && data.len() % channels == 0);
        Self { data, channels }
    }

    /// Borrow this sequence as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> SequenceView<'_> {
        SequenceView {
            data: &self.data,
            channels: self.channels,
        }
    }

    /// Return the number of rows (time steps).
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.channels
    }

    /// Return true if the sequence has no rows.
    ///
    /// Always `false` for sequences built through the public constructors.
    /// Provided to satisfy the `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the channel count.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Return row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.channels..(i + 1) * self.channels]
    }

    /// Return the row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Overwrite every channel of the rows in `range` with `+inf`.
    ///
    /// Indices past the end are ignored; an inverted range masks nothing.
    /// Masked rows are never selected by a subsequence search.
    pub fn mask(&mut self, range: RangeInclusive<usize>) {
        let (start, end) = range.into_inner();
        let len = self.len();
        if start > end || start >= len {
            return;
        }
        let end = end.min(len - 1);
        self.data[start * self.channels..(end + 1) * self.channels].fill(f64::INFINITY);
    }

    /// Return true if row `i` was masked.
    #[must_use]
    pub fn is_masked(&self, i: usize) -> bool {
        self.row(i).iter().any(|v| v.is_infinite())
    }

    /// Consume and return the row-major buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }
}

impl TryFrom<Vec<Vec<f64>>> for Sequence {
    type Error = DtwError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

/// Borrowed view over a contiguous run of rows. Zero-copy.
#[derive(Debug, Clone, Copy)]
pub struct SequenceView<'a> {
    data: &'a [f64],
    channels: usize,
}

impl<'a> SequenceView<'a> {
    /// Return the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.channels
    }

    /// Return true if the view has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the channel count.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Return the row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }

    /// Return row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &'a [f64] {
        &self.data[i * self.channels..(i + 1) * self.channels]
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> std::slice::ChunksExact<'a, f64> {
        self.data.chunks_exact(self.channels)
    }

    /// Return the `len` rows starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `start + len > self.len()`.
    #[must_use]
    pub fn window(&self, start: usize, len: usize) -> SequenceView<'a> {
        SequenceView {
            data: &self.data[start * self.channels..(start + len) * self.channels],
            channels: self.channels,
        }
    }

    /// Extract channel `c` as an owned single-channel sequence.
    #[must_use]
    pub fn channel(&self, c: usize) -> Sequence {
        let values: Vec<f64> = self.rows().map(|row| row[c]).collect();
        Sequence::from_flat_unchecked(values, 1)
    }

    /// Copy the viewed rows into an owned sequence.
    #[must_use]
    pub fn to_sequence(&self) -> Sequence {
        Sequence::from_flat_unchecked(self.data.to_vec(), self.channels)
    }
}
