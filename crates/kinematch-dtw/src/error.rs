//! Error types for sequence validation, alignment and preprocessing.

/// Errors from sequence validation, DTW alignment and lower-bound computation.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when a sequence has no rows.
    #[error("sequence must be non-empty")]
    EmptySequence,

    /// Returned when a sequence row has no channels.
    #[error("sequence rows must have at least one channel")]
    ZeroChannels,

    /// Returned when a row has a different channel count than the first row.
    #[error("row {row} has {got} channels, expected {expected}")]
    InconsistentChannels {
        /// Zero-based index of the offending row.
        row: usize,
        /// Channel count of the first row.
        expected: usize,
        /// Channel count of the offending row.
        got: usize,
    },

    /// Returned when a sequence contains NaN, infinity, or negative infinity.
    #[error("sequence contains non-finite value at row {row}, channel {channel}")]
    NonFiniteValue {
        /// Row of the first non-finite value found.
        row: usize,
        /// Channel of the first non-finite value found.
        channel: usize,
    },

    /// Returned when two sequences that must be compared have different channel counts.
    #[error("channel count mismatch: {left} vs {right}")]
    ChannelMismatch {
        /// Channel count of the left operand.
        left: usize,
        /// Channel count of the right operand.
        right: usize,
    },

    /// Returned when a candidate and an envelope have different lengths.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the left operand.
        left: usize,
        /// Length of the right operand.
        right: usize,
    },

    /// Returned when a lower bound is requested for a metric without a known bound.
    #[error("lower bound is not defined for metric \"{name}\"")]
    UnsupportedMetric {
        /// Name of the metric.
        name: String,
    },
}

/// Errors from dataset normalization.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    /// Returned when normalization is called with no sequences.
    #[error("cannot normalize an empty dataset")]
    EmptyDataset,

    /// Returned when the sequences of a dataset disagree on channel count.
    #[error("sequence {index} has {got} channels, expected {expected}")]
    ChannelMismatch {
        /// Index of the offending sequence.
        index: usize,
        /// Channel count of the first sequence.
        expected: usize,
        /// Channel count of the offending sequence.
        got: usize,
    },

    /// Returned when a channel holds the same value across the whole dataset.
    #[error("channel {channel} is constant ({value}) across the dataset")]
    ConstantChannel {
        /// The constant channel.
        channel: usize,
        /// The constant value.
        value: f64,
    },
}
