use kinematch_dtw::DtwError;

/// Errors from greedy pattern extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Returned when a template and the target disagree on channel count.
    #[error("template {template} has {got} channels, target has {expected}")]
    ChannelMismatch {
        /// Zero-based index of the offending template.
        template: usize,
        /// Channel count of the target.
        expected: usize,
        /// Channel count of the template.
        got: usize,
    },

    /// Wraps an alignment error raised by a subsequence search.
    #[error("search failed: {0}")]
    Dtw(#[from] DtwError),
}
