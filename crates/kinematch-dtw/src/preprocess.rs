//! Dataset-wide min-max normalization.

use crate::error::PreprocessError;
use crate::sequence::Sequence;

/// Per-channel minimum and maximum across every sequence of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBounds {
    /// Minimum per channel.
    pub min: Vec<f64>,
    /// Maximum per channel.
    pub max: Vec<f64>,
}

impl ChannelBounds {
    /// Scan `dataset` for per-channel extremes.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PreprocessError::EmptyDataset`] | `dataset` is empty |
    /// | [`PreprocessError::ChannelMismatch`] | Sequences disagree on channel count |
    pub fn of(dataset: &[Sequence]) -> Result<Self, PreprocessError> {
        let Some(first) = dataset.first() else {
            return Err(PreprocessError::EmptyDataset);
        };
        let channels = first.channels();
        let mut min = vec![f64::INFINITY; channels];
        let mut max = vec![f64::NEG_INFINITY; channels];

        for (index, sequence) in dataset.iter().enumerate() {
            if sequence.channels() != channels {
                return Err(PreprocessError::ChannelMismatch {
                    index,
                    expected: channels,
                    got: sequence.channels(),
                });
            }
            for row in sequence.as_view().rows() {
                for (c, &v) in row.iter().enumerate() {
                    min[c] = min[c].min(v);
                    max[c] = max[c].max(v);
                }
            }
        }
        Ok(Self { min, max })
    }
}

/// Rescale every channel to `[-1, 1]` using extremes shared by the whole dataset.
///
/// Templates and the session they are matched against should be normalized
/// together so that their values stay comparable:
/// `v' = 2 * (v - min) / (max - min) - 1`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PreprocessError::EmptyDataset`] | `dataset` is empty |
/// | [`PreprocessError::ChannelMismatch`] | Sequences disagree on channel count |
/// | [`PreprocessError::ConstantChannel`] | A channel never varies |
#[must_use = "returns new normalized sequences; the originals are unchanged"]
pub fn min_max_normalize(dataset: &[Sequence]) -> Result<Vec<Sequence>, PreprocessError> {
    let bounds = ChannelBounds::of(dataset)?;
    if let Some(channel) = (0..bounds.min.len()).find(|&c| bounds.max[c] == bounds.min[c]) {
        return Err(PreprocessError::ConstantChannel {
            channel,
            value: bounds.min[channel],
        });
    }

    let normalized = dataset
        .iter()
        .map(|sequence| {
            let channels = sequence.channels();
            let data: Vec<f64> = sequence
                .as_slice()
                .iter()
                .enumerate()
                .map(|(k, &v)| {
                    let c = k % channels;
                    2.0 * (v - bounds.min[c]) / (bounds.max[c] - bounds.min[c]) - 1.0
                })
                .collect();
            Sequence::from_flat_unchecked(data, channels)
        })
        .collect();
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_span_whole_dataset() {
        let a = Sequence::from_rows(vec![vec![0.0, 5.0], vec![2.0, 6.0]]).unwrap();
        let b = Sequence::from_rows(vec![vec![-4.0, 9.0]]).unwrap();
        let bounds = ChannelBounds::of(&[a, b]).unwrap();
        assert_eq!(bounds.min, vec![-4.0, 5.0]);
        assert_eq!(bounds.max, vec![2.0, 9.0]);
    }

    #[test]
    fn normalizes_to_unit_range() {
        let a = Sequence::from_rows(vec![vec![0.0, 10.0], vec![5.0, 20.0]]).unwrap();
        let b = Sequence::from_rows(vec![vec![10.0, 30.0]]).unwrap();
        let out = min_max_normalize(&[a, b]).unwrap();
        assert_eq!(out[0].row(0), &[-1.0, -1.0]);
        assert_eq!(out[0].row(1), &[0.0, 0.0]);
        assert_eq!(out[1].row(0), &[1.0, 1.0]);
    }

    #[test]
    fn normalized_values_stay_in_range() {
        let a = Sequence::univariate(vec![3.0, -7.5, 0.25, 12.0]).unwrap();
        let b = Sequence::univariate(vec![1.0, 2.0]).unwrap();
        let out = min_max_normalize(&[a, b]).unwrap();
        for s in &out {
            assert!(s.as_slice().iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn rejects_empty_dataset() {
        assert!(matches!(min_max_normalize(&[]), Err(PreprocessError::EmptyDataset)));
    }

    #[test]
    fn rejects_constant_channel() {
        let a = Sequence::from_rows(vec![vec![1.0, 4.0], vec![2.0, 4.0]]).unwrap();
        let result = min_max_normalize(&[a]);
        assert!(matches!(
            result,
            Err(PreprocessError::ConstantChannel { channel: 1, value }) if value == 4.0
        ));
    }

    #[test]
    fn rejects_channel_mismatch() {
        let a = Sequence::univariate(vec![1.0, 2.0]).unwrap();
        let b = Sequence::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            min_max_normalize(&[a, b]),
            Err(PreprocessError::ChannelMismatch { index: 1, expected: 1, got: 2 })
        ));
    }
}
