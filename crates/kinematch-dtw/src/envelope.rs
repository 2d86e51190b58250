//! Globally clamped query envelope and the LB_Keogh lower bound.

use crate::error::DtwError;
use crate::metric::DistanceMetric;
use crate::sequence::SequenceView;

/// Per-row `[lower, upper]` bounds around a query window.
///
/// Unlike the classical sliding-window envelope, each bound is the query
/// value shifted by a fixed radius and then clamped to the window's own
/// per-channel global minimum and maximum.
#[derive(Debug, Clone)]
pub struct Envelope {
    upper: Vec<f64>,
    lower: Vec<f64>,
    channels: usize,
}

impl Envelope {
    /// Build the envelope of `query` for `radius`.
    ///
    /// Negative or NaN radii are treated as `0`.
    #[must_use]
    pub fn around(query: SequenceView<'_>, radius: f64) -> Self {
        let radius = if radius.is_nan() { 0.0 } else { radius.max(0.0) };
        let channels = query.channels();

        let mut min = vec![f64::INFINITY; channels];
        let mut max = vec![f64::NEG_INFINITY; channels];
        for row in query.rows() {
            for (c, &v) in row.iter().enumerate() {
                min[c] = min[c].min(v);
                max[c] = max[c].max(v);
            }
        }

        let mut upper = Vec::with_capacity(query.as_slice().len());
        let mut lower = Vec::with_capacity(query.as_slice().len());
        for row in query.rows() {
            for (c, &v) in row.iter().enumerate() {
                lower.push((v - radius).max(min[c]));
                upper.push((v + radius).min(max[c]));
            }
        }

        Self {
            upper,
            lower,
            channels,
        }
    }

    /// Return the upper bounds, row-major.
    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Return the lower bounds, row-major.
    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Return the number of rows covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upper.len() / self.channels
    }

    /// Return true if the envelope covers no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }

    /// Return the channel count.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }
}

/// LB_Keogh lower bound of `candidate` against a query `envelope`.
///
/// Values inside `[lower, upper]` contribute nothing. Outside, the excess is
/// accumulated in the shape of `metric`: absolute excess for Manhattan,
/// squared excess for squared Euclidean, and the root of the squared sum for
/// Euclidean.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::UnsupportedMetric`] | `metric` is [`DistanceMetric::Custom`] |
/// | [`DtwError::ChannelMismatch`] | Channel counts differ |
/// | [`DtwError::LengthMismatch`] | Row counts differ |
pub fn lb_keogh(
    candidate: SequenceView<'_>,
    envelope: &Envelope,
    metric: &DistanceMetric,
) -> Result<f64, DtwError> {
    let squared = match metric {
        DistanceMetric::Manhattan => false,
        DistanceMetric::Euclidean | DistanceMetric::SquaredEuclidean => true,
        DistanceMetric::Custom(custom) => {
            return Err(DtwError::UnsupportedMetric {
                name: custom.name().to_string(),
            });
        }
    };
    if candidate.channels() != envelope.channels {
        return Err(DtwError::ChannelMismatch {
            left: candidate.channels(),
            right: envelope.channels,
        });
    }
    if candidate.len() != envelope.len() {
        return Err(DtwError::LengthMismatch {
            left: candidate.len(),
            right: envelope.len(),
        });
    }

    let excess = candidate
        .as_slice()
        .iter()
        .zip(envelope.lower.iter().zip(&envelope.upper))
        .map(|(&c, (&lo, &hi))| {
            if c > hi {
                c - hi
            } else if c < lo {
                lo - c
            } else {
                0.0
            }
        });

    let sum: f64 = if squared {
        excess.map(|e| e * e).sum()
    } else {
        excess.sum()
    };
    if matches!(metric, DistanceMetric::Euclidean) {
        Ok(sum.sqrt())
    } else {
        Ok(sum)
    }
}
