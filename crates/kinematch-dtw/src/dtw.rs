//! Banded DTW alignment cost.

use rayon::prelude::*;
use tracing::instrument;

use crate::constraint::{BandConstraint, Generalization, LocalWeights};
use crate::cost::AlignmentCost;
use crate::error::DtwError;
use crate::metric::DistanceMetric;
use crate::sequence::SequenceView;

/// Immutable DTW configuration. Thread-safe and cheap to clone.
///
/// # Defaults
///
/// | Parameter        | Default                        |
/// |------------------|--------------------------------|
/// | `metric`         | [`DistanceMetric::Euclidean`]  |
/// | `weights`        | [`LocalWeights::Symmetric`]    |
/// | `band`           | width factor 0.1               |
/// | `generalization` | [`Generalization::Dependent`]  |
#[derive(Debug, Clone, Default)]
pub struct Dtw {
    metric: DistanceMetric,
    weights: LocalWeights,
    band: BandConstraint,
    generalization: Generalization,
}

impl Dtw {
    /// Create a DTW calculator with the given metric and default settings.
    #[must_use]
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            ..Self::default()
        }
    }

    /// Set the local step weights.
    #[must_use]
    pub fn with_weights(mut self, weights: LocalWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the global band constraint.
    #[must_use]
    pub fn with_band(mut self, band: BandConstraint) -> Self {
        self.band = band;
        self
    }

    /// Set the channel generalization strategy.
    #[must_use]
    pub fn with_generalization(mut self, generalization: Generalization) -> Self {
        self.generalization = generalization;
        self
    }

    /// Return the point distance.
    #[must_use]
    pub fn metric(&self) -> &DistanceMetric {
        &self.metric
    }

    /// Return the local step weights.
    #[must_use]
    pub fn weights(&self) -> LocalWeights {
        self.weights
    }

    /// Return the band constraint.
    #[must_use]
    pub fn band(&self) -> BandConstraint {
        self.band
    }

    /// Return the generalization strategy.
    #[must_use]
    pub fn generalization(&self) -> Generalization {
        self.generalization
    }

    /// Minimal accumulated cost of aligning `a` with `b`.
    ///
    /// Uses a rolling two-row buffer; runs in O(n * m) time and O(m) space.
    /// With [`Generalization::Independent`] one alignment per channel is run
    /// in parallel and the costs are summed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ChannelMismatch`] | `a` and `b` differ in channel count |
    /// | [`DtwError::EmptySequence`] | `a` or `b` has no rows |
    #[instrument(skip(self, a, b), fields(n = a.len(), m = b.len()))]
    pub fn align_cost(
        &self,
        a: SequenceView<'_>,
        b: SequenceView<'_>,
    ) -> Result<AlignmentCost, DtwError> {
        if a.channels() != b.channels() {
            return Err(DtwError::ChannelMismatch {
                left: a.channels(),
                right: b.channels(),
            });
        }
        if a.is_empty() || b.is_empty() {
            return Err(DtwError::EmptySequence);
        }
        let cost = match self.generalization {
            Generalization::Dependent => self.banded_cost(a, b),
            Generalization::Independent => (0..a.channels())
                .into_par_iter()
                .map(|c| {
                    let (x, y) = (a.channel(c), b.channel(c));
                    self.banded_cost(x.as_view(), y.as_view())
                })
                .sum(),
        };
        Ok(AlignmentCost::new(cost))
    }

    /// Rolling two-row DTW over full rows.
    ///
    /// Row buffers are `m + 1` wide; index 0 is the `+inf` boundary column.
    /// Cells outside the band keep `+inf` so no path can leave it.
    fn banded_cost(&self, a: SequenceView<'_>, b: SequenceView<'_>) -> f64 {
        let n = a.len();
        let m = b.len();
        let radius = self.band.radius(n, m);
        let (wh, wv, wd) = self.weights.triple();

        let mut prev = vec![f64::INFINITY; m + 1];
        let mut curr = vec![f64::INFINITY; m + 1];
        prev[0] = 0.0;

        for i in 1..=n {
            curr.fill(f64::INFINITY);
            let x = a.row(i - 1);
            for j in self.band.columns(i, m, radius) {
                let step = (wh * curr[j - 1]).min(wv * prev[j]).min(wd * prev[j - 1]);
                curr[j] = self.metric.distance(x, b.row(j - 1)) + step;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        // After the final swap, `prev` holds row n.
        prev[m]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Sequence;

    fn uni(values: &[f64]) -> Sequence {
        Sequence::univariate(values.to_vec()).unwrap()
    }

    fn cost(dtw: &Dtw, a: &Sequence, b: &Sequence) -> f64 {
        dtw.align_cost(a.as_view(), b.as_view()).unwrap().value()
    }

    #[test]
    fn identical_sequences_cost_zero() {
        let a = uni(&[1.0, 3.0, 2.0, 5.0]);
        let dtw = Dtw::new(DistanceMetric::Euclidean).with_band(BandConstraint::UNCONSTRAINED);
        assert_eq!(cost(&dtw, &a, &a), 0.0);
    }

    #[test]
    fn single_point_pair() {
        let dtw = Dtw::new(DistanceMetric::Manhattan);
        assert_eq!(cost(&dtw, &uni(&[1.0]), &uni(&[5.0])), 4.0);
    }

    #[test]
    fn symmetric_in_arguments() {
        let a = uni(&[0.0, 2.0, 1.0, 4.0, 3.0]);
        let b = uni(&[1.0, 1.0, 3.0, 2.0, 5.0, 0.0, 1.0]);
        for weights in [LocalWeights::Symmetric, LocalWeights::Asymmetric] {
            for factor in [0.0, 0.3, 1.0] {
                let dtw = Dtw::new(DistanceMetric::Euclidean)
                    .with_weights(weights)
                    .with_band(BandConstraint::new(factor));
                let ab = cost(&dtw, &a, &b);
                let ba = cost(&dtw, &b, &a);
                assert!((ab - ba).abs() < 1e-10, "{weights:?}/{factor}: {ab} vs {ba}");
            }
        }
    }

    #[test]
    fn narrower_band_never_lowers_cost() {
        let a = uni(&[0.0, 1.0, 0.0, 1.0, 2.0, 3.0]);
        let b = uni(&[0.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
        let dtw = Dtw::new(DistanceMetric::Euclidean);
        let wide = cost(&dtw.clone().with_band(BandConstraint::UNCONSTRAINED), &a, &b);
        let narrow = cost(&dtw.with_band(BandConstraint::new(0.0)), &a, &b);
        assert!(narrow >= wide);
    }

    #[test]
    fn multichannel_dependent_uses_full_rows() {
        let a = Sequence::from_rows(vec![vec![0.0, 0.0], vec![3.0, 4.0]]).unwrap();
        let b = Sequence::from_rows(vec![vec![0.0, 0.0], vec![0.0, 0.0]]).unwrap();
        let dtw = Dtw::new(DistanceMetric::Euclidean).with_band(BandConstraint::new(0.0));
        assert!((cost(&dtw, &a, &b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn independent_sums_per_channel_costs() {
        let a = Sequence::from_rows(vec![vec![0.0, 5.0], vec![1.0, 6.0], vec![2.0, 7.0]]).unwrap();
        let b = Sequence::from_rows(vec![vec![0.0, 7.0], vec![2.0, 6.0], vec![2.0, 5.0]]).unwrap();
        let dtw = Dtw::new(DistanceMetric::Manhattan)
            .with_band(BandConstraint::UNCONSTRAINED)
            .with_generalization(Generalization::Independent);

        let per_channel: f64 = (0..2)
            .map(|c| {
                let x = a.as_view().channel(c);
                let y = b.as_view().channel(c);
                cost(&dtw, &x, &y)
            })
            .sum();
        assert!((cost(&dtw, &a, &b) - per_channel).abs() < 1e-12);
    }

    #[test]
    fn independent_never_exceeds_dependent_for_manhattan() {
        let a = Sequence::from_rows(vec![vec![0.0, 5.0], vec![1.0, 6.0], vec![2.0, 7.0]]).unwrap();
        let b = Sequence::from_rows(vec![vec![0.0, 7.0], vec![2.0, 6.0], vec![2.0, 5.0]]).unwrap();
        let dependent = Dtw::new(DistanceMetric::Manhattan).with_band(BandConstraint::UNCONSTRAINED);
        let independent = dependent.clone().with_generalization(Generalization::Independent);
        assert!(cost(&independent, &a, &b) <= cost(&dependent, &a, &b) + 1e-12);
    }

    #[test]
    fn rejects_channel_mismatch() {
        let a = Sequence::from_rows(vec![vec![0.0, 0.0]]).unwrap();
        let b = uni(&[0.0]);
        let result = Dtw::default().align_cost(a.as_view(), b.as_view());
        assert!(matches!(
            result,
            Err(DtwError::ChannelMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn masked_rows_make_alignment_infinite() {
        let mut b = uni(&[0.0, 1.0, 2.0]);
        b.mask(0..=2);
        let a = uni(&[0.0, 1.0]);
        let c = Dtw::default().align_cost(a.as_view(), b.as_view()).unwrap();
        assert!(!c.is_finite());
    }

    #[test]
    fn rejects_empty_view() {
        let a = uni(&[0.0, 1.0, 2.0]);
        let b = uni(&[1.0, 2.0]);
        let dtw = Dtw::default();
        assert!(matches!(
            dtw.align_cost(a.as_view().window(1, 0), b.as_view()),
            Err(DtwError::EmptySequence)
        ));
        assert!(matches!(
            dtw.align_cost(a.as_view(), b.as_view().window(0, 0)),
            Err(DtwError::EmptySequence)
        ));
    }
}
