//! Best-matching window of a long target for a short reference.

use std::ops::RangeInclusive;

use tracing::{debug, instrument};

use crate::constraint::LocalWeights;
use crate::cost::AlignmentCost;
use crate::dtw::Dtw;
use crate::envelope::{Envelope, lb_keogh};
use crate::error::DtwError;
use crate::metric::DistanceMetric;
use crate::open_begin::OpenBeginMatrix;
use crate::resample::{Interpolation, reconcile};
use crate::sequence::SequenceView;

/// Outcome of one subsequence search.
///
/// A report whose cost is not finite means nothing viable was found; its
/// range is `0..=0` and must not be recorded as a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchReport {
    /// First matched target row.
    pub start: usize,
    /// Last matched target row, inclusive.
    pub end: usize,
    /// Cost of the match. Its normalization depends on the strategy.
    pub cost: AlignmentCost,
    /// Windows skipped without a full alignment.
    pub pruned: u64,
    /// Windows that went through a full alignment.
    pub evaluated: u64,
}

impl SearchReport {
    /// Sentinel report for a search without a viable window.
    #[must_use]
    pub fn no_match(pruned: u64, evaluated: u64) -> Self {
        Self {
            start: 0,
            end: 0,
            cost: AlignmentCost::INFINITY,
            pruned,
            evaluated,
        }
    }

    /// Return true if the report holds a viable match.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.cost.is_finite()
    }

    /// Matched target rows.
    #[must_use]
    pub fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Number of matched target rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a report covers at least one row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A strategy for locating `reference` inside `target`.
pub trait SubsequenceSearch: Send + Sync {
    /// Search `target` for the window that best aligns with `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::EmptySequence`] or [`DtwError::ChannelMismatch`] on
    /// malformed input, and [`DtwError::UnsupportedMetric`] when the strategy
    /// cannot bound the metric.
    fn search(
        &self,
        reference: SequenceView<'_>,
        target: SequenceView<'_>,
    ) -> Result<SearchReport, DtwError>;
}

/// Sliding-window search with LB_Keogh pruning.
///
/// Every window `[i, j]` whose length lies within the length tolerance is
/// resampled against the reference, bounded with LB_Keogh, and fully
/// aligned only when the bound beats the best cost so far. The reported
/// cost is divided by the matched window length. Windows that overlap
/// masked target rows are skipped and counted as pruned.
///
/// # Defaults
///
/// | Parameter          | Default                          |
/// |--------------------|----------------------------------|
/// | `dtw`              | [`Dtw::default`]                 |
/// | `stride`           | 10                               |
/// | `length_tolerance` | 0.25                             |
/// | `interpolation`    | [`Interpolation::ToSmaller`]     |
/// | `envelope_radius`  | 0.1                              |
#[derive(Debug, Clone)]
pub struct PrunedSearch {
    dtw: Dtw,
    stride: usize,
    length_tolerance: f64,
    interpolation: Interpolation,
    envelope_radius: f64,
}

impl Default for PrunedSearch {
    fn default() -> Self {
        Self::new(Dtw::default())
    }
}

impl PrunedSearch {
    /// Create a pruned search around `dtw` with default window settings.
    #[must_use]
    pub fn new(dtw: Dtw) -> Self {
        Self {
            dtw,
            stride: 10,
            length_tolerance: 0.25,
            interpolation: Interpolation::ToSmaller,
            envelope_radius: 0.1,
        }
    }

    /// Set the step over window starts and ends. Clamped to `[1, m]` per search.
    #[must_use]
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Set the window length tolerance. Clamped to `[0, 0.99]`.
    #[must_use]
    pub fn with_length_tolerance(mut self, length_tolerance: f64) -> Self {
        self.length_tolerance = if length_tolerance.is_nan() {
            0.0
        } else {
            length_tolerance.clamp(0.0, 0.99)
        };
        self
    }

    /// Set which side of a length mismatch is resampled.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Set the LB_Keogh envelope radius. Negative values act as `0`.
    #[must_use]
    pub fn with_envelope_radius(mut self, envelope_radius: f64) -> Self {
        self.envelope_radius = envelope_radius;
        self
    }

    /// Return the alignment configuration.
    #[must_use]
    pub fn dtw(&self) -> &Dtw {
        &self.dtw
    }

    /// Return the configured stride.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Return the clamped length tolerance.
    #[must_use]
    pub fn length_tolerance(&self) -> f64 {
        self.length_tolerance
    }

    /// Return the interpolation strategy.
    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Return the envelope radius.
    #[must_use]
    pub fn envelope_radius(&self) -> f64 {
        self.envelope_radius
    }

    /// Shortest and longest admissible window for a reference of length `n`.
    #[must_use]
    pub fn window_lengths(&self, n: usize) -> (usize, usize) {
        let min = ((n as f64 * (1.0 - self.length_tolerance)).round() as usize).max(1);
        let max = ((n as f64 * (1.0 + self.length_tolerance)).round() as usize).max(min);
        (min, max)
    }
}

impl SubsequenceSearch for PrunedSearch {
    #[instrument(skip_all, fields(n = reference.len(), m = target.len()))]
    fn search(
        &self,
        reference: SequenceView<'_>,
        target: SequenceView<'_>,
    ) -> Result<SearchReport, DtwError> {
        check_inputs(reference, target)?;
        if let DistanceMetric::Custom(custom) = self.dtw.metric() {
            return Err(DtwError::UnsupportedMetric {
                name: custom.name().to_string(),
            });
        }

        let m = target.len();
        let stride = self.stride.clamp(1, m);
        let (min_len, max_len) = self.window_lengths(reference.len());
        let masked = masked_prefix(target);

        let mut best: Option<(usize, usize)> = None;
        let mut best_cost = f64::INFINITY;
        let mut pruned = 0u64;
        let mut evaluated = 0u64;

        let Some(last_start) = m.checked_sub(min_len) else {
            debug!(min_len, "target shorter than shortest window");
            return Ok(SearchReport::no_match(0, 0));
        };

        for i in (0..=last_start).step_by(stride) {
            let last_end = (i + max_len - 1).min(m - 1);
            for j in (i + min_len - 1..=last_end).step_by(stride) {
                if masked[j + 1] > masked[i] {
                    pruned += 1;
                    continue;
                }
                let window = target.window(i, j - i + 1);
                let (candidate, query) = reconcile(reference, window, self.interpolation);
                let envelope = Envelope::around(query.as_view(), self.envelope_radius);
                let bound = lb_keogh(candidate.as_view(), &envelope, self.dtw.metric())?;
                if bound < best_cost {
                    evaluated += 1;
                    let cost = self
                        .dtw
                        .align_cost(candidate.as_view(), query.as_view())?
                        .value();
                    if cost < best_cost {
                        best_cost = cost;
                        best = Some((i, j));
                    }
                } else {
                    pruned += 1;
                }
            }
        }

        let Some((start, end)) = best else {
            debug!(pruned, evaluated, "no viable window");
            return Ok(SearchReport::no_match(pruned, evaluated));
        };
        let cost = AlignmentCost::new(best_cost).per_step(end - start + 1);
        debug!(start, end, %cost, pruned, evaluated, "pruned search complete");
        Ok(SearchReport {
            start,
            end,
            cost,
            pruned,
            evaluated,
        })
    }
}

/// Open-begin DTW over the whole target, without windowing or pruning.
///
/// The reported cost is the raw accumulated cost of the best path; the
/// counters are always `pruned = 0`, `evaluated = 1`.
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveSearch {
    metric: DistanceMetric,
    weights: LocalWeights,
}

impl ExhaustiveSearch {
    /// Create an exhaustive search with symmetric weights.
    #[must_use]
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            weights: LocalWeights::Symmetric,
        }
    }

    /// Set the local step weights.
    #[must_use]
    pub fn with_weights(mut self, weights: LocalWeights) -> Self {
        self.weights = weights;
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
}

impl SubsequenceSearch for ExhaustiveSearch {
    #[instrument(skip_all, fields(n = reference.len(), m = target.len()))]
    fn search(
        &self,
        reference: SequenceView<'_>,
        target: SequenceView<'_>,
    ) -> Result<SearchReport, DtwError> {
        let matrix = OpenBeginMatrix::compute(reference, target, &self.metric, self.weights)?;
        let Some((end, cost)) = matrix.best_end() else {
            debug!("no finite end column");
            return Ok(SearchReport::no_match(0, 1));
        };
        let start = matrix.backtrack(end).start_column().unwrap_or(end);
        let report = SearchReport {
            start: start - 1,
            end: end - 1,
            cost: AlignmentCost::new(cost),
            pruned: 0,
            evaluated: 1,
        };
        debug!(start = report.start, end = report.end, cost = %report.cost, "exhaustive search complete");
        Ok(report)
    }
}

fn check_inputs(reference: SequenceView<'_>, target: SequenceView<'_>) -> Result<(), DtwError> {
    if reference.channels() != target.channels() {
        return Err(DtwError::ChannelMismatch {
            left: reference.channels(),
            right: target.channels(),
        });
    }
    if reference.is_empty() || target.is_empty() {
        return Err(DtwError::EmptySequence);
    }
    Ok(())
}

/// `prefix[k]` is the number of masked rows among the first `k` rows.
fn masked_prefix(target: SequenceView<'_>) -> Vec<usize> {
    let mut prefix = Vec::with_capacity(target.len() + 1);
    prefix.push(0);
    let mut count = 0;
    for row in target.rows() {
        if row.iter().any(|v| !v.is_finite()) {
            count += 1;
        }
        prefix.push(count);
    }
    prefix
}
