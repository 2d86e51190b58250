//! Open-begin DTW: the reference must be consumed in full, the target may be
//! entered at any column.

use tracing::instrument;

use crate::constraint::LocalWeights;
use crate::error::DtwError;
use crate::metric::DistanceMetric;
use crate::path::{WarpingCell, WarpingPath};
use crate::sequence::SequenceView;

/// Full `(n + 1) × (m + 1)` accumulated cost matrix, row-major.
///
/// Row 0 is all zeros (alignment may begin at any target column) and
/// column 0 is `+inf` below row 0. Cell `(0, 0)` is zero.
#[derive(Debug, Clone)]
pub struct OpenBeginMatrix {
    cells: Vec<f64>,
    n: usize,
    m: usize,
}

impl OpenBeginMatrix {
    /// Fill the matrix for `reference` (rows) against `target` (columns).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ChannelMismatch`] | The sequences differ in channel count |
    /// | [`DtwError::EmptySequence`] | `reference` or `target` has no rows |
    #[instrument(skip_all, fields(n = reference.len(), m = target.len()))]
    pub fn compute(
        reference: SequenceView<'_>,
        target: SequenceView<'_>,
        metric: &DistanceMetric,
        weights: LocalWeights,
    ) -> Result<Self, DtwError> {
        if reference.channels() != target.channels() {
            return Err(DtwError::ChannelMismatch {
                left: reference.channels(),
                right: target.channels(),
            });
        }
        if reference.is_empty() || target.is_empty() {
            return Err(DtwError::EmptySequence);
        }
        let n = reference.len();
        let m = target.len();
        let width = m + 1;
        let (wh, wv, wd) = weights.triple();

        let mut cells = vec![f64::INFINITY; (n + 1) * width];
        cells[..width].fill(0.0);

        for i in 1..=n {
            let x = reference.row(i - 1);
            let (above, row) = cells[(i - 1) * width..(i + 1) * width].split_at_mut(width);
            for j in 1..=m {
                let step = (wh * row[j - 1]).min(wv * above[j]).min(wd * above[j - 1]);
                row[j] = metric.distance(x, target.row(j - 1)) + step;
            }
        }

        Ok(Self { cells, n, m })
    }

    /// Cost at 1-based cell `(i, j)`; row and column 0 are the boundary.
    ///
    /// # Panics
    ///
    /// Panics if `i > n` or `j > m`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i <= self.n && j <= self.m, "cell ({i}, {j}) out of bounds");
        self.cells[i * (self.m + 1) + j]
    }

    /// Number of reference rows `n`.
    #[must_use]
    pub fn reference_len(&self) -> usize {
        self.n
    }

    /// Number of target columns `m`.
    #[must_use]
    pub fn target_len(&self) -> usize {
        self.m
    }

    /// Costs of row `n`, columns `1..=m`.
    #[must_use]
    pub fn final_row(&self) -> &[f64] {
        let start = self.n * (self.m + 1);
        &self.cells[start + 1..start + self.m + 1]
    }

    /// 1-based end column with the lowest final-row cost, with that cost.
    ///
    /// The first minimum wins. Returns `None` when no finite cost exists.
    #[must_use]
    pub fn best_end(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (offset, &cost) in self.final_row().iter().enumerate() {
            if best.is_none_or(|(_, b)| cost < b) {
                best = Some((offset + 1, cost));
            }
        }
        best.filter(|(_, cost)| cost.is_finite())
    }

    /// Walk back from `(n, end)` to row 1.
    ///
    /// In column 1 only the vertical move is taken. Elsewhere the cheapest
    /// predecessor wins, ties resolved diagonal, then vertical, then
    /// horizontal. `end` is clamped into `1..=m`.
    #[must_use]
    pub fn backtrack(&self, end: usize) -> WarpingPath {
        let mut i = self.n;
        let mut j = end.clamp(1, self.m);
        let mut cells = vec![WarpingCell { a: i, b: j }];

        while i > 1 {
            if j == 1 {
                i -= 1;
            } else {
                let diagonal = self.get(i - 1, j - 1);
                let vertical = self.get(i - 1, j);
                let horizontal = self.get(i, j - 1);
                let min = diagonal.min(vertical).min(horizontal);
                if diagonal == min {
                    i -= 1;
                    j -= 1;
                } else if vertical == min {
                    i -= 1;
                } else {
                    j -= 1;
                }
            }
            cells.push(WarpingCell { a: i, b: j });
        }

        cells.reverse();
        WarpingPath::new(cells)
    }
}
