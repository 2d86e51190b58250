//! Warping path types for open-begin alignment.

/// One cell of a warping path, in the 1-based coordinates of the
/// accumulated cost matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpingCell {
    /// Row, i.e. index in the reference sequence.
    pub a: usize,
    /// Column, i.e. index in the target sequence.
    pub b: usize,
}

/// Monotonically non-decreasing cells from `(1, start)` to `(n, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpingPath(Vec<WarpingCell>);

impl WarpingPath {
    pub(crate) fn new(cells: Vec<WarpingCell>) -> Self {
        Self(cells)
    }

    /// Return the cells as a slice.
    #[must_use]
    pub fn cells(&self) -> &[WarpingCell] {
        &self.0
    }

    /// Return the number of cells in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First target column touched by the path.
    #[must_use]
    pub fn start_column(&self) -> Option<usize> {
        self.0.first().map(|cell| cell.b)
    }

    /// Last target column touched by the path.
    #[must_use]
    pub fn end_column(&self) -> Option<usize> {
        self.0.last().map(|cell| cell.b)
    }
}

impl<'a> IntoIterator for &'a WarpingPath {
    type Item = &'a WarpingCell;
    type IntoIter = std::slice::Iter<'a, WarpingCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
