//! Point-wise distances between sequence rows.

use std::fmt;
use std::sync::Arc;

/// Signature of a caller-supplied point distance.
pub type PointDistanceFn = dyn Fn(&[f64], &[f64]) -> f64 + Send + Sync;

/// Distance between two rows of equal channel count.
///
/// The variant is the metric's kind. Lower bounds ([`lb_keogh`](crate::lb_keogh))
/// dispatch on it and are only defined for the three built-in kinds.
#[derive(Debug, Clone, Default)]
pub enum DistanceMetric {
    /// Sum of absolute differences.
    Manhattan,
    /// Square root of the sum of squared differences.
    #[default]
    Euclidean,
    /// Sum of squared differences. Not a true metric: the triangle
    /// inequality does not hold.
    SquaredEuclidean,
    /// Caller-supplied distance. Usable for alignment, not for lower bounds.
    Custom(CustomMetric),
}

impl DistanceMetric {
    /// Distance between rows `a` and `b`.
    ///
    /// Both rows must have the same length; extra elements of the longer
    /// row are ignored.
    #[inline]
    #[must_use]
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Self::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            Self::Euclidean => squared_sum(a, b).sqrt(),
            Self::SquaredEuclidean => squared_sum(a, b),
            Self::Custom(custom) => (custom.func)(a, b),
        }
    }

    /// Short name used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Manhattan => "manhattan",
            Self::Euclidean => "euclidean",
            Self::SquaredEuclidean => "squared-euclidean",
            Self::Custom(custom) => &custom.name,
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn squared_sum(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// A named, caller-supplied point distance.
#[derive(Clone)]
pub struct CustomMetric {
    name: String,
    func: Arc<PointDistanceFn>,
}

impl CustomMetric {
    /// Wrap `func` under `name`.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[f64], &[f64]) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Return the metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomMetric")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
