//! DTW alignment and subsequence search over multichannel sequences.
//!
//! Pure math library, zero I/O. Provides banded DTW with local step weights
//! and per-channel generalization, open-begin DTW with path backtracking,
//! linear resampling, a globally clamped LB_Keogh bound, and two subsequence
//! search strategies built on top of them.

mod constraint;
mod cost;
mod dtw;
mod envelope;
mod error;
mod metric;
mod open_begin;
mod path;
mod preprocess;
mod resample;
mod search;
mod sequence;

pub use constraint::{BandConstraint, Generalization, LocalWeights};
pub use cost::AlignmentCost;
pub use dtw::Dtw;
pub use envelope::{Envelope, lb_keogh};
pub use error::{DtwError, PreprocessError};
pub use metric::{CustomMetric, DistanceMetric, PointDistanceFn};
pub use open_begin::OpenBeginMatrix;
pub use path::{WarpingCell, WarpingPath};
pub use preprocess::{ChannelBounds, min_max_normalize};
pub use resample::{Interpolation, Resampled, reconcile, resample};
pub use search::{ExhaustiveSearch, PrunedSearch, SearchReport, SubsequenceSearch};
pub use sequence::{Sequence, SequenceView};
