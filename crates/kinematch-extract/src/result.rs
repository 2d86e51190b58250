//! Result and performance types for a finished extraction.

use std::time::Duration;

use kinematch_dtw::SearchReport;

use crate::pattern::Pattern;

/// Window counters accumulated over every search of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Windows skipped without a full alignment.
    pub pruned: u64,
    /// Windows that went through a full alignment.
    pub evaluated: u64,
}

impl CalculationStats {
    /// Fold the counters of one search report into the totals.
    pub(crate) fn record(&mut self, report: &SearchReport) {
        self.pruned += report.pruned;
        self.evaluated += report.evaluated;
    }

    /// Return the number of windows considered.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.pruned + self.evaluated
    }

    /// Return the fraction of windows that were pruned, or 0 when none were considered.
    #[must_use]
    pub fn pruning_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.pruned as f64 / total as f64,
        }
    }
}

/// Counters and timings of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerformanceStats {
    /// Window counters.
    pub calculations: CalculationStats,
    /// Wall-clock time spent inside searches.
    pub search_time: Duration,
    /// Wall-clock time from the first iteration to the finish.
    pub total_time: Duration,
}

/// Output of a finished extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Accepted patterns in discovery order.
    pub patterns: Vec<Pattern>,
    /// Counters and timings.
    pub performance: PerformanceStats,
}

impl Extraction {
    /// Return the patterns sorted by their first target row.
    #[must_use]
    pub fn chronological(&self) -> Vec<&Pattern> {
        let mut ordered: Vec<&Pattern> = self.patterns.iter().collect();
        ordered.sort_by_key(|p| p.range);
        ordered
    }
}
