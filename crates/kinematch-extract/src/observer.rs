//! Progress hooks invoked by an extraction run.

use std::time::Duration;

use tracing::{debug, info};

use crate::pattern::Pattern;
use crate::result::CalculationStats;

/// Receives extraction events.
///
/// Every hook is called on the thread driving the run, in iteration order,
/// and never concurrently. All methods default to no-ops.
pub trait ExtractionObserver {
    /// A new iteration with zero-based id `iteration` begins.
    fn iteration_started(&mut self, _iteration: usize) {}

    /// One template's search result for the current iteration, in template
    /// order. `stats` holds the counters accumulated so far. The pattern's
    /// cost is infinite when that template found no viable window.
    fn pattern_found(&mut self, _pattern: &Pattern, _stats: &CalculationStats) {}

    /// The best pattern of the iteration was accepted.
    fn best_chosen(&mut self, _pattern: &Pattern, _stats: &CalculationStats) {}

    /// The best pattern of the iteration was too short to accept. Its span
    /// is suppressed for the winning template only.
    fn pattern_rejected(&mut self, _pattern: &Pattern) {}

    /// The run finished after `elapsed` wall-clock time.
    fn finished(&mut self, _elapsed: Duration) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExtractionObserver for NoopObserver {}

/// Observer that logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ExtractionObserver for TracingObserver {
    fn iteration_started(&mut self, iteration: usize) {
        debug!(iteration, "iteration started");
    }

    fn pattern_found(&mut self, pattern: &Pattern, stats: &CalculationStats) {
        debug!(
            movement = %pattern.label.movement,
            execution = pattern.label.execution.id,
            range = %pattern.range,
            cost = %pattern.cost,
            pruned = stats.pruned,
            evaluated = stats.evaluated,
            "search result"
        );
    }

    fn best_chosen(&mut self, pattern: &Pattern, stats: &CalculationStats) {
        info!(
            movement = %pattern.label.movement,
            execution = pattern.label.execution.id,
            range = %pattern.range,
            cost = %pattern.cost,
            pruned = stats.pruned,
            evaluated = stats.evaluated,
            "pattern accepted"
        );
    }

    fn pattern_rejected(&mut self, pattern: &Pattern) {
        debug!(
            movement = %pattern.label.movement,
            range = %pattern.range,
            cost = %pattern.cost,
            "pattern too short, suppressed for its template"
        );
    }

    fn finished(&mut self, elapsed: Duration) {
        debug!(elapsed_ms = elapsed.as_millis() as u64, "extraction finished");
    }
}
