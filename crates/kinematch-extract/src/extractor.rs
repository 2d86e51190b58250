//! Greedy iterative extraction of non-overlapping template matches.
//!
//! Each iteration searches every template in parallel against its working
//! copy of the target, waits for all searches, then picks the cheapest match
//! and masks it on the calling thread so later iterations cannot select the
//! same rows again.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use kinematch_dtw::{SearchReport, Sequence, SubsequenceSearch};

use crate::config::{ExtractorConfig, SuppressionPolicy};
use crate::error::ExtractError;
use crate::observer::ExtractionObserver;
use crate::pattern::{Pattern, PatternRange, Template};
use crate::result::{CalculationStats, Extraction, PerformanceStats};

/// Lifecycle state of an [`ExtractionRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// More iterations may follow.
    Running,
    /// The stop condition was met; stepping again does nothing.
    Finished,
}

/// Locates templates inside a target with a greedy, suppress-and-repeat loop.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    config: ExtractorConfig,
    templates: Vec<Template>,
}

impl PatternExtractor {
    /// Create an extractor for `templates`.
    #[must_use]
    pub fn new(config: ExtractorConfig, templates: Vec<Template>) -> Self {
        Self { config, templates }
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Return the templates in search order.
    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Prepare a run over a private copy of `target`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ExtractError::ChannelMismatch`] | A template's channel count differs from `target` |
    pub fn start(&self, target: &Sequence) -> Result<ExtractionRun<'_>, ExtractError> {
        for (template, t) in self.templates.iter().enumerate() {
            if t.sequence.channels() != target.channels() {
                return Err(ExtractError::ChannelMismatch {
                    template,
                    expected: target.channels(),
                    got: t.sequence.channels(),
                });
            }
        }

        let copies = if self.config.policy.per_template_copies() {
            vec![target.clone(); self.templates.len()]
        } else {
            vec![target.clone()]
        };

        Ok(ExtractionRun {
            extractor: self,
            copies,
            patterns: Vec::new(),
            stats: CalculationStats::default(),
            search_time: Duration::ZERO,
            total_time: Duration::ZERO,
            started: Instant::now(),
            iteration: 0,
            state: RunState::Running,
        })
    }

    /// Run the extraction on `target` until it finishes.
    ///
    /// `target` itself is never modified.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ExtractError::ChannelMismatch`] | A template's channel count differs from `target` |
    /// | [`ExtractError::Dtw`] | A search rejects its configuration |
    #[instrument(skip(self, target, observer), fields(m = target.len(), templates = self.templates.len()))]
    pub fn extract<O>(&self, target: &Sequence, observer: &mut O) -> Result<Extraction, ExtractError>
    where
        O: ExtractionObserver + ?Sized,
    {
        let mut run = self.start(target)?;
        while run.step(observer)? == RunState::Running {}
        Ok(run.into_extraction())
    }
}

/// One in-progress extraction, advanced one iteration at a time.
///
/// Callers that need a wall-clock bound simply stop calling
/// [`step`](Self::step); there is no iteration cap.
#[derive(Debug)]
pub struct ExtractionRun<'a> {
    extractor: &'a PatternExtractor,
    copies: Vec<Sequence>,
    patterns: Vec<Pattern>,
    stats: CalculationStats,
    search_time: Duration,
    total_time: Duration,
    started: Instant,
    iteration: usize,
    state: RunState,
}

impl ExtractionRun<'_> {
    /// Return the current state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Return the number of iterations started so far.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Return the accepted patterns in discovery order.
    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Return the working copies: one shared copy, or one per template.
    #[must_use]
    pub fn working_copies(&self) -> &[Sequence] {
        &self.copies
    }

    /// Return the counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> CalculationStats {
        self.stats
    }

    /// Run one iteration and return the resulting state.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ExtractError::Dtw`] | A search rejects its configuration |
    pub fn step<O>(&mut self, observer: &mut O) -> Result<RunState, ExtractError>
    where
        O: ExtractionObserver + ?Sized,
    {
        if self.state == RunState::Finished {
            return Ok(RunState::Finished);
        }

        let iteration = self.iteration;
        self.iteration += 1;
        observer.iteration_started(iteration);

        let extractor = self.extractor;
        let policy = extractor.config.policy;
        let reports = self.search_all()?;

        let candidates: Vec<Pattern> = extractor
            .templates
            .iter()
            .zip(&reports)
            .map(|(template, report)| {
                let cost = match policy {
                    SuppressionPolicy::GlobalThreshold { .. } => report.cost,
                    SuppressionPolicy::LengthRatio { .. } => extractor
                        .config
                        .strategy
                        .per_row_cost(report, template.sequence.len()),
                };
                Pattern::new(
                    template.label.clone(),
                    PatternRange::new(report.start, report.end),
                    cost,
                )
            })
            .collect();

        for (pattern, report) in candidates.iter().zip(&reports) {
            self.stats.record(report);
            observer.pattern_found(pattern, &self.stats);
        }

        let best = candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cost.total_cmp(&b.cost));
        let Some((winner, best)) = best else {
            debug!(iteration, "no templates to search");
            return Ok(self.finish(observer));
        };
        debug!(iteration, winner, cost = %best.cost, range = %best.range, "best of iteration");

        match policy {
            SuppressionPolicy::GlobalThreshold { cost_threshold } => {
                if !best.cost.is_finite() || best.cost.value() > cost_threshold {
                    return Ok(self.finish(observer));
                }
                self.copies[0].mask(best.range.to_inclusive());
                self.patterns.push(best.clone());
                observer.best_chosen(best, &self.stats);
            }
            SuppressionPolicy::LengthRatio {
                length_tolerance,
                overlap,
                cost_threshold,
            } => {
                if !best.cost.is_finite() || best.cost.value() >= cost_threshold {
                    return Ok(self.finish(observer));
                }
                let reference_len = extractor.templates[winner].sequence.len();
                let min_len = (length_tolerance * reference_len as f64).round() as usize;
                let suppressed = best.range.trimmed(overlap).to_inclusive();

                if best.range.len() >= min_len {
                    for copy in &mut self.copies {
                        copy.mask(suppressed.clone());
                    }
                    self.patterns.push(best.clone());
                    observer.best_chosen(best, &self.stats);
                } else {
                    debug!(winner, len = best.range.len(), min_len, "match too short");
                    self.copies[winner].mask(suppressed);
                    observer.pattern_rejected(best);
                }
            }
        }

        Ok(RunState::Running)
    }

    /// Consume the run and return its patterns and performance.
    #[must_use]
    pub fn into_extraction(self) -> Extraction {
        let total_time = if self.state == RunState::Finished {
            self.total_time
        } else {
            self.started.elapsed()
        };
        Extraction {
            patterns: self.patterns,
            performance: PerformanceStats {
                calculations: self.stats,
                search_time: self.search_time,
                total_time,
            },
        }
    }

    /// Search every template against its working copy. Returns once all
    /// searches have completed, in template order.
    fn search_all(&mut self) -> Result<Vec<SearchReport>, ExtractError> {
        let extractor = self.extractor;
        let strategy = &extractor.config.strategy;
        let copies = &self.copies;
        let per_template = extractor.config.policy.per_template_copies();

        let started = Instant::now();
        let reports = extractor
            .templates
            .par_iter()
            .enumerate()
            .map(|(t, template)| {
                let copy = &copies[if per_template { t } else { 0 }];
                strategy.search(template.sequence.as_view(), copy.as_view())
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.search_time += started.elapsed();
        Ok(reports)
    }

    fn finish<O>(&mut self, observer: &mut O) -> RunState
    where
        O: ExtractionObserver + ?Sized,
    {
        self.state = RunState::Finished;
        self.total_time = self.started.elapsed();
        info!(
            patterns = self.patterns.len(),
            iterations = self.iteration,
            pruned = self.stats.pruned,
            evaluated = self.stats.evaluated,
            elapsed_ms = self.total_time.as_millis() as u64,
            "extraction complete"
        );
        observer.finished(self.total_time);
        RunState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuppressionPolicy;
    use crate::observer::NoopObserver;
    use crate::pattern::{Execution, MovementType, TemplateLabel};
    use kinematch_dtw::{
        BandConstraint, DistanceMetric, Dtw, ExhaustiveSearch, Interpolation, PrunedSearch,
    };

    const PATTERN: [f64; 5] = [-10.0, 0.0, 10.0, 0.0, -10.0];

    fn uni(values: &[f64]) -> Sequence {
        Sequence::univariate(values.to_vec()).unwrap()
    }

    fn template(id: u32, values: &[f64]) -> Template {
        let label = TemplateLabel::new(
            MovementType::new(id, format!("m{id}")),
            Execution::new(id, "ok", true),
        );
        Template::new(label, uni(values))
    }

    fn exact_pruned() -> PrunedSearch {
        PrunedSearch::new(Dtw::new(DistanceMetric::Euclidean).with_band(BandConstraint::UNCONSTRAINED))
            .with_stride(1)
            .with_length_tolerance(0.0)
            .with_interpolation(Interpolation::ToBigger)
    }

    #[test]
    fn empty_template_list_finishes_immediately() {
        let extractor = PatternExtractor::new(ExtractorConfig::default(), Vec::new());
        let mut run = extractor.start(&uni(&[0.0, 1.0, 2.0])).unwrap();
        assert_eq!(run.step(&mut NoopObserver).unwrap(), RunState::Finished);
        assert_eq!(run.iterations(), 1);
        assert!(run.patterns().is_empty());
    }

    #[test]
    fn stepping_finished_run_is_noop() {
        let extractor = PatternExtractor::new(ExtractorConfig::default(), Vec::new());
        let mut run = extractor.start(&uni(&[0.0])).unwrap();
        run.step(&mut NoopObserver).unwrap();
        assert_eq!(run.step(&mut NoopObserver).unwrap(), RunState::Finished);
        assert_eq!(run.iterations(), 1);
    }

    #[test]
    fn channel_mismatch_is_rejected() {
        let extractor = PatternExtractor::new(ExtractorConfig::default(), vec![template(1, &PATTERN)]);
        let target = Sequence::from_rows(vec![vec![0.0, 0.0]; 8]).unwrap();
        assert!(matches!(
            extractor.start(&target),
            Err(ExtractError::ChannelMismatch { template: 0, expected: 2, got: 1 })
        ));
    }

    #[test]
    fn global_threshold_masks_shared_copy() {
        let mut values = vec![0.0; 10];
        values.extend_from_slice(&PATTERN);
        values.extend([0.0; 10]);
        let target = uni(&values);

        let config = ExtractorConfig::default().with_strategy(exact_pruned());
        let extractor = PatternExtractor::new(config, vec![template(1, &PATTERN)]);
        let mut run = extractor.start(&target).unwrap();

        assert_eq!(run.step(&mut NoopObserver).unwrap(), RunState::Running);
        assert_eq!(run.working_copies().len(), 1);
        assert_eq!(run.patterns()[0].range, PatternRange::new(10, 14));
        assert!((10..=14).all(|i| run.working_copies()[0].is_masked(i)));
        assert!(!run.working_copies()[0].is_masked(9));
        assert!(!run.working_copies()[0].is_masked(15));
        assert!(!target.is_masked(10));
    }

    #[test]
    fn length_ratio_keeps_one_copy_per_template() {
        let config = ExtractorConfig::new(SuppressionPolicy::length_ratio())
            .with_strategy(ExhaustiveSearch::new(DistanceMetric::Euclidean));
        let templates = vec![template(1, &PATTERN), template(2, &[5.0; 3])];
        let extractor = PatternExtractor::new(config, templates);
        let run = extractor.start(&uni(&[0.0; 20])).unwrap();
        assert_eq!(run.working_copies().len(), 2);
    }

    #[test]
    fn search_time_never_exceeds_total_time() {
        let mut values = vec![0.0; 6];
        values.extend_from_slice(&PATTERN);
        let extractor = PatternExtractor::new(
            ExtractorConfig::default().with_strategy(exact_pruned()),
            vec![template(1, &PATTERN)],
        );
        let extraction = extractor.extract(&uni(&values), &mut NoopObserver).unwrap();
        assert!(extraction.performance.search_time <= extraction.performance.total_time);
        assert_eq!(extraction.patterns.len(), 1);
    }
}
