//! Configuration for greedy pattern extraction.

use kinematch_dtw::{
    AlignmentCost, DtwError, ExhaustiveSearch, PrunedSearch, SearchReport, SequenceView, SubsequenceSearch,
};

/// When to stop iterating and what to suppress after each match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuppressionPolicy {
    /// One shared working copy. Stop once the best cost exceeds
    /// `cost_threshold`; otherwise accept and mask the whole match.
    GlobalThreshold {
        /// Largest acceptable match cost.
        cost_threshold: f64,
    },
    /// One working copy per template. Costs are compared per row: raw
    /// exhaustive costs are divided by the template length, pruned costs
    /// are already per window row. Stop once the best cost reaches `cost_threshold`; otherwise
    /// mask the overlap-trimmed match, everywhere if the match is at least
    /// `length_tolerance` times the template length, and only for the
    /// winning template if it is shorter.
    LengthRatio {
        /// Minimum match length as a fraction of the template length. Clamped to `[0.01, 0.99]`.
        length_tolerance: f64,
        /// Blend factor pulling the suppressed span toward its centre. Clamped to `[0.01, 0.99]`.
        overlap: f64,
        /// Smallest rejected per-row match cost.
        cost_threshold: f64,
    },
}

impl SuppressionPolicy {
    /// Global threshold policy with a cost threshold of 0.5.
    #[must_use]
    pub fn global_threshold() -> Self {
        Self::GlobalThreshold {
            cost_threshold: 0.5,
        }
    }

    /// Length-ratio policy with α = 0.5, β = 0.05 and γ = 0.3.
    #[must_use]
    pub fn length_ratio() -> Self {
        Self::LengthRatio {
            length_tolerance: 0.5,
            overlap: 0.05,
            cost_threshold: 0.3,
        }
    }

    /// Return true if each template searches its own working copy.
    #[must_use]
    pub fn per_template_copies(&self) -> bool {
        matches!(self, Self::LengthRatio { .. })
    }

    fn clamped(self) -> Self {
        match self {
            Self::GlobalThreshold { .. } => self,
            Self::LengthRatio {
                length_tolerance,
                overlap,
                cost_threshold,
            } => Self::LengthRatio {
                length_tolerance: clamp_fraction(length_tolerance),
                overlap: clamp_fraction(overlap),
                cost_threshold,
            },
        }
    }
}

impl Default for SuppressionPolicy {
    fn default() -> Self {
        Self::global_threshold()
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.01
    } else {
        value.clamp(0.01, 0.99)
    }
}

/// The subsequence search run once per template and iteration.
#[derive(Debug, Clone)]
pub enum SearchStrategy {
    /// Sliding windows with LB_Keogh pruning; costs are per window row.
    Pruned(PrunedSearch),
    /// Open-begin DTW over the whole target; costs are raw.
    Exhaustive(ExhaustiveSearch),
}

impl SearchStrategy {
    /// Cost of `report` per template row.
    ///
    /// Pruned costs are already divided by the matched window length and
    /// are returned unchanged; exhaustive costs are raw and are divided by
    /// `template_len`.
    #[must_use]
    pub fn per_row_cost(&self, report: &SearchReport, template_len: usize) -> AlignmentCost {
        match self {
            Self::Pruned(_) => report.cost,
            Self::Exhaustive(_) => report.cost.per_step(template_len),
        }
    }
}

impl SubsequenceSearch for SearchStrategy {
    fn search(
        &self,
        reference: SequenceView<'_>,
        target: SequenceView<'_>,
    ) -> Result<SearchReport, DtwError> {
        match self {
            Self::Pruned(search) => search.search(reference, target),
            Self::Exhaustive(search) => search.search(reference, target),
        }
    }
}

impl From<PrunedSearch> for SearchStrategy {
    fn from(search: PrunedSearch) -> Self {
        Self::Pruned(search)
    }
}

impl From<ExhaustiveSearch> for SearchStrategy {
    fn from(search: ExhaustiveSearch) -> Self {
        Self::Exhaustive(search)
    }
}

/// Configuration for [`PatternExtractor`](crate::PatternExtractor).
///
/// Construct via [`ExtractorConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter  | Default                                                       |
/// |------------|---------------------------------------------------------------|
/// | `policy`   | [`SuppressionPolicy::global_threshold`]                       |
/// | `strategy` | `Pruned(PrunedSearch::default())` for the global threshold,   |
/// |            | `Exhaustive(ExhaustiveSearch::default())` for the length ratio |
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub(crate) policy: SuppressionPolicy,
    pub(crate) strategy: SearchStrategy,
}

impl ExtractorConfig {
    /// Create a configuration for `policy` with its usual search strategy.
    ///
    /// Out-of-range policy fractions are clamped.
    #[must_use]
    pub fn new(policy: SuppressionPolicy) -> Self {
        let strategy = if policy.per_template_copies() {
            SearchStrategy::Exhaustive(ExhaustiveSearch::default())
        } else {
            SearchStrategy::Pruned(PrunedSearch::default())
        };
        Self {
            policy: policy.clamped(),
            strategy,
        }
    }

    /// Replace the search strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl Into<SearchStrategy>) -> Self {
        self.strategy = strategy.into();
        self
    }

    /// Return the clamped suppression policy.
    #[must_use]
    pub fn policy(&self) -> SuppressionPolicy {
        self.policy
    }

    /// Return the search strategy.
    #[must_use]
    pub fn strategy(&self) -> &SearchStrategy {
        &self.strategy
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::new(SuppressionPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinematch_dtw::{DistanceMetric, Sequence};

    #[test]
    fn default_pairs_global_threshold_with_pruned_search() {
        let config = ExtractorConfig::default();
        assert_eq!(config.policy(), SuppressionPolicy::GlobalThreshold { cost_threshold: 0.5 });
        assert!(matches!(config.strategy(), SearchStrategy::Pruned(_)));
    }

    #[test]
    fn length_ratio_defaults_to_exhaustive_search() {
        let config = ExtractorConfig::new(SuppressionPolicy::length_ratio());
        assert!(matches!(config.strategy(), SearchStrategy::Exhaustive(_)));
        assert_eq!(
            config.policy(),
            SuppressionPolicy::LengthRatio {
                length_tolerance: 0.5,
                overlap: 0.05,
                cost_threshold: 0.3,
            }
        );
    }

    #[test]
    fn fractions_are_clamped() {
        let config = ExtractorConfig::new(SuppressionPolicy::LengthRatio {
            length_tolerance: 3.0,
            overlap: f64::NAN,
            cost_threshold: 7.0,
        });
        assert_eq!(
            config.policy(),
            SuppressionPolicy::LengthRatio {
                length_tolerance: 0.99,
                overlap: 0.01,
                cost_threshold: 7.0,
            }
        );
    }

    #[test]
    fn strategy_can_be_swapped() {
        let config = ExtractorConfig::new(SuppressionPolicy::length_ratio())
            .with_strategy(PrunedSearch::default());
        assert!(matches!(config.strategy(), SearchStrategy::Pruned(_)));

        let config = ExtractorConfig::default()
            .with_strategy(ExhaustiveSearch::new(DistanceMetric::Manhattan));
        let SearchStrategy::Exhaustive(search) = config.strategy() else {
            panic!("expected exhaustive strategy");
        };
        assert_eq!(search.metric().name(), "manhattan");
    }

    #[test]
    fn per_row_cost_divides_only_raw_costs() {
        let reference = Sequence::univariate(vec![2.0; 3]).unwrap();
        let target = Sequence::univariate(vec![0.0; 3]).unwrap();
        let report = ExhaustiveSearch::new(DistanceMetric::Manhattan)
            .search(reference.as_view(), target.as_view())
            .unwrap();
        assert_eq!(report.cost.value(), 6.0);

        let exhaustive = SearchStrategy::from(ExhaustiveSearch::default());
        assert_eq!(exhaustive.per_row_cost(&report, 3).value(), 2.0);
        let pruned = SearchStrategy::from(PrunedSearch::default());
        assert_eq!(pruned.per_row_cost(&report, 3).value(), 6.0);
    }
}
