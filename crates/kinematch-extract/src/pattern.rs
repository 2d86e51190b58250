//! Template labels, templates and detected patterns.

use std::fmt;
use std::ops::RangeInclusive;

use kinematch_dtw::{AlignmentCost, Sequence};

/// The kind of movement a template demonstrates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MovementType {
    /// Catalog identifier.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
}

impl MovementType {
    /// Create a movement type.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.name)
    }
}

/// One way of performing a movement, correct or not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Execution {
    /// Catalog identifier.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
    /// Whether this execution is the correct form of the movement.
    pub correct: bool,
}

impl Execution {
    /// Create an execution label.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, correct: bool) -> Self {
        Self {
            id,
            name: name.into(),
            correct,
        }
    }
}

/// Movement type and execution carried by a template and its matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateLabel {
    /// Movement type.
    pub movement: MovementType,
    /// Execution of the movement.
    pub execution: Execution,
}

impl TemplateLabel {
    /// Pair a movement type with an execution.
    #[must_use]
    pub fn new(movement: MovementType, execution: Execution) -> Self {
        Self {
            movement,
            execution,
        }
    }
}

/// A labeled reference recording searched for in the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Labels attached to every match of this template.
    pub label: TemplateLabel,
    /// Reference samples.
    pub sequence: Sequence,
}

impl Template {
    /// Create a template.
    #[must_use]
    pub fn new(label: TemplateLabel, sequence: Sequence) -> Self {
        Self { label, sequence }
    }
}

/// Inclusive span of target rows covered by a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternRange {
    start: usize,
    end: usize,
}

impl PatternRange {
    /// Create a range. The bounds are swapped if given in reverse.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// First covered row.
    #[must_use]
    pub fn start(self) -> usize {
        self.start
    }

    /// Last covered row, inclusive.
    #[must_use]
    pub fn end(self) -> usize {
        self.end
    }

    /// Number of covered rows.
    #[must_use]
    pub fn len(self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a range covers at least one row.
    #[must_use]
    pub fn is_empty(self) -> bool {
        false
    }

    /// Return true if the two ranges share a row.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Convert to a standard inclusive range.
    #[must_use]
    pub fn to_inclusive(self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Shrink both ends toward each other by the blend factor `overlap`.
    ///
    /// `start' = round((1 - overlap) * start + overlap * end)` and
    /// `end' = round(overlap * start + (1 - overlap) * end)`, reordered when
    /// a factor above one half crosses them over.
    #[must_use]
    pub fn trimmed(self, overlap: f64) -> Self {
        let (s, e) = (self.start as f64, self.end as f64);
        let start = ((1.0 - overlap) * s + overlap * e).round() as usize;
        let end = (overlap * s + (1.0 - overlap) * e).round() as usize;
        Self::new(start, end)
    }
}

impl fmt::Display for PatternRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// A detected occurrence of a template inside the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    /// Labels of the matching template.
    pub label: TemplateLabel,
    /// Matched target rows.
    pub range: PatternRange,
    /// Match cost after policy normalization.
    pub cost: AlignmentCost,
}

impl Pattern {
    /// Create a pattern.
    #[must_use]
    pub fn new(label: TemplateLabel, range: PatternRange, cost: AlignmentCost) -> Self {
        Self { label, range, cost }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_orders_bounds() {
        let r = PatternRange::new(9, 4);
        assert_eq!((r.start(), r.end()), (4, 9));
        assert_eq!(r.len(), 6);
        assert_eq!(r.to_inclusive(), 4..=9);
    }

    #[test]
    fn overlap_detection() {
        let a = PatternRange::new(10, 14);
        assert!(a.overlaps(PatternRange::new(14, 20)));
        assert!(a.overlaps(PatternRange::new(0, 10)));
        assert!(a.overlaps(PatternRange::new(11, 12)));
        assert!(!a.overlaps(PatternRange::new(15, 20)));
        assert!(!a.overlaps(PatternRange::new(0, 9)));
    }

    #[test]
    fn trimming_shrinks_toward_centre() {
        let r = PatternRange::new(10, 30);
        assert_eq!(r.trimmed(0.05), PatternRange::new(11, 29));
        assert_eq!(r.trimmed(0.25), PatternRange::new(15, 25));
        assert_eq!(r.trimmed(0.5), PatternRange::new(20, 20));
    }

    #[test]
    fn trimming_past_half_stays_ordered() {
        let r = PatternRange::new(10, 30);
        let t = r.trimmed(0.75);
        assert_eq!(t, PatternRange::new(15, 25));
        assert!(t.start() <= t.end());
    }

    #[test]
    fn single_row_trims_to_itself() {
        assert_eq!(PatternRange::new(3, 3).trimmed(0.4), PatternRange::new(3, 3));
    }

    #[test]
    fn movement_display() {
        assert_eq!(MovementType::new(2, "squat").to_string(), "2:squat");
    }
}
