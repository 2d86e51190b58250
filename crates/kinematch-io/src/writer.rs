//! JSON result writer for extraction outputs.

use std::fs;
use std::path::{Path, PathBuf};

use kinematch_extract::{Extraction, SessionSummary, Share};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes extraction results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_patterns.json`.
#[derive(Debug)]
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the path of the patterns artifact.
    #[must_use]
    pub fn patterns_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_patterns.json", self.experiment.as_str()))
    }

    /// Write patterns, performance and session summary to
    /// `{experiment}_patterns.json` and return the file path.
    ///
    /// Patterns are listed in time order; `discovery` keeps the iteration
    /// in which each was accepted.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_patterns(
        &self,
        extraction: &Extraction,
        summary: &SessionSummary,
    ) -> Result<PathBuf, IoError> {
        let path = self.patterns_path();

        let mut patterns: Vec<PatternEntry> = extraction
            .patterns
            .iter()
            .enumerate()
            .map(|(discovery, p)| PatternEntry {
                discovery,
                movement_id: p.label.movement.id,
                movement: &p.label.movement.name,
                execution_id: p.label.execution.id,
                execution: &p.label.execution.name,
                correct: p.label.execution.correct,
                start: p.range.start(),
                end: p.range.end(),
                length: p.range.len(),
                cost: p.cost.value(),
            })
            .collect();
        patterns.sort_by_key(|p| (p.start, p.end));

        let perf = &extraction.performance;
        let artifact = PatternsArtifact {
            experiment: self.experiment.as_str(),
            n_patterns: patterns.len(),
            patterns,
            performance: PerformanceEntry {
                pruned: perf.calculations.pruned,
                evaluated: perf.calculations.evaluated,
                search_ms: perf.search_time.as_secs_f64() * 1000.0,
                total_ms: perf.total_time.as_secs_f64() * 1000.0,
            },
            summary: SummaryEntry::from_summary(summary),
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), n_patterns = artifact.n_patterns, "patterns written");
        Ok(path)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct PatternsArtifact<'a> {
    experiment: &'a str,
    n_patterns: usize,
    patterns: Vec<PatternEntry<'a>>,
    performance: PerformanceEntry,
    summary: SummaryEntry<'a>,
}

#[derive(Serialize)]
struct PatternEntry<'a> {
    discovery: usize,
    movement_id: u32,
    movement: &'a str,
    execution_id: u32,
    execution: &'a str,
    correct: bool,
    start: usize,
    end: usize,
    length: usize,
    cost: f64,
}

#[derive(Serialize)]
struct PerformanceEntry {
    pruned: u64,
    evaluated: u64,
    search_ms: f64,
    total_ms: f64,
}

#[derive(Serialize)]
struct SummaryEntry<'a> {
    total: usize,
    correct: usize,
    total_ms: u64,
    active_ms: u64,
    movements: Vec<MovementEntry<'a>>,
}

#[derive(Serialize)]
struct MovementEntry<'a> {
    id: u32,
    name: &'a str,
    #[serde(flatten)]
    share: ShareEntry,
    executions: Vec<ExecutionEntry<'a>>,
}

#[derive(Serialize)]
struct ExecutionEntry<'a> {
    id: u32,
    name: &'a str,
    correct: bool,
    #[serde(flatten)]
    share: ShareEntry,
}

#[derive(Serialize)]
struct ShareEntry {
    count: usize,
    count_percent: u32,
    time_ms: u64,
    time_percent: u32,
}

impl From<Share> for ShareEntry {
    fn from(s: Share) -> Self {
        Self {
            count: s.count,
            count_percent: s.count_percent,
            time_ms: s.time_ms,
            time_percent: s.time_percent,
        }
    }
}

impl<'a> SummaryEntry<'a> {
    fn from_summary(summary: &'a SessionSummary) -> Self {
        Self {
            total: summary.count.total,
            correct: summary.count.correct,
            total_ms: summary.time.total_ms,
            active_ms: summary.time.active_ms,
            movements: summary
                .movements
                .iter()
                .map(|m| MovementEntry {
                    id: m.movement.id,
                    name: &m.movement.name,
                    share: m.share.into(),
                    executions: m
                        .executions
                        .iter()
                        .map(|e| ExecutionEntry {
                            id: e.execution.id,
                            name: &e.execution.name,
                            correct: e.execution.correct,
                            share: e.share.into(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinematch_dtw::AlignmentCost;
    use kinematch_extract::{
        Execution, MovementType, Pattern, PatternRange, PerformanceStats, TemplateLabel,
    };
    use tempfile::TempDir;

    fn pattern(start: usize, end: usize, correct: bool) -> Pattern {
        let label = TemplateLabel::new(
            MovementType::new(4, "lunge"),
            Execution::new(u32::from(!correct), "form", correct),
        );
        Pattern::new(label, PatternRange::new(start, end), AlignmentCost::ZERO)
    }

    #[test]
    fn creates_output_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let writer = ResultWriter::new(&nested, ExperimentName::new("x").unwrap()).unwrap();
        assert!(nested.is_dir());
        assert_eq!(writer.patterns_path(), nested.join("x_patterns.json"));
    }

    #[test]
    fn writes_patterns_in_time_order() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path(), ExperimentName::new("order").unwrap()).unwrap();
        let extraction = Extraction {
            patterns: vec![pattern(40, 49, true), pattern(5, 14, false)],
            performance: PerformanceStats::default(),
        };
        let summary = SessionSummary::new(&extraction.patterns, 100, 10.0);

        let path = writer.write_patterns(&extraction, &summary).unwrap();
        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(content["experiment"], "order");
        assert_eq!(content["n_patterns"], 2);
        let patterns = content["patterns"].as_array().unwrap();
        assert_eq!(patterns[0]["start"], 5);
        assert_eq!(patterns[0]["discovery"], 1);
        assert_eq!(patterns[1]["start"], 40);
        assert_eq!(patterns[1]["length"], 10);

        assert_eq!(content["summary"]["total"], 2);
        assert_eq!(content["summary"]["correct"], 1);
        assert_eq!(content["summary"]["total_ms"], 10_000);
        let movement = &content["summary"]["movements"][0];
        assert_eq!(movement["name"], "lunge");
        assert_eq!(movement["count_percent"], 100);
        assert_eq!(movement["executions"].as_array().unwrap().len(), 2);
    }
}
