//! End-to-end integration tests: CSV -> normalize -> extract -> JSON -> deserialize.

use std::fs;
use std::path::Path;

use kinematch_dtw::{ExhaustiveSearch, Sequence, min_max_normalize};
use kinematch_extract::{
    ExtractorConfig, NoopObserver, PatternExtractor, SessionSummary, SuppressionPolicy, Template,
};
use kinematch_io::{
    ExperimentName, IoError, ResultWriter, SequenceReader, TemplateCatalogReader,
};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load the fixture catalog and session, normalized together.
fn load_normalized() -> (Vec<Template>, Sequence) {
    let catalog = TemplateCatalogReader::new(&fixture_path("catalog.csv"))
        .read()
        .expect("catalog fixture should parse");
    let session = SequenceReader::new(&fixture_path("session.csv"))
        .with_time_column(true)
        .read()
        .expect("session fixture should parse");

    let templates = catalog.into_templates();
    let mut dataset: Vec<Sequence> = templates.iter().map(|t| t.sequence.clone()).collect();
    dataset.push(session.sequence);
    let mut normalized = min_max_normalize(&dataset).unwrap();

    let session = normalized.pop().unwrap();
    let templates = templates
        .into_iter()
        .zip(normalized)
        .map(|(t, sequence)| Template::new(t.label, sequence))
        .collect();
    (templates, session)
}

// ---------------------------------------------------------------------------
// Fixture loading
// ---------------------------------------------------------------------------

#[test]
fn fixtures_load() {
    let session = SequenceReader::new(&fixture_path("session.csv"))
        .with_time_column(true)
        .read()
        .unwrap();
    assert_eq!(session.channel_names, vec!["ax", "ay"]);
    assert_eq!(session.sequence.len(), 32);

    let catalog = TemplateCatalogReader::new(&fixture_path("catalog.csv"))
        .read()
        .unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.templates[0].label.movement.name, "raise");
    assert_eq!(catalog.templates[0].sequence.len(), 5);
    assert_eq!(catalog.templates[1].label.movement.name, "twist");
    assert!(!catalog.templates[1].label.execution.correct);
}

#[test]
fn session_with_time_column_misread_as_channel() {
    let session = SequenceReader::new(&fixture_path("session.csv")).read().unwrap();
    assert_eq!(session.sequence.channels(), 3);

    let catalog = TemplateCatalogReader::new(&fixture_path("catalog.csv"))
        .read()
        .unwrap();
    let extractor = PatternExtractor::new(ExtractorConfig::default(), catalog.into_templates());
    assert!(extractor.extract(&session.sequence, &mut NoopObserver).is_err());
}

// ---------------------------------------------------------------------------
// Extraction round trip
// ---------------------------------------------------------------------------

#[test]
fn extraction_round_trip() {
    let (templates, session) = load_normalized();

    let config = ExtractorConfig::new(SuppressionPolicy::global_threshold())
        .with_strategy(ExhaustiveSearch::default());
    let extractor = PatternExtractor::new(config, templates);
    let extraction = extractor.extract(&session, &mut NoopObserver).unwrap();

    let found: Vec<(&str, usize, usize)> = extraction
        .chronological()
        .into_iter()
        .map(|p| (p.label.movement.name.as_str(), p.range.start(), p.range.end()))
        .collect();
    assert_eq!(found, vec![("raise", 5, 9), ("twist", 15, 18), ("raise", 24, 28)]);
    assert!(extraction.patterns.iter().all(|p| p.cost.value() < 1e-9));

    let summary = SessionSummary::new(&extraction.patterns, session.len(), 50.0);
    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), ExperimentName::new("pipeline").unwrap()).unwrap();
    let path = writer.write_patterns(&extraction, &summary).unwrap();
    assert!(path.ends_with("pipeline_patterns.json"));

    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(content["experiment"], "pipeline");
    assert_eq!(content["n_patterns"], 3);

    let patterns = content["patterns"].as_array().unwrap();
    assert_eq!(patterns[0]["movement"], "raise");
    assert_eq!(patterns[0]["discovery"], 0);
    assert_eq!(patterns[1]["movement"], "twist");
    assert_eq!(patterns[1]["start"], 15);
    assert_eq!(patterns[1]["length"], 4);
    assert_eq!(patterns[1]["correct"], false);
    assert_eq!(patterns[2]["start"], 24);

    let perf = &content["performance"];
    assert_eq!(perf["pruned"], 0);
    assert!(perf["evaluated"].as_u64().unwrap() >= 6);

    let summary = &content["summary"];
    assert_eq!(summary["total"], 3);
    assert_eq!(summary["correct"], 2);
    assert_eq!(summary["total_ms"], 640);
    assert_eq!(summary["active_ms"], 280);
    let movements = summary["movements"].as_array().unwrap();
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[0]["name"], "raise");
    assert_eq!(movements[0]["count_percent"], 67);
    assert_eq!(movements[0]["time_percent"], 71);
    assert_eq!(movements[1]["count_percent"], 33);
    assert_eq!(movements[1]["time_percent"], 29);
}

// ---------------------------------------------------------------------------
// Writer errors
// ---------------------------------------------------------------------------

#[test]
fn writer_rejects_file_as_output_dir() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("occupied");
    fs::write(&file, "x").unwrap();
    let result = ResultWriter::new(&file.join("sub"), ExperimentName::new("e").unwrap());
    assert!(matches!(result, Err(IoError::OutputDirCreate { .. })));
}
