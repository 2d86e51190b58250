use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use kinematch_dtw::{
    BandConstraint, DistanceMetric, Dtw, ExhaustiveSearch, Generalization, Interpolation,
    LocalWeights, PrunedSearch, Sequence, SubsequenceSearch, min_max_normalize,
};
use kinematch_extract::{
    ExtractorConfig, PatternExtractor, SearchStrategy, SessionSummary, SuppressionPolicy, Template,
    TracingObserver,
};
use kinematch_io::{ExperimentName, ResultWriter, SequenceReader, TemplateCatalogReader};

#[derive(Parser)]
#[command(name = "kinematch")]
#[command(about = "Locate labeled movement templates inside continuous multichannel sensor recordings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared alignment and extraction parameters.
#[derive(Args, Debug, Clone)]
struct TuningArgs {
    /// Point distance: "manhattan", "euclidean", or "squared-euclidean"
    #[arg(long, default_value = "euclidean")]
    metric: String,

    /// Local step weights: "symmetric" or "asymmetric"
    #[arg(long, default_value = "symmetric")]
    weights: String,

    /// Sakoe-Chiba band width as a fraction of the longer length (1.0 = unconstrained)
    #[arg(long, default_value_t = 0.1)]
    band: f64,

    /// Multichannel alignment: "dependent" or "independent"
    #[arg(long, default_value = "dependent")]
    generalization: String,

    /// Step between candidate window starts and lengths (pruned search)
    #[arg(long, default_value_t = 10)]
    stride: usize,

    /// Allowed window length deviation from the template length (pruned search)
    #[arg(long, default_value_t = 0.25)]
    length_tolerance: f64,

    /// Resampling direction: "to-smaller" or "to-bigger" (pruned search)
    #[arg(long, default_value = "to-smaller")]
    interpolation: String,

    /// LB_Keogh envelope radius, an absolute offset on sample values (pruned search)
    #[arg(long, default_value_t = 0.1)]
    envelope_radius: f64,

    /// Largest accepted match cost (global policy)
    #[arg(long, default_value_t = 0.5)]
    cost_threshold: f64,

    /// Minimum match length as a fraction of the template length (length-ratio policy)
    #[arg(long, default_value_t = 0.5)]
    alpha: f64,

    /// Suppressed span shrink factor (length-ratio policy)
    #[arg(long, default_value_t = 0.05)]
    beta: f64,

    /// Smallest rejected per-row match cost (length-ratio policy)
    #[arg(long, default_value_t = 0.3)]
    gamma: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Extract every template occurrence from a session recording
    Extract {
        /// Path to the session CSV file
        #[arg(long)]
        session: PathBuf,

        /// Path to the template catalog CSV file
        #[arg(long)]
        templates: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Suppression policy: "global" or "length-ratio"
        #[arg(long, default_value = "global")]
        policy: String,

        /// Search strategy: "pruned" or "exhaustive" (defaults to pruned for global, exhaustive for length-ratio)
        #[arg(long)]
        strategy: Option<String>,

        /// Min-max normalize templates and session together before matching
        #[arg(long, default_value_t = false)]
        normalize: bool,

        /// Sampling rate of the recordings in Hz
        #[arg(long, default_value_t = 50.0)]
        sampling_hz: f64,

        /// First CSV column of the session is a timestamp
        #[arg(long, default_value_t = false)]
        time_column: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Find the best window of a target for a single reference
    Search {
        /// Path to the reference CSV file
        #[arg(long)]
        reference: PathBuf,

        /// Path to the target CSV file
        #[arg(long)]
        target: PathBuf,

        /// Search strategy: "pruned" or "exhaustive"
        #[arg(long, default_value = "pruned")]
        strategy: String,

        /// First CSV column of both files is a timestamp
        #[arg(long, default_value_t = false)]
        time_column: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Compute the DTW cost between two recordings
    Align {
        /// Path to the first CSV file
        #[arg(long)]
        a: PathBuf,

        /// Path to the second CSV file
        #[arg(long)]
        b: PathBuf,

        /// First CSV column of both files is a timestamp
        #[arg(long, default_value_t = false)]
        time_column: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ExtractOutput {
    experiment: String,
    n_templates: usize,
    n_rows: usize,
    n_patterns: usize,
    correct: usize,
    pruned: u64,
    evaluated: u64,
    total_ms: f64,
    output: PathBuf,
}

#[derive(Serialize)]
struct SearchOutput {
    strategy: String,
    matched: bool,
    start: usize,
    end: usize,
    cost: f64,
    pruned: u64,
    evaluated: u64,
}

#[derive(Serialize)]
struct AlignOutput {
    metric: String,
    n: usize,
    m: usize,
    cost: f64,
}

fn parse_metric(s: &str) -> Result<DistanceMetric> {
    match s {
        "manhattan" => Ok(DistanceMetric::Manhattan),
        "euclidean" => Ok(DistanceMetric::Euclidean),
        "squared-euclidean" => Ok(DistanceMetric::SquaredEuclidean),
        other => anyhow::bail!(
            "unknown metric: {other} (expected manhattan, euclidean, or squared-euclidean)"
        ),
    }
}

fn parse_weights(s: &str) -> Result<LocalWeights> {
    match s {
        "symmetric" => Ok(LocalWeights::Symmetric),
        "asymmetric" => Ok(LocalWeights::Asymmetric),
        other => anyhow::bail!("unknown weights: {other} (expected symmetric or asymmetric)"),
    }
}

fn parse_generalization(s: &str) -> Result<Generalization> {
    match s {
        "dependent" => Ok(Generalization::Dependent),
        "independent" => Ok(Generalization::Independent),
        other => anyhow::bail!("unknown generalization: {other} (expected dependent or independent)"),
    }
}

fn parse_interpolation(s: &str) -> Result<Interpolation> {
    match s {
        "to-smaller" => Ok(Interpolation::ToSmaller),
        "to-bigger" => Ok(Interpolation::ToBigger),
        other => anyhow::bail!("unknown interpolation: {other} (expected to-smaller or to-bigger)"),
    }
}

fn parse_policy(s: &str, tuning: &TuningArgs) -> Result<SuppressionPolicy> {
    match s {
        "global" => Ok(SuppressionPolicy::GlobalThreshold {
            cost_threshold: tuning.cost_threshold,
        }),
        "length-ratio" => Ok(SuppressionPolicy::LengthRatio {
            length_tolerance: tuning.alpha,
            overlap: tuning.beta,
            cost_threshold: tuning.gamma,
        }),
        other => anyhow::bail!("unknown policy: {other} (expected global or length-ratio)"),
    }
}

fn build_dtw(tuning: &TuningArgs) -> Result<Dtw> {
    Ok(Dtw::new(parse_metric(&tuning.metric)?)
        .with_weights(parse_weights(&tuning.weights)?)
        .with_band(BandConstraint::new(tuning.band))
        .with_generalization(parse_generalization(&tuning.generalization)?))
}

fn build_strategy(s: &str, tuning: &TuningArgs) -> Result<SearchStrategy> {
    match s {
        "pruned" => Ok(PrunedSearch::new(build_dtw(tuning)?)
            .with_stride(tuning.stride)
            .with_length_tolerance(tuning.length_tolerance)
            .with_interpolation(parse_interpolation(&tuning.interpolation)?)
            .with_envelope_radius(tuning.envelope_radius)
            .into()),
        "exhaustive" => Ok(ExhaustiveSearch::new(parse_metric(&tuning.metric)?)
            .with_weights(parse_weights(&tuning.weights)?)
            .into()),
        other => anyhow::bail!("unknown strategy: {other} (expected pruned or exhaustive)"),
    }
}

fn read_sequence(path: &Path, time_column: bool, what: &str) -> Result<Sequence> {
    let recording = SequenceReader::new(path)
        .with_time_column(time_column)
        .read()
        .with_context(|| format!("failed to read {what} CSV"))?;
    Ok(recording.sequence)
}

/// Normalize templates and session with shared per-channel extremes.
fn normalize_together(templates: Vec<Template>, session: Sequence) -> Result<(Vec<Template>, Sequence)> {
    let mut dataset: Vec<Sequence> = templates.iter().map(|t| t.sequence.clone()).collect();
    dataset.push(session);
    let mut normalized = min_max_normalize(&dataset).context("min-max normalization failed")?;
    let session = normalized
        .pop()
        .context("normalization returned no session")?;
    let templates = templates
        .into_iter()
        .zip(normalized)
        .map(|(t, sequence)| Template::new(t.label, sequence))
        .collect();
    info!("min-max normalized templates and session");
    Ok((templates, session))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Extract {
            session,
            templates,
            experiment,
            output_dir,
            policy,
            strategy,
            normalize,
            sampling_hz,
            time_column,
            tuning,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Read inputs
            let catalog = TemplateCatalogReader::new(&templates)
                .read()
                .context("failed to read template catalog")?;
            let target = read_sequence(&session, time_column, "session")?;
            info!(n_templates = catalog.len(), n_rows = target.len(), "inputs loaded");

            let (templates, target) = if normalize {
                normalize_together(catalog.into_templates(), target)?
            } else {
                (catalog.into_templates(), target)
            };

            // 2. Configure and run extraction
            let policy = parse_policy(&policy, &tuning)?;
            let strategy = strategy.unwrap_or_else(|| {
                if policy.per_template_copies() { "exhaustive" } else { "pruned" }.to_string()
            });
            let config =
                ExtractorConfig::new(policy).with_strategy(build_strategy(&strategy, &tuning)?);
            let n_templates = templates.len();
            let extractor = PatternExtractor::new(config, templates);
            let extraction = extractor
                .extract(&target, &mut TracingObserver)
                .context("extraction failed")?;

            // 3. Summarize and write JSON artifact
            let summary = SessionSummary::new(&extraction.patterns, target.len(), sampling_hz);
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let path = writer.write_patterns(&extraction, &summary)?;

            let calculations = extraction.performance.calculations;
            let output = ExtractOutput {
                experiment,
                n_templates,
                n_rows: target.len(),
                n_patterns: extraction.patterns.len(),
                correct: summary.count.correct,
                pruned: calculations.pruned,
                evaluated: calculations.evaluated,
                total_ms: extraction.performance.total_time.as_secs_f64() * 1000.0,
                output: path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Search {
            reference,
            target,
            strategy,
            time_column,
            tuning,
        } => {
            let reference = read_sequence(&reference, time_column, "reference")?;
            let target = read_sequence(&target, time_column, "target")?;
            let search = build_strategy(&strategy, &tuning)?;

            let report = search
                .search(reference.as_view(), target.as_view())
                .context("search failed")?;
            info!(cost = %report.cost, "search complete");

            let output = SearchOutput {
                strategy,
                matched: report.is_match(),
                start: report.start,
                end: report.end,
                cost: report.cost.value(),
                pruned: report.pruned,
                evaluated: report.evaluated,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Align {
            a,
            b,
            time_column,
            tuning,
        } => {
            let a = read_sequence(&a, time_column, "first")?;
            let b = read_sequence(&b, time_column, "second")?;
            let dtw = build_dtw(&tuning)?;

            let cost = dtw
                .align_cost(a.as_view(), b.as_view())
                .context("alignment failed")?;

            let output = AlignOutput {
                metric: dtw.metric().to_string(),
                n: a.len(),
                m: b.len(),
                cost: cost.value(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
