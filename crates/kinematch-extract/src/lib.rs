//! Greedy multi-template pattern extraction.
//!
//! Repeatedly searches every template against a session, keeps the cheapest
//! match, and suppresses its rows so that later iterations find the next
//! occurrence. Two suppression policies are available: a global cost
//! threshold over one shared working copy, and a length-ratio policy with
//! one working copy per template.

mod config;
mod error;
mod extractor;
mod observer;
mod pattern;
mod result;
mod summary;

pub use config::{ExtractorConfig, SearchStrategy, SuppressionPolicy};
pub use error::ExtractError;
pub use extractor::{ExtractionRun, PatternExtractor, RunState};
pub use observer::{ExtractionObserver, NoopObserver, TracingObserver};
pub use pattern::{Execution, MovementType, Pattern, PatternRange, Template, TemplateLabel};
pub use result::{CalculationStats, Extraction, PerformanceStats};
pub use summary::{CountSummary, ExecutionSummary, MovementSummary, SessionSummary, Share, TimeSummary};
