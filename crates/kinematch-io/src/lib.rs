//! CSV readers and JSON result writer for the kinematch pipeline.

mod catalog;
mod domain;
mod error;
mod reader;
mod writer;

pub use catalog::TemplateCatalogReader;
pub use domain::{ExperimentName, Recording, TemplateCatalog};
pub use error::IoError;
pub use reader::SequenceReader;
pub use writer::ResultWriter;
