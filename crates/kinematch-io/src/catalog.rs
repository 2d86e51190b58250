//! Template catalog reader.

use std::path::{Path, PathBuf};

use kinematch_extract::{Execution, MovementType, Template, TemplateLabel};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::TemplateCatalog;
use crate::reader::SequenceReader;

/// One catalog row as it appears in the CSV.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    type_id: u32,
    type_name: String,
    execution_id: u32,
    execution_name: String,
    correct: bool,
    path: PathBuf,
}

/// Reads a template catalog and every template recording it lists.
///
/// Expected CSV format:
/// - `type_id,type_name,execution_id,execution_name,correct,path`
/// - `correct` is `true` or `false`
/// - Relative `path`s are resolved against the catalog's directory
/// - Each listed file is read with [`SequenceReader`]
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | Catalog or a template file is unreadable |
/// | [`IoError::CsvParse`] | Malformed catalog row or field |
/// | [`IoError::EmptyCatalog`] | Zero rows after header |
/// | any [`SequenceReader`] error | A template file is invalid |
#[derive(Debug, Clone)]
pub struct TemplateCatalogReader {
    path: PathBuf,
    time_column: bool,
}

impl TemplateCatalogReader {
    /// Create a new reader for the given catalog path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            time_column: false,
        }
    }

    /// Skip a leading time column in every template file.
    #[must_use]
    pub fn with_time_column(mut self, time_column: bool) -> Self {
        self.time_column = time_column;
        self
    }

    /// Read the catalog and load its templates in row order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<TemplateCatalog, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let base = self.path.parent().unwrap_or_else(|| Path::new(""));
        let mut templates = Vec::new();
        for result in rdr.deserialize::<CatalogRow>() {
            let row = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            let template_path = if row.path.is_absolute() {
                row.path.clone()
            } else {
                base.join(&row.path)
            };
            debug!(template = %template_path.display(), type_id = row.type_id, "loading template");

            let recording = SequenceReader::new(&template_path)
                .with_time_column(self.time_column)
                .read()?;
            let label = TemplateLabel::new(
                MovementType::new(row.type_id, row.type_name),
                Execution::new(row.execution_id, row.execution_name, row.correct),
            );
            templates.push(Template::new(label, recording.sequence));
        }

        if templates.is_empty() {
            return Err(IoError::EmptyCatalog {
                path: self.path.clone(),
            });
        }

        info!(templates = templates.len(), "template catalog loaded");
        Ok(TemplateCatalog { templates })
    }
}
