//! Domain types for kinematch-io.

use kinematch_dtw::Sequence;
use kinematch_extract::Template;

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, IoError> {
        let name = name.into();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A multichannel recording read from CSV.
///
/// Produced by [`SequenceReader`](crate::SequenceReader).
#[derive(Debug, Clone)]
pub struct Recording {
    /// Channel names from the CSV header, time column excluded.
    pub channel_names: Vec<String>,
    /// Samples, one row per CSV data row.
    pub sequence: Sequence,
}

/// Labeled templates resolved from a catalog file.
///
/// Produced by [`TemplateCatalogReader`](crate::TemplateCatalogReader), in
/// catalog row order.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    /// Templates in catalog order.
    pub templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Return the number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Return true if the catalog holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Consume the catalog and return its templates.
    #[must_use]
    pub fn into_templates(self) -> Vec<Template> {
        self.templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_name_valid() {
        let name = ExperimentName::new("session-07_left").unwrap();
        assert_eq!(name.as_str(), "session-07_left");
        assert_eq!(name.to_string(), "session-07_left");
    }

    #[test]
    fn experiment_name_rejects_empty() {
        let name = ExperimentName::new(String::new());
        assert!(matches!(name, Err(IoError::InvalidExperimentName { .. })));
    }

    #[test]
    fn experiment_name_rejects_path_separators() {
        let name = ExperimentName::new("../escape");
        assert!(matches!(name, Err(IoError::InvalidExperimentName { .. })));
    }
}
