//! CSV recording reader with full input validation.

use std::path::{Path, PathBuf};

use kinematch_dtw::Sequence;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::Recording;

/// Reads a multichannel recording from a CSV file.
///
/// Expected CSV format:
/// - Header row required, one column per channel
/// - `ch0,ch1,...,chN`, or `time,ch0,...,chN` with [`with_time_column`](Self::with_time_column)
/// - One row per timestep, all rows must have the same number of columns
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoChannelColumns`] | Header leaves no channel column |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
#[derive(Debug, Clone)]
pub struct SequenceReader {
    path: PathBuf,
    time_column: bool,
}

impl SequenceReader {
    /// Create a new reader for the given CSV file path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            time_column: false,
        }
    }

    /// Skip the first column of every row as a timestamp.
    #[must_use]
    pub fn with_time_column(mut self, time_column: bool) -> Self {
        self.time_column = time_column;
        self
    }

    /// Read and validate the CSV file, returning a [`Recording`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Recording, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets the row length check below report the row index.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?;
        let expected_cols = header.len();
        let skip = usize::from(self.time_column);
        if expected_cols <= skip {
            return Err(IoError::NoChannelColumns {
                path: self.path.clone(),
            });
        }
        let channel_names: Vec<String> = header.iter().skip(skip).map(String::from).collect();
        debug!(expected_cols, channels = channel_names.len(), "read CSV header");

        let channels = channel_names.len();
        let mut data = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            for (channel, raw) in record.iter().skip(skip).enumerate() {
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        channel,
                        raw: raw.to_string(),
                    })?;
                data.push(value);
            }
        }

        if data.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let sequence =
            Sequence::from_flat(data, channels).map_err(|source| IoError::InvalidSequence {
                path: self.path.clone(),
                source,
            })?;

        info!(
            rows = sequence.len(),
            channels = sequence.channels(),
            "recording loaded"
        );

        Ok(Recording {
            channel_names,
            sequence,
        })
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_three_channels() {
        let csv = "ax,ay,az\n0.0,0.1,0.2\n1.0,1.1,1.2\n2.0,2.1,2.2\n3.0,3.1,3.2\n";
        let f = write_csv(csv);
        let rec = SequenceReader::new(f.path()).read().unwrap();
        assert_eq!(rec.channel_names, vec!["ax", "ay", "az"]);
        assert_eq!(rec.sequence.len(), 4);
        assert_eq!(rec.sequence.channels(), 3);
        assert_eq!(rec.sequence.row(2), &[2.0, 2.1, 2.2]);
    }

    #[test]
    fn time_column_is_skipped() {
        let csv = "t,gx,gy\n0.00,1.0,2.0\n0.02,3.0,4.0\n";
        let f = write_csv(csv);
        let rec = SequenceReader::new(f.path())
            .with_time_column(true)
            .read()
            .unwrap();
        assert_eq!(rec.channel_names, vec!["gx", "gy"]);
        assert_eq!(rec.sequence.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn value_round_trip() {
        let csv = "a,b\n1.23456789,-9.87654321\n";
        let f = write_csv(csv);
        let rec = SequenceReader::new(f.path()).read().unwrap();
        let vals = rec.sequence.as_slice();
        assert!((vals[0] - 1.23456789).abs() < 1e-12);
        assert!((vals[1] + 9.87654321).abs() < 1e-12);
    }

    #[test]
    fn error_file_not_found() {
        let result = SequenceReader::new(Path::new("/nonexistent/session.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv("a,b,c\n");
        let result = SequenceReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_time_column_only() {
        let f = write_csv("t\n0.0\n");
        let result = SequenceReader::new(f.path()).with_time_column(true).read();
        assert!(matches!(result, Err(IoError::NoChannelColumns { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let f = write_csv("a,b\n1.0,2.0\n3.0\n");
        let result = SequenceReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn error_non_finite_nan() {
        let f = write_csv("a,b\n1.0,NaN\n");
        let result = SequenceReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { channel: 1, .. })));
    }

    #[test]
    fn error_non_finite_inf() {
        let f = write_csv("a,b\ninf,1.0\n");
        let result = SequenceReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { channel: 0, .. })));
    }

    #[test]
    fn error_unparseable_value_reports_channel_after_time_column() {
        let f = write_csv("t,a,b\n0,1.0,abc\n");
        let result = SequenceReader::new(f.path()).with_time_column(true).read();
        assert!(matches!(
            result,
            Err(IoError::NonFiniteValue { row_index: 0, channel: 1, ref raw, .. }) if raw == "abc"
        ));
    }
}
