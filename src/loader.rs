//! CSV loading and record building.
//!
//! The loader reads a delimited file with a header row into a [`Frame`]:
//! the header becomes the column schema, each subsequent row becomes a
//! [`Record`] whose cells are parsed into [`Value`]s (integer, float,
//! missing marker, or raw-text fallback).
//!
//! # Error behavior
//!
//! - Missing or unreadable file: [`PipelineError::FileAccess`], fatal.
//! - Structurally malformed CSV (row width, quoting):
//!   [`PipelineError::Csv`], fatal.
//! - A cell that is not a numeric literal: not an error, the raw string is
//!   carried through as [`Value::Text`].
//!
//! The file handle lives inside [`CsvLoader::load`] and is released when
//! the reader is dropped, on the error paths as well.
//!
//! # Example
//!
//! ```ignore
//! use price_pipeline::loader::CsvLoader;
//!
//! let frame = CsvLoader::new()
//!     .with_missing_marker("NA")
//!     .load("data/transactions.csv")?;
//! ```

use crate::error::{PipelineError, Result};
use crate::schema::{Frame, Record, Value};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Reads a delimited file into a frame of parsed records.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
    missing_marker: String,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            missing_marker: "NA".to_string(),
        }
    }
}

impl CsvLoader {
    /// Create a loader with comma delimiter and `NA` missing marker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the missing-value marker token.
    pub fn with_missing_marker(mut self, marker: impl Into<String>) -> Self {
        self.missing_marker = marker.into();
        self
    }

    /// Read the file at `path` into a frame.
    ///
    /// The header row names the columns; every following row must have the
    /// same width (the csv reader rejects ragged rows).
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Frame> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PipelineError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(file);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut record = Record::default();
            for (column, cell) in columns.iter().zip(row.iter()) {
                record.insert(column.clone(), Value::parse_cell(cell, &self.missing_marker));
            }
            records.push(record);
        }

        log::debug!(
            "loaded {} records with {} columns from {}",
            records.len(),
            columns.len(),
            path.display()
        );

        Ok(Frame::new(columns, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_parses_header_and_cells() {
        let file = write_csv("id,timestamp,price\n1,2014-06-30,540000\n2,NA,3.5\n");
        let frame = CsvLoader::new().load(file.path()).unwrap();

        assert_eq!(frame.columns, vec!["id", "timestamp", "price"]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.records[0]["id"], Value::Int(1));
        assert_eq!(
            frame.records[0]["timestamp"],
            Value::Text("2014-06-30".to_string())
        );
        assert_eq!(frame.records[0]["price"], Value::Int(540000));
        assert_eq!(frame.records[1]["timestamp"], Value::Missing);
        assert_eq!(frame.records[1]["price"], Value::Float(3.5));
    }

    #[test]
    fn test_load_missing_file_is_file_access_error() {
        let err = CsvLoader::new().load("/no/such/file.csv").unwrap_err();
        assert!(matches!(err, PipelineError::FileAccess { .. }));
    }

    #[test]
    fn test_load_ragged_row_is_csv_error() {
        let file = write_csv("a,b\n1,2\n3\n");
        let err = CsvLoader::new().load(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }

    #[test]
    fn test_custom_marker_and_delimiter() {
        let file = write_csv("a;b\n?;yes\n");
        let frame = CsvLoader::new()
            .with_delimiter(b';')
            .with_missing_marker("?")
            .load(file.path())
            .unwrap();

        assert_eq!(frame.records[0]["a"], Value::Missing);
        assert_eq!(frame.records[0]["b"], Value::Text("yes".to_string()));
    }
}
