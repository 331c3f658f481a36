//! Error types for the pipeline.
//!
//! One crate-level enum covers the whole error taxonomy. Transformation
//! errors are never recovered locally; they propagate to the caller, which
//! aborts the run rather than train on a partially transformed dataset.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// All failure modes of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input file is missing or unreadable. Fatal.
    #[error("cannot read input file {path}: {source}")]
    FileAccess {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV itself is structurally malformed (bad row, bad quoting).
    /// Unparseable *cells* are not errors; they fall back to text values.
    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    /// A date string does not match the strict `year-month-day` format.
    #[error("invalid date {value:?}: expected year-month-day: {source}")]
    DateFormat {
        /// The offending cell value.
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The first record's timestamp, used as the day-offset anchor, is
    /// absent or not a date string.
    #[error("first record has no usable {column:?} timestamp to anchor day offsets")]
    MissingBaseTimestamp {
        /// The timestamp column name.
        column: String,
    },

    /// A categorical value was looked up against a vocabulary it is not a
    /// member of. Not reachable when a vocabulary is applied to the frame
    /// it was derived from; reachable when reused against other data.
    #[error("value {value:?} is not in the derived classes for column {column:?}")]
    LabelNotFound {
        /// Column the vocabulary belongs to.
        column: String,
        /// The value that failed the lookup.
        value: String,
    },

    /// A feature column contains missing values but no numeric
    /// observations at all, so no mean exists to impute from.
    #[error("column {column:?} has no observed values to impute from")]
    EmptyColumn {
        /// The fully missing column.
        column: String,
    },

    /// A named column does not exist in the frame.
    #[error("unknown column {0:?}")]
    UnknownColumn(String),

    /// The label cell is missing or not numeric. Labels are never imputed.
    #[error("row {row}: label {column:?} is missing or not numeric")]
    InvalidLabel {
        /// Zero-based row index in original file order.
        row: usize,
        /// The label column name.
        column: String,
    },

    /// A feature cell is still non-numeric after encoding and imputation,
    /// typically a text fallback in a column that was never encoded.
    #[error("row {row}: feature {column:?} is not numeric after encoding")]
    NonNumericFeature {
        /// Zero-based row index in original file order.
        row: usize,
        /// The offending feature column.
        column: String,
    },

    /// Invalid configuration values.
    #[error("invalid configuration: {0}")]
    Config(String),
}
