//! Cell values and literal parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value after loading.
///
/// This is the explicit parse-result type for CSV cells: a cell either
/// parses as a numeric literal, matches the missing-value marker, or falls
/// back to its raw text. Downstream code matches on the variant instead of
/// catching an error as a sentinel for "not a number".
///
/// `Missing` is a distinguished token meaning "value not observed", not a
/// null: it participates in one-hot vocabularies as its own class and is
/// the only variant replaced by mean imputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Integer literal.
    Int(i64),

    /// Floating-point literal.
    Float(f64),

    /// Raw text fallback for anything that is neither numeric nor the
    /// missing marker.
    Text(String),

    /// The missing-value marker.
    Missing,
}

impl Value {
    /// Parse one raw CSV cell.
    ///
    /// Attempts integer, then float, then falls back to text. A cell equal
    /// to `missing_marker` becomes [`Value::Missing`]. Surrounding
    /// whitespace is trimmed first.
    pub fn parse_cell(raw: &str, missing_marker: &str) -> Value {
        let cell = raw.trim();
        if cell == missing_marker {
            return Value::Missing;
        }
        if let Ok(i) = cell.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = cell.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Text(cell.to_string())
    }

    /// Numeric view of this value, promoting integers to float.
    ///
    /// Returns `None` for `Text` and `Missing`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) | Value::Missing => None,
        }
    }

    /// Whether this value is the missing marker.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}
