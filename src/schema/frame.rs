//! Records and frames.
//!
//! A `Frame` is the unit passed between transformation stages: an ordered
//! column list plus one `Record` per data point. The column list is the
//! explicit schema; every transformer consumes a frame by value and returns
//! a new one, so a stage can change the schema (drop a column, fan one out
//! into one-hot fields) without implicit mutation of heterogeneous maps.
//!
//! Record order is file order until the epoch stream shuffles; the
//! feature/label alignment invariant depends on no stage reordering rows.

use crate::error::{PipelineError, Result};
use crate::schema::Value;
use std::collections::HashMap;

/// One data point's fields, keyed by column name.
pub type Record = HashMap<String, Value, ahash::RandomState>;

/// An ordered sequence of records with a shared column schema.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Column names in header order. Transformers keep this in sync with
    /// the record keys.
    pub columns: Vec<String>,

    /// Records in original file order.
    pub records: Vec<Record>,
}

impl Frame {
    /// Create a frame from a column list and records.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the frame holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a column exists in the schema.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of a column in the schema.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))
    }

    /// Drop a column from the schema and every record.
    ///
    /// Fails with [`PipelineError::UnknownColumn`] if the column does not
    /// exist.
    pub fn drop_column(mut self, name: &str) -> Result<Frame> {
        let index = self.column_index(name)?;
        self.columns.remove(index);
        for record in &mut self.records {
            record.remove(name);
        }
        Ok(self)
    }

    /// Split one column off as a value sequence, removing it from the
    /// schema and every record.
    ///
    /// The returned values are positionally aligned with the remaining
    /// records: index `i` came from record `i`.
    pub fn take_column(mut self, name: &str) -> Result<(Frame, Vec<Value>)> {
        let index = self.column_index(name)?;
        self.columns.remove(index);
        let mut values = Vec::with_capacity(self.records.len());
        for record in &mut self.records {
            values.push(record.remove(name).unwrap_or(Value::Missing));
        }
        Ok((self, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_frame() -> Frame {
        let columns = vec!["a".to_string(), "b".to_string()];
        let records = vec![
            Record::from_iter([
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::Int(10)),
            ]),
            Record::from_iter([
                ("a".to_string(), Value::Int(2)),
                ("b".to_string(), Value::Int(20)),
            ]),
        ];
        Frame::new(columns, records)
    }

    #[test]
    fn test_len_and_columns() {
        let frame = small_frame();
        assert_eq!(frame.len(), 2);
        assert!(frame.has_column("a"));
        assert!(!frame.has_column("c"));
        assert_eq!(frame.column_index("b").unwrap(), 1);
    }

    #[test]
    fn test_drop_column() {
        let frame = small_frame().drop_column("a").unwrap();
        assert_eq!(frame.columns, vec!["b".to_string()]);
        assert!(frame.records.iter().all(|r| !r.contains_key("a")));
    }

    #[test]
    fn test_drop_unknown_column() {
        let err = small_frame().drop_column("nope").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownColumn(_)));
    }

    #[test]
    fn test_take_column_alignment() {
        let (frame, values) = small_frame().take_column("b").unwrap();
        assert_eq!(values, vec![Value::Int(10), Value::Int(20)]);
        assert_eq!(frame.columns, vec!["a".to_string()]);
        // Records keep their order and remaining fields.
        assert_eq!(frame.records[0]["a"], Value::Int(1));
        assert_eq!(frame.records[1]["a"], Value::Int(2));
    }
}
