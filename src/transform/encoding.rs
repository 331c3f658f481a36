//! Categorical encodings.
//!
//! Two encodings cover the categorical columns of the transaction data:
//!
//! - **One-hot**: a column with `n` distinct observed values becomes `n`
//!   indicator columns `{name}_0 .. {name}_{n-1}`, exactly one of them 1
//!   per record.
//! - **Binarize**: a column collapses to 1 where the value equals a chosen
//!   positive value and 0 everywhere else, used for yes/no columns and for
//!   categoricals treated as binary (product type vs. `"Investment"`).
//!
//! # Vocabulary derivation
//!
//! A [`OneHotVocabulary`] is derived from whatever frame it is given: the
//! class list is the distinct values in first-observed order, nothing
//! more. Two different subsets of data can therefore assign different
//! indices to the same logical category. That is a documented property of
//! the pipeline, not a bug: the assembler always encodes the full frame
//! before any split, so a single run only ever sees one consistent
//! assignment. Reusing a derived vocabulary against other data is
//! supported, and that is where the [`PipelineError::LabelNotFound`]
//! lookup error becomes reachable.

use crate::error::{PipelineError, Result};
use crate::schema::{Frame, Value};
use std::collections::HashMap;

type ClassIndex = HashMap<ClassKey, usize, ahash::RandomState>;

/// Class key for vocabulary lookups.
///
/// The missing marker is a distinguished token, so it forms its own class
/// rather than colliding with any text rendering of "missing".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ClassKey {
    Token(String),
    Missing,
}

impl ClassKey {
    fn for_value(value: &Value) -> ClassKey {
        match value {
            Value::Missing => ClassKey::Missing,
            other => ClassKey::Token(other.to_string()),
        }
    }
}

/// The derived class list for one categorical column.
///
/// Derive once, then apply to a frame: the column is removed and replaced
/// by one indicator column per class.
#[derive(Debug, Clone)]
pub struct OneHotVocabulary {
    column: String,
    classes: Vec<ClassKey>,
    index: ClassIndex,
}

impl OneHotVocabulary {
    /// Derive the vocabulary for `column` from the frame.
    ///
    /// Classes are the distinct values of the column in first-observed
    /// order. A record without the field counts as missing.
    pub fn derive(frame: &Frame, column: &str) -> Result<OneHotVocabulary> {
        frame.column_index(column)?;

        let mut classes = Vec::new();
        let mut index = ClassIndex::default();
        for record in &frame.records {
            let key = match record.get(column) {
                Some(value) => ClassKey::for_value(value),
                None => ClassKey::Missing,
            };
            if !index.contains_key(&key) {
                index.insert(key.clone(), classes.len());
                classes.push(key);
            }
        }

        Ok(OneHotVocabulary {
            column: column.to_string(),
            classes,
            index,
        })
    }

    /// The column this vocabulary encodes.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Number of classes, which is the number of indicator columns
    /// produced by [`OneHotVocabulary::apply`].
    pub fn cardinality(&self) -> usize {
        self.classes.len()
    }

    /// Index of a value in the class list.
    ///
    /// Fails with [`PipelineError::LabelNotFound`] if the value was not
    /// observed when the vocabulary was derived. Unreachable when applying
    /// to the deriving frame; reachable when the vocabulary is reused.
    pub fn class_index(&self, value: &Value) -> Result<usize> {
        let key = ClassKey::for_value(value);
        self.index
            .get(&key)
            .copied()
            .ok_or_else(|| PipelineError::LabelNotFound {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    /// Replace the column with `cardinality()` indicator columns.
    ///
    /// Each record loses the source field and gains
    /// `{column}_0 .. {column}_{n-1}` integer fields, with a single 1 at
    /// the record's class index.
    pub fn apply(&self, mut frame: Frame) -> Result<Frame> {
        let position = frame.column_index(&self.column)?;

        let indicator_names: Vec<String> = (0..self.cardinality())
            .map(|i| format!("{}_{}", self.column, i))
            .collect();
        frame
            .columns
            .splice(position..=position, indicator_names.iter().cloned());

        for record in &mut frame.records {
            let value = record.remove(&self.column).unwrap_or(Value::Missing);
            let hot = self.class_index(&value)?;
            for (i, name) in indicator_names.iter().enumerate() {
                record.insert(name.clone(), Value::Int(i64::from(i == hot)));
            }
        }

        Ok(frame)
    }
}

/// One-hot encode each of `columns`, deriving the vocabulary from the
/// frame itself.
pub fn one_hot_encode(frame: Frame, columns: &[&str]) -> Result<Frame> {
    let mut frame = frame;
    for column in columns {
        let vocabulary = OneHotVocabulary::derive(&frame, column)?;
        log::debug!(
            "one-hot {:?}: {} classes",
            column,
            vocabulary.cardinality()
        );
        frame = vocabulary.apply(frame)?;
    }
    Ok(frame)
}

/// Map each of `columns` to 1 where the value equals `positive`, else 0.
///
/// Unmatched values become 0 without error, and a missing value never
/// equals a token, so missing cells become 0 as well. That collapse is a
/// deliberate simplification for yes/no columns.
pub fn binarize(mut frame: Frame, columns: &[&str], positive: &Value) -> Result<Frame> {
    for column in columns {
        frame.column_index(column)?;
    }
    for record in &mut frame.records {
        for column in columns {
            let hit = record.get(*column) == Some(positive);
            record.insert((*column).to_string(), Value::Int(i64::from(hit)));
        }
    }
    Ok(frame)
}
