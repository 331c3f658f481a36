//! Mean imputation for missing values.
//!
//! Runs on the feature-only frame, after the label has been split off.
//! The label is supervision, never data to be repaired, so the assembler
//! enforces that ordering.
//!
//! For every column the mean is computed over all non-missing numeric
//! values (integers promote to float), then every missing cell in that
//! column is replaced with the mean. A column that has missing cells but
//! not a single numeric observation has no mean to offer; that surfaces
//! as [`PipelineError::EmptyColumn`] instead of a silent NaN or zero.
//!
//! Text fallbacks are neither missing nor numeric: they contribute nothing
//! to the mean and are left untouched. If one survives to vectorization
//! the assembler rejects it there.

use crate::error::{PipelineError, Result};
use crate::schema::{Frame, Value};

/// Replace every missing value with its column mean.
pub fn impute_missing(mut frame: Frame) -> Result<Frame> {
    let columns = frame.columns.clone();

    for column in &columns {
        let mut sum = 0.0_f64;
        let mut count = 0_usize;
        let mut missing = 0_usize;

        for record in &frame.records {
            match record.get(column) {
                Some(value) if value.is_missing() => missing += 1,
                Some(value) => {
                    if let Some(x) = value.as_f64() {
                        sum += x;
                        count += 1;
                    }
                }
                None => missing += 1,
            }
        }

        if missing == 0 {
            continue;
        }
        if count == 0 {
            return Err(PipelineError::EmptyColumn {
                column: column.clone(),
            });
        }

        let mean = sum / count as f64;
        log::debug!("imputing {} missing cells in {:?} with {}", missing, column, mean);

        for record in &mut frame.records {
            let absent = match record.get(column) {
                Some(value) => value.is_missing(),
                None => true,
            };
            if absent {
                record.insert(column.clone(), Value::Float(mean));
            }
        }
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Record;

    fn frame_of(column: &str, values: Vec<Value>) -> Frame {
        let records = values
            .into_iter()
            .map(|v| Record::from_iter([(column.to_string(), v)]))
            .collect();
        Frame::new(vec![column.to_string()], records)
    }

    #[test]
    fn test_mean_of_two_and_four_is_three() {
        let frame = frame_of("sq", vec![Value::Int(2), Value::Int(4), Value::Missing]);
        let out = impute_missing(frame).unwrap();
        assert_eq!(out.records[2]["sq"], Value::Float(3.0));
    }

    #[test]
    fn test_no_missing_marker_survives() {
        let frame = frame_of(
            "sq",
            vec![Value::Float(1.5), Value::Missing, Value::Missing],
        );
        let out = impute_missing(frame).unwrap();
        assert!(out
            .records
            .iter()
            .all(|r| !r["sq"].is_missing()));
    }

    #[test]
    fn test_int_float_mix_promotes() {
        let frame = frame_of("sq", vec![Value::Int(1), Value::Float(2.0), Value::Missing]);
        let out = impute_missing(frame).unwrap();
        assert_eq!(out.records[2]["sq"], Value::Float(1.5));
    }

    #[test]
    fn test_observed_values_are_untouched() {
        let frame = frame_of("sq", vec![Value::Int(2), Value::Missing]);
        let out = impute_missing(frame).unwrap();
        assert_eq!(out.records[0]["sq"], Value::Int(2));
    }

    #[test]
    fn test_fully_missing_column_is_an_error() {
        let frame = frame_of("sq", vec![Value::Missing, Value::Missing]);
        let err = impute_missing(frame).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyColumn { .. }));
    }

    #[test]
    fn test_text_only_column_without_missing_is_skipped() {
        // Nothing to impute, so the lack of numeric observations is fine.
        let frame = frame_of(
            "note",
            vec![Value::Text("a".into()), Value::Text("b".into())],
        );
        let out = impute_missing(frame).unwrap();
        assert_eq!(out.records[0]["note"], Value::Text("a".into()));
    }

    #[test]
    fn test_text_does_not_contribute_to_mean() {
        let frame = frame_of(
            "sq",
            vec![Value::Int(2), Value::Text("oops".into()), Value::Missing],
        );
        let out = impute_missing(frame).unwrap();
        // Mean over the single numeric observation.
        assert_eq!(out.records[2]["sq"], Value::Float(2.0));
        assert_eq!(out.records[1]["sq"], Value::Text("oops".into()));
    }
}
