//! Date conversion.
//!
//! Transaction timestamps arrive as ISO date strings. An absolute date is
//! useless to the regressor, so the timestamp column is replaced with the
//! signed number of days since the first record's timestamp. That keeps
//! the feature numeric and on a scale comparable to the other columns.

use crate::error::{PipelineError, Result};
use crate::schema::{Frame, Value};
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Signed number of days from `base_day` to `current_day`.
///
/// Both inputs must be strict ISO `year-month-day` strings; anything else
/// fails with [`PipelineError::DateFormat`].
///
/// `days_between(d, d) == 0` for every valid `d`, and the function is
/// antisymmetric: `days_between(a, b) == -days_between(b, a)`.
pub fn days_between(base_day: &str, current_day: &str) -> Result<i64> {
    let base = parse_date(base_day)?;
    let current = parse_date(current_day)?;
    Ok((current - base).num_days())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| PipelineError::DateFormat {
        value: value.to_string(),
        source,
    })
}

/// Replace the `column` timestamps with day offsets from the first record.
///
/// The anchor is the first record's value of `column`. If that value is
/// missing or not a text date, the run fails with
/// [`PipelineError::MissingBaseTimestamp`]; a later record with a missing
/// timestamp keeps its [`Value::Missing`] and is handled by imputation
/// like any other absent numeric feature. A later record with a
/// non-date value fails with [`PipelineError::DateFormat`].
pub fn timestamps_to_day_offsets(mut frame: Frame, column: &str) -> Result<Frame> {
    frame.column_index(column)?;

    let base_day = match frame.records.first().and_then(|r| r.get(column)) {
        Some(Value::Text(day)) => day.clone(),
        _ => {
            return Err(PipelineError::MissingBaseTimestamp {
                column: column.to_string(),
            })
        }
    };
    // Reject a malformed anchor before walking the rest of the rows.
    parse_date(&base_day)?;

    for record in &mut frame.records {
        let offset = match record.get(column) {
            Some(Value::Text(day)) => Value::Int(days_between(&base_day, day)?),
            Some(Value::Missing) | None => Value::Missing,
            // A numeric cell in the timestamp column: parse its rendering
            // so the failure carries the usual DateFormat shape.
            Some(other) => {
                parse_date(&other.to_string())?;
                unreachable!("numeric cell cannot parse as a date")
            }
        };
        record.insert(column.to_string(), offset);
    }

    Ok(frame)
}
