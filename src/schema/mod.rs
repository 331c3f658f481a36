//! Record schema types.
//!
//! This module defines the data model carried between pipeline stages:
//! - `Value`: one cell, an explicit parse result (never an exception)
//! - `Record`: one data point's field map
//! - `Frame`: a record sequence with its ordered column schema

pub mod frame;
pub mod value;

pub use frame::{Frame, Record};
pub use value::Value;
