//! Dataset assembly.
//!
//! The assembler connects the loader and the transformers into the fixed
//! pipeline order and produces the final labeled example set:
//!
//! ```text
//! CSV file
//!   -> raw records            (loader)
//!   -> drop id                (identifier carries no signal)
//!   -> timestamps to offsets  (dates)
//!   -> one-hot categoricals   (encoding, before any split)
//!   -> binarize yes/no + product type
//!   -> split label column off (labels are never imputed)
//!   -> impute missing         (feature frame only)
//!   -> Examples               (features + label, original row order)
//! ```
//!
//! The stage order is load-bearing twice over: one-hot vocabularies are
//! derived from the full frame before the holdout split, and imputation
//! runs only after the label has been removed. No stage reorders records,
//! so the label at position `i` always belongs to the features at
//! position `i`.
//!
//! The assembled [`Dataset`] is built once at startup and passed by
//! reference to every consumer; there is no hidden process-wide cache.

use crate::config::DataConfig;
use crate::error::{PipelineError, Result};
use crate::loader::CsvLoader;
use crate::schema::{Frame, Value};
use crate::transform::{binarize, impute_missing, one_hot_encode, timestamps_to_day_offsets};
use ndarray::Array1;

/// One labeled data point, immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    /// Encoded feature vector, ordered by [`Dataset::feature_names`].
    pub features: Array1<f64>,

    /// The sale price.
    pub label: f64,
}

/// The assembled example set with its feature schema.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature vector layout, shared by every example.
    pub feature_names: Vec<String>,

    /// Examples in original file row order.
    pub examples: Vec<Example>,
}

impl Dataset {
    /// Number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Width of every feature vector.
    pub fn feature_width(&self) -> usize {
        self.feature_names.len()
    }

    /// Carve a fixed-size held-out slice off the front.
    ///
    /// Returns `(train, test)` where `test` holds the first `test_size`
    /// examples in their original order and `train` the remainder. Fails
    /// if the holdout would not leave at least one training example.
    pub fn split_holdout(self, test_size: usize) -> Result<(Dataset, Dataset)> {
        if test_size >= self.len() {
            return Err(PipelineError::Config(format!(
                "test_size ({}) must leave at least one of {} examples for training",
                test_size,
                self.len()
            )));
        }
        let mut examples = self.examples;
        let train_examples = examples.split_off(test_size);
        let test = Dataset {
            feature_names: self.feature_names.clone(),
            examples,
        };
        let train = Dataset {
            feature_names: self.feature_names,
            examples: train_examples,
        };
        Ok((train, test))
    }
}

/// Orchestrates the transformation stages into a [`Dataset`].
pub struct DatasetAssembler {
    config: DataConfig,
}

impl DatasetAssembler {
    /// Create an assembler for the configured data layout.
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    /// The data configuration in use.
    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Run the full pipeline: load, transform, split the label, impute,
    /// and vectorize.
    pub fn assemble(&self) -> Result<Dataset> {
        self.config.validate()?;

        let frame = CsvLoader::new()
            .with_missing_marker(&self.config.missing_marker)
            .load(&self.config.csv_path)?;
        log::info!(
            "loaded {} transactions with {} columns",
            frame.len(),
            frame.columns.len()
        );

        let frame = self.transform(frame)?;
        let (frame, labels) = self.split_label(frame)?;
        let frame = impute_missing(frame)?;
        let dataset = vectorize(frame, labels)?;

        log::info!(
            "assembled {} examples with {} features",
            dataset.len(),
            dataset.feature_width()
        );
        Ok(dataset)
    }

    /// The encoding stages, in fixed order, label still in place.
    fn transform(&self, frame: Frame) -> Result<Frame> {
        let config = &self.config;
        let frame = frame.drop_column(&config.id_column)?;
        let frame = timestamps_to_day_offsets(frame, &config.timestamp_column)?;

        let categorical: Vec<&str> = config
            .categorical_columns
            .iter()
            .map(String::as_str)
            .collect();
        let frame = one_hot_encode(frame, &categorical)?;

        let yes_no: Vec<&str> = config.yes_no_columns.iter().map(String::as_str).collect();
        let frame = binarize(frame, &yes_no, &Value::Text(config.yes_value.clone()))?;

        match &config.product_type_column {
            Some(column) => binarize(
                frame,
                &[column.as_str()],
                &Value::Text(config.investment_value.clone()),
            ),
            None => Ok(frame),
        }
    }

    /// Split the label column off as a numeric sequence.
    ///
    /// A missing or non-numeric label fails the run; supervision is never
    /// repaired.
    fn split_label(&self, frame: Frame) -> Result<(Frame, Vec<f64>)> {
        let (frame, raw) = frame.take_column(&self.config.label_column)?;
        let mut labels = Vec::with_capacity(raw.len());
        for (row, value) in raw.into_iter().enumerate() {
            let label = value.as_f64().ok_or_else(|| PipelineError::InvalidLabel {
                row,
                column: self.config.label_column.clone(),
            })?;
            labels.push(label);
        }
        Ok((frame, labels))
    }
}

/// Rejoin the imputed feature frame with its label sequence.
fn vectorize(frame: Frame, labels: Vec<f64>) -> Result<Dataset> {
    let feature_names = frame.columns;
    let mut examples = Vec::with_capacity(frame.records.len());

    for (row, (record, label)) in frame.records.into_iter().zip(labels).enumerate() {
        let mut features = Vec::with_capacity(feature_names.len());
        for column in &feature_names {
            let value = record
                .get(column)
                .and_then(Value::as_f64)
                .ok_or_else(|| PipelineError::NonNumericFeature {
                    row,
                    column: column.clone(),
                })?;
            features.push(value);
        }
        examples.push(Example {
            features: Array1::from_vec(features),
            label,
        });
    }

    Ok(Dataset {
        feature_names,
        examples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn assembler_for(csv: &str) -> (DatasetAssembler, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let config = DataConfig {
            csv_path: file.path().to_path_buf(),
            categorical_columns: vec!["sub_area".to_string()],
            yes_no_columns: vec!["water_1line".to_string()],
            ..DataConfig::default()
        };
        (DatasetAssembler::new(config), file)
    }

    const SMALL_CSV: &str = "\
id,timestamp,sub_area,water_1line,product_type,full_sq,price_doc
1,2014-06-30,north,yes,Investment,50,1000000
2,2014-07-01,south,no,OwnerOccupier,NA,2000000
3,2014-07-05,north,no,Investment,70,1500000
";

    #[test]
    fn test_assemble_small_csv() {
        let (assembler, _file) = assembler_for(SMALL_CSV);
        let dataset = assembler.assemble().unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(
            dataset.feature_names,
            vec![
                "timestamp",
                "sub_area_0",
                "sub_area_1",
                "water_1line",
                "product_type",
                "full_sq"
            ]
        );
        // id is gone, the day offsets anchor at row 0, the missing
        // full_sq imputes to the mean of 50 and 70.
        assert_eq!(
            dataset.examples[0].features,
            arr1(&[0.0, 1.0, 0.0, 1.0, 1.0, 50.0])
        );
        assert_eq!(
            dataset.examples[1].features,
            arr1(&[1.0, 0.0, 1.0, 0.0, 0.0, 60.0])
        );
        assert_eq!(
            dataset.examples[2].features,
            arr1(&[5.0, 1.0, 0.0, 0.0, 1.0, 70.0])
        );
    }

    #[test]
    fn test_labels_stay_aligned_in_row_order() {
        let (assembler, _file) = assembler_for(SMALL_CSV);
        let dataset = assembler.assemble().unwrap();

        let labels: Vec<f64> = dataset.examples.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec![1_000_000.0, 2_000_000.0, 1_500_000.0]);
    }

    #[test]
    fn test_missing_label_is_rejected() {
        let csv = "\
id,timestamp,sub_area,water_1line,product_type,price_doc
1,2014-06-30,north,yes,Investment,NA
";
        let (assembler, _file) = assembler_for(csv);
        let err = assembler.assemble().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidLabel { row: 0, .. }));
    }

    #[test]
    fn test_fully_missing_feature_column_is_rejected() {
        let csv = "\
id,timestamp,sub_area,water_1line,product_type,full_sq,price_doc
1,2014-06-30,north,yes,Investment,NA,1000000
2,2014-07-01,south,no,Investment,NA,2000000
";
        let (assembler, _file) = assembler_for(csv);
        let err = assembler.assemble().unwrap_err();
        assert!(matches!(err, PipelineError::EmptyColumn { .. }));
    }

    #[test]
    fn test_unencoded_text_feature_is_rejected() {
        // A text column that no encoding stage claims reaches
        // vectorization and fails there.
        let csv = "\
id,timestamp,sub_area,water_1line,product_type,note,price_doc
1,2014-06-30,north,yes,Investment,odd,1000000
";
        let (assembler, _file) = assembler_for(csv);
        let err = assembler.assemble().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::NonNumericFeature { row: 0, .. }
        ));
    }

    #[test]
    fn test_split_holdout() {
        let dataset = Dataset {
            feature_names: vec!["x".to_string()],
            examples: (0..5)
                .map(|i| Example {
                    features: arr1(&[i as f64]),
                    label: i as f64,
                })
                .collect(),
        };

        let (train, test) = dataset.split_holdout(2).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 3);
        assert_eq!(test.examples[0].label, 0.0);
        assert_eq!(train.examples[0].label, 2.0);
    }

    #[test]
    fn test_split_holdout_must_leave_training_data() {
        let dataset = Dataset {
            feature_names: vec!["x".to_string()],
            examples: vec![Example {
                features: arr1(&[1.0]),
                label: 1.0,
            }],
        };
        assert!(dataset.split_holdout(1).is_err());
    }
}
