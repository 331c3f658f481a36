//! Pipeline configuration.
//!
//! One struct combines the data layout and the training hyperparameters,
//! with serialization support so a run's exact settings can live next to
//! its results.
//!
//! The hyperparameters are fixed in-process constants carried by the
//! `Default` impls; the `train` binary does not expose flags or
//! environment variables. The TOML/JSON helpers exist for experiment
//! bookkeeping, not for runtime switching.
//!
//! # Example
//!
//! ```ignore
//! use price_pipeline::config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! config.validate()?;
//! config.save_toml("run_config.toml")?;
//! ```

use crate::error::{PipelineError, Result};
use crate::network::OptimizerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete configuration for one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input file layout and column roles.
    pub data: DataConfig,

    /// Training hyperparameters.
    pub training: TrainingConfig,
}

/// Where the transaction CSV lives and what its columns mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the transaction CSV.
    pub csv_path: PathBuf,

    /// Token marking a missing value in the source data.
    pub missing_marker: String,

    /// Row identifier column, dropped before any transformation.
    pub id_column: String,

    /// ISO date column converted to day offsets.
    pub timestamp_column: String,

    /// Sale price column, split off as the regression label.
    pub label_column: String,

    /// Columns one-hot encoded from their observed values.
    pub categorical_columns: Vec<String>,

    /// Yes/no columns collapsed to 1 where the value is `yes_value`.
    pub yes_no_columns: Vec<String>,

    /// The positive token for the yes/no columns.
    pub yes_value: String,

    /// Product type column, treated as binary. `None` when the input
    /// carries no product type.
    pub product_type_column: Option<String>,

    /// The product type mapped to 1; everything else becomes 0.
    pub investment_value: String,
}

/// Hyperparameters handed to the trainer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Held-out examples reserved for evaluation.
    pub test_size: usize,

    /// Minibatch size inside one epoch.
    pub batch_size: usize,

    /// Examples consumed per epoch, drawn from the infinite stream.
    pub epoch_size: usize,

    /// Number of epochs to train.
    pub epoch_count: usize,

    /// Shuffle and weight-init seed; `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Optimizer choice, opaque to the pipeline.
    pub optimizer: OptimizerConfig,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/transactions.csv"),
            missing_marker: "NA".to_string(),
            id_column: "id".to_string(),
            timestamp_column: "timestamp".to_string(),
            label_column: "price_doc".to_string(),
            categorical_columns: vec!["sub_area".to_string(), "ecology".to_string()],
            yes_no_columns: vec![
                "culture_objects_top_25".to_string(),
                "thermal_power_plant_raion".to_string(),
                "incineration_raion".to_string(),
                "radiation_raion".to_string(),
                "big_market_raion".to_string(),
                "water_1line".to_string(),
            ],
            yes_value: "yes".to_string(),
            product_type_column: Some("product_type".to_string()),
            investment_value: "Investment".to_string(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 500,
            batch_size: 100,
            epoch_size: 5000,
            epoch_count: 10,
            seed: None,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl DataConfig {
    /// Validate the column roles.
    pub fn validate(&self) -> Result<()> {
        if self.missing_marker.is_empty() {
            return Err(PipelineError::Config(
                "missing_marker must not be empty".to_string(),
            ));
        }
        let named = [&self.id_column, &self.timestamp_column, &self.label_column];
        if named.iter().any(|c| c.is_empty()) {
            return Err(PipelineError::Config(
                "column names must not be empty".to_string(),
            ));
        }
        // The label is split off untouched; a config that also lists it
        // for a transformation would corrupt supervision.
        let transformed = self
            .categorical_columns
            .iter()
            .chain(&self.yes_no_columns)
            .chain(self.product_type_column.iter());
        for column in transformed {
            if column == &self.label_column {
                return Err(PipelineError::Config(format!(
                    "label column {:?} cannot also be transformed",
                    self.label_column
                )));
            }
        }
        Ok(())
    }
}

impl TrainingConfig {
    /// Validate the hyperparameters.
    pub fn validate(&self) -> Result<()> {
        if self.test_size == 0 {
            return Err(PipelineError::Config("test_size must be > 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::Config("batch_size must be > 0".to_string()));
        }
        if self.epoch_size == 0 {
            return Err(PipelineError::Config("epoch_size must be > 0".to_string()));
        }
        if self.epoch_count == 0 {
            return Err(PipelineError::Config("epoch_count must be > 0".to_string()));
        }
        if self.batch_size > self.epoch_size {
            return Err(PipelineError::Config(format!(
                "batch_size ({}) cannot exceed epoch_size ({})",
                self.batch_size, self.epoch_size
            )));
        }
        self.optimizer.validate()
    }
}

impl PipelineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate both halves.
    pub fn validate(&self) -> Result<()> {
        self.data.validate()?;
        self.training.validate()
    }

    /// Save to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("cannot serialize config: {}", e)))?;
        fs::write(path.as_ref(), text).map_err(|source| PipelineError::FileAccess {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// Load from a TOML file, validating on the way in.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text =
            fs::read_to_string(path.as_ref()).map_err(|source| PipelineError::FileAccess {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        let config: PipelineConfig = toml::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("cannot parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("cannot serialize config: {}", e)))?;
        fs::write(path.as_ref(), text).map_err(|source| PipelineError::FileAccess {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// Load from a JSON file, validating on the way in.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text =
            fs::read_to_string(path.as_ref()).map_err(|source| PipelineError::FileAccess {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        let config: PipelineConfig = serde_json::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("cannot parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_label_cannot_be_transformed() {
        let mut config = PipelineConfig::default();
        config.data.categorical_columns.push("price_doc".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_training_validation() {
        let mut config = TrainingConfig::default();
        assert!(config.validate().is_ok());

        config.batch_size = 0;
        assert!(config.validate().is_err());
        config.batch_size = 100;

        config.batch_size = config.epoch_size + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = PipelineConfig::default();
        config.training.seed = Some(42);
        config.save_toml(&path).unwrap();

        let loaded = PipelineConfig::load_toml(&path).unwrap();
        assert_eq!(loaded.training.seed, Some(42));
        assert_eq!(loaded.data.label_column, "price_doc");
        assert_eq!(loaded.training.epoch_size, config.training.epoch_size);
    }

    #[test]
    fn test_save_load_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        PipelineConfig::default().save_json(&path).unwrap();
        let loaded = PipelineConfig::load_json(&path).unwrap();
        assert_eq!(loaded.data.missing_marker, "NA");
    }
}
