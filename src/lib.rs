//! Price Pipeline
//!
//! Feature engineering and training pipeline for housing price regression.
//!
//! # Overview
//!
//! This library loads a real-estate transaction CSV, cleans and encodes it
//! into uniform numeric feature vectors, and trains a feed-forward network
//! to regress the sale price. The feature pipeline is the substance; the
//! network is declared as data and trained behind a narrow interface.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        Price Pipeline                          │
//! ├────────────────────────────────────────────────────────────────┤
//! │  schema/     - cell values, records, frames                    │
//! │  loader      - CSV file to raw record frame                    │
//! │  transform/  - date offsets, one-hot, binarize, imputation     │
//! │  dataset     - fixed-order assembly into labeled examples      │
//! │  stream      - infinite shuffled epoch batches                 │
//! │  network/    - topology, MLP, optimizers, training driver      │
//! │  config      - data layout + hyperparameters, TOML/JSON        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data flow: file -> raw records -> drop id -> dates to day offsets ->
//! one-hot categoricals -> binarize yes/no -> split label -> impute ->
//! labeled examples -> shuffled batch stream -> trainer.
//!
//! # Example
//!
//! ```ignore
//! use price_pipeline::{
//!     config::PipelineConfig, dataset::DatasetAssembler, network::MlpTrainer,
//!     network::{TopologySpec, TrainOptions, Trainer}, stream::EpochStream,
//! };
//!
//! let config = PipelineConfig::default();
//! let dataset = DatasetAssembler::new(config.data.clone()).assemble()?;
//! let (train, test) = dataset.split_holdout(config.training.test_size)?;
//!
//! let topology = TopologySpec::regression(train.feature_width());
//! let mut stream = EpochStream::new(
//!     train.examples, config.training.epoch_size, config.training.seed)?;
//! let model = MlpTrainer::new().train(&topology, &mut stream, &test.examples, &options)?;
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod network;
pub mod schema;
pub mod stream;
pub mod transform;

// Re-exports - Errors
pub use error::{PipelineError, Result};

// Re-exports - Config
pub use config::{DataConfig, PipelineConfig, TrainingConfig};

// Re-exports - Schema
pub use schema::{Frame, Record, Value};

// Re-exports - Loading
pub use loader::CsvLoader;

// Re-exports - Transforms
pub use transform::{
    binarize, days_between, impute_missing, one_hot_encode, timestamps_to_day_offsets,
    OneHotVocabulary,
};

// Re-exports - Dataset
pub use dataset::{Dataset, DatasetAssembler, Example};

// Re-exports - Streaming
pub use stream::{Batch, EpochStream};

// Re-exports - Network
pub use network::{
    Activation, LayerSpec, MlpTrainer, OptimizerConfig, TopologySpec, TrainOptions, TrainedModel,
    Trainer,
};
