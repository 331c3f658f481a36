//! Network construction and training.
//!
//! The pipeline does not specify the optimization algorithm itself; it
//! declares a topology, hands an infinite batch stream and a held-out
//! slice to a [`Trainer`], and gets a [`TrainedModel`] handle back. The
//! in-crate trainer is a plain feed-forward net on ndarray buffers.

pub mod mlp;
pub mod optimizer;
pub mod topology;
pub mod trainer;

pub use mlp::Mlp;
pub use optimizer::OptimizerConfig;
pub use topology::{Activation, LayerSpec, TopologySpec};
pub use trainer::{MlpTrainer, TrainOptions, TrainedModel, Trainer};
