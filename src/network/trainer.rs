//! Training driver.
//!
//! The pipeline hands a topology, an infinite batch stream, and a held-out
//! slice to a [`Trainer`] and receives a [`TrainedModel`] back; everything
//! about the optimization itself stays behind that interface.
//!
//! [`MlpTrainer`] is the in-crate implementation. Per epoch it draws one
//! batch of `epoch_size` from the stream, walks it in minibatches of
//! `batch_size`, averages the gradients, and applies the configured
//! optimizer. Dropout is active only in the training pass; evaluation
//! always runs the plain inference pass.

use crate::dataset::Example;
use crate::error::Result;
use crate::network::mlp::Mlp;
use crate::network::optimizer::{OptimizerConfig, OptimizerState};
use crate::network::topology::TopologySpec;
use crate::stream::EpochStream;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Options handed through to the trainer as opaque parameters.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Minibatch size inside one epoch.
    pub batch_size: usize,

    /// Number of epochs to run.
    pub epoch_count: usize,

    /// Optimizer choice.
    pub optimizer: OptimizerConfig,
}

/// The narrow interface the pipeline consumes training through.
pub trait Trainer {
    /// Fit a model for `topology` on the stream, evaluating against the
    /// held-out slice as training progresses.
    fn train(
        &self,
        topology: &TopologySpec,
        train_stream: &mut EpochStream,
        test_set: &[Example],
        options: &TrainOptions,
    ) -> Result<TrainedModel>;
}

/// Handle to a fitted model.
pub struct TrainedModel {
    mlp: Mlp,
}

impl TrainedModel {
    /// Predict the price for one feature vector.
    pub fn predict(&self, features: &Array1<f64>) -> f64 {
        self.mlp.predict(features.view())
    }

    /// Root mean squared error over a slice of examples.
    pub fn evaluate(&self, examples: &[Example]) -> f64 {
        rmse(&self.mlp, examples)
    }
}

fn rmse(mlp: &Mlp, examples: &[Example]) -> f64 {
    if examples.is_empty() {
        return 0.0;
    }
    let sum: f64 = examples
        .iter()
        .map(|e| (mlp.predict(e.features.view()) - e.label).powi(2))
        .sum();
    (sum / examples.len() as f64).sqrt()
}

/// Feed-forward trainer over ndarray buffers.
pub struct MlpTrainer {
    seed: Option<u64>,
}

impl Default for MlpTrainer {
    fn default() -> Self {
        Self { seed: None }
    }
}

impl MlpTrainer {
    /// Create a trainer seeded from entropy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin weight initialization and dropout to a seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Trainer for MlpTrainer {
    fn train(
        &self,
        topology: &TopologySpec,
        train_stream: &mut EpochStream,
        test_set: &[Example],
        options: &TrainOptions,
    ) -> Result<TrainedModel> {
        topology.validate()?;
        options.optimizer.validate()?;
        if options.batch_size == 0 {
            return Err(crate::error::PipelineError::Config(
                "batch_size must be > 0".to_string(),
            ));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut mlp = Mlp::from_topology(topology, &mut rng)?;
        let mut optimizer =
            OptimizerState::new(options.optimizer.clone(), &mlp.weights, &mlp.biases);

        log::info!(
            "training for {} epochs with {} ({} train examples behind the stream, {} held out)",
            options.epoch_count,
            options.optimizer.name(),
            train_stream.example_count(),
            test_set.len()
        );

        for epoch in 1..=options.epoch_count {
            let batch = train_stream.next_batch();
            for minibatch in batch.examples.chunks(options.batch_size) {
                step(&mut mlp, &mut optimizer, minibatch, &mut rng);
            }

            let train_rmse = rmse_shared(&mlp, &batch.examples);
            let test_rmse = rmse(&mlp, test_set);
            log::info!(
                "epoch {}/{}: train rmse {:.2}, test rmse {:.2}",
                epoch,
                options.epoch_count,
                train_rmse,
                test_rmse
            );
        }

        Ok(TrainedModel { mlp })
    }
}

/// One minibatch: accumulate per-example gradients, average, update.
fn step(mlp: &mut Mlp, optimizer: &mut OptimizerState, minibatch: &[Arc<Example>], rng: &mut StdRng) {
    let mut grad_w: Vec<Array2<f64>> = mlp.weights.iter().map(|w| Array2::zeros(w.dim())).collect();
    let mut grad_b: Vec<Array1<f64>> = mlp.biases.iter().map(|b| Array1::zeros(b.dim())).collect();

    for example in minibatch {
        let cache = mlp.forward_train(example.features.view(), rng);
        let (example_gw, example_gb) = mlp.backprop(&cache, example.label);
        for (g, eg) in grad_w.iter_mut().zip(&example_gw) {
            *g += eg;
        }
        for (g, eg) in grad_b.iter_mut().zip(&example_gb) {
            *g += eg;
        }
    }

    let scale = 1.0 / minibatch.len() as f64;
    for g in &mut grad_w {
        *g *= scale;
    }
    for g in &mut grad_b {
        *g *= scale;
    }

    optimizer.apply(&mut mlp.weights, &mut mlp.biases, &grad_w, &grad_b);
}

fn rmse_shared(mlp: &Mlp, examples: &[Arc<Example>]) -> f64 {
    if examples.is_empty() {
        return 0.0;
    }
    let sum: f64 = examples
        .iter()
        .map(|e| (mlp.predict(e.features.view()) - e.label).powi(2))
        .sum();
    (sum / examples.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::topology::{Activation, LayerSpec};
    use ndarray::arr1;

    fn linear_examples(n: usize) -> Vec<Example> {
        // y = 3x + 1 over a small grid, an easy target for a tiny net.
        (0..n)
            .map(|i| {
                let x = i as f64 / n as f64;
                Example {
                    features: arr1(&[x]),
                    label: 3.0 * x + 1.0,
                }
            })
            .collect()
    }

    fn tiny_topology() -> TopologySpec {
        TopologySpec {
            input_width: 1,
            hidden: vec![LayerSpec::new(8, Activation::Tanh)],
        }
    }

    #[test]
    fn test_training_reduces_test_error() {
        let examples = linear_examples(64);
        let test_set = linear_examples(16);

        let mut stream = EpochStream::new(examples, 64, Some(1)).unwrap();
        let options = TrainOptions {
            batch_size: 8,
            epoch_count: 200,
            optimizer: OptimizerConfig::Adam {
                learning_rate: 1e-2,
                beta1: 0.9,
                beta2: 0.999,
                epsilon: 1e-8,
            },
        };

        let trainer = MlpTrainer::new().with_seed(5);
        let untrained_rmse = {
            let mut rng = StdRng::seed_from_u64(5);
            let mlp = Mlp::from_topology(&tiny_topology(), &mut rng).unwrap();
            rmse(&mlp, &test_set)
        };

        let model = trainer
            .train(&tiny_topology(), &mut stream, &test_set, &options)
            .unwrap();
        let trained_rmse = model.evaluate(&test_set);

        assert!(
            trained_rmse < untrained_rmse,
            "training must improve on the initial weights ({} vs {})",
            trained_rmse,
            untrained_rmse
        );
        assert!(trained_rmse < 1.0, "rmse after training: {}", trained_rmse);
    }

    #[test]
    fn test_predict_uses_the_fitted_parameters() {
        let examples = linear_examples(64);
        let mut stream = EpochStream::new(examples.clone(), 64, Some(2)).unwrap();
        let options = TrainOptions {
            batch_size: 16,
            epoch_count: 300,
            optimizer: OptimizerConfig::Adam {
                learning_rate: 1e-2,
                beta1: 0.9,
                beta2: 0.999,
                epsilon: 1e-8,
            },
        };

        let model = MlpTrainer::new()
            .with_seed(9)
            .train(&tiny_topology(), &mut stream, &examples, &options)
            .unwrap();

        // y(0.5) = 2.5 for the generating function.
        let prediction = model.predict(&arr1(&[0.5]));
        assert!(
            (prediction - 2.5).abs() < 0.5,
            "prediction {} too far from 2.5",
            prediction
        );
    }

    #[test]
    fn test_rejects_invalid_optimizer() {
        let examples = linear_examples(8);
        let mut stream = EpochStream::new(examples, 8, Some(3)).unwrap();
        let options = TrainOptions {
            batch_size: 4,
            epoch_count: 1,
            optimizer: OptimizerConfig::Sgd { learning_rate: 0.0 },
        };

        let result = MlpTrainer::new().train(&tiny_topology(), &mut stream, &[], &options);
        assert!(result.is_err());
    }

    #[test]
    fn test_evaluate_on_empty_slice_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let model = TrainedModel {
            mlp: Mlp::from_topology(&tiny_topology(), &mut rng).unwrap(),
        };
        assert_eq!(model.evaluate(&[]), 0.0);
    }
}
