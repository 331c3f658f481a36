//! Optimizer configuration and update rules.
//!
//! The optimizer is an opaque parameter from the pipeline's point of
//! view: the trainer receives a configuration value and applies whichever
//! update rule it names. Two rules are provided, plain SGD and Adam.

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Optimizer choice with its hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptimizerConfig {
    /// Stochastic gradient descent.
    Sgd {
        /// Step size.
        learning_rate: f64,
    },

    /// Adam with bias-corrected first and second moments.
    Adam {
        /// Step size.
        learning_rate: f64,
        /// First-moment decay.
        beta1: f64,
        /// Second-moment decay.
        beta2: f64,
        /// Denominator fuzz.
        epsilon: f64,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Adam {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl OptimizerConfig {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerConfig::Sgd { .. } => "sgd",
            OptimizerConfig::Adam { .. } => "adam",
        }
    }

    /// Validate the hyperparameters.
    pub fn validate(&self) -> Result<()> {
        match self {
            OptimizerConfig::Sgd { learning_rate } => {
                if *learning_rate <= 0.0 {
                    return Err(PipelineError::Config(
                        "sgd learning_rate must be > 0".to_string(),
                    ));
                }
            }
            OptimizerConfig::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                if *learning_rate <= 0.0 {
                    return Err(PipelineError::Config(
                        "adam learning_rate must be > 0".to_string(),
                    ));
                }
                if !(0.0..1.0).contains(beta1) || !(0.0..1.0).contains(beta2) {
                    return Err(PipelineError::Config(
                        "adam betas must be in [0, 1)".to_string(),
                    ));
                }
                if *epsilon <= 0.0 {
                    return Err(PipelineError::Config(
                        "adam epsilon must be > 0".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Per-parameter optimizer state, one entry per layer.
pub(crate) struct OptimizerState {
    config: OptimizerConfig,
    m_w: Vec<Array2<f64>>,
    v_w: Vec<Array2<f64>>,
    m_b: Vec<Array1<f64>>,
    v_b: Vec<Array1<f64>>,
    step: u64,
}

impl OptimizerState {
    /// Allocate moment buffers shaped like the model parameters.
    pub fn new(config: OptimizerConfig, weights: &[Array2<f64>], biases: &[Array1<f64>]) -> Self {
        Self {
            config,
            m_w: weights.iter().map(|w| Array2::zeros(w.dim())).collect(),
            v_w: weights.iter().map(|w| Array2::zeros(w.dim())).collect(),
            m_b: biases.iter().map(|b| Array1::zeros(b.dim())).collect(),
            v_b: biases.iter().map(|b| Array1::zeros(b.dim())).collect(),
            step: 0,
        }
    }

    /// Apply one update from averaged minibatch gradients.
    pub fn apply(
        &mut self,
        weights: &mut [Array2<f64>],
        biases: &mut [Array1<f64>],
        grad_w: &[Array2<f64>],
        grad_b: &[Array1<f64>],
    ) {
        match self.config {
            OptimizerConfig::Sgd { learning_rate } => {
                for (w, gw) in weights.iter_mut().zip(grad_w) {
                    w.scaled_add(-learning_rate, gw);
                }
                for (b, gb) in biases.iter_mut().zip(grad_b) {
                    b.scaled_add(-learning_rate, gb);
                }
            }
            OptimizerConfig::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                self.step += 1;
                let t = self.step as i32;
                let correction1 = 1.0 - beta1.powi(t);
                let correction2 = 1.0 - beta2.powi(t);

                for layer in 0..weights.len() {
                    let gw = &grad_w[layer];
                    let m = &mut self.m_w[layer];
                    let v = &mut self.v_w[layer];
                    m.zip_mut_with(gw, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
                    v.zip_mut_with(gw, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
                    ndarray::Zip::from(&mut weights[layer])
                        .and(&*m)
                        .and(&*v)
                        .for_each(|w, &m, &v| {
                            let m_hat = m / correction1;
                            let v_hat = v / correction2;
                            *w -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
                        });

                    let gb = &grad_b[layer];
                    let m = &mut self.m_b[layer];
                    let v = &mut self.v_b[layer];
                    m.zip_mut_with(gb, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
                    v.zip_mut_with(gb, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
                    ndarray::Zip::from(&mut biases[layer])
                        .and(&*m)
                        .and(&*v)
                        .for_each(|b, &m, &v| {
                            let m_hat = m / correction1;
                            let v_hat = v / correction2;
                            *b -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
                        });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_default_is_adam() {
        assert_eq!(OptimizerConfig::default().name(), "adam");
        assert!(OptimizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_rates() {
        assert!(OptimizerConfig::Sgd { learning_rate: 0.0 }.validate().is_err());
        assert!(OptimizerConfig::Adam {
            learning_rate: 1e-3,
            beta1: 1.0,
            beta2: 0.999,
            epsilon: 1e-8,
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_sgd_step_moves_against_gradient() {
        let mut weights = vec![Array2::from_elem((1, 1), 1.0)];
        let mut biases = vec![arr1(&[0.5])];
        let grad_w = vec![Array2::from_elem((1, 1), 2.0)];
        let grad_b = vec![arr1(&[1.0])];

        let mut state = OptimizerState::new(
            OptimizerConfig::Sgd { learning_rate: 0.1 },
            &weights,
            &biases,
        );
        state.apply(&mut weights, &mut biases, &grad_w, &grad_b);

        assert!((weights[0][[0, 0]] - 0.8).abs() < 1e-12);
        assert!((biases[0][0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_adam_first_step_is_learning_rate_sized() {
        let mut weights = vec![Array2::from_elem((1, 1), 1.0)];
        let mut biases = vec![arr1(&[0.0])];
        let grad_w = vec![Array2::from_elem((1, 1), 0.5)];
        let grad_b = vec![arr1(&[0.0])];

        let mut state = OptimizerState::new(OptimizerConfig::default(), &weights, &biases);
        state.apply(&mut weights, &mut biases, &grad_w, &grad_b);

        // After bias correction the first Adam step is close to the
        // learning rate in the gradient direction.
        let moved = 1.0 - weights[0][[0, 0]];
        assert!(moved > 0.0 && (moved - 1e-3).abs() < 1e-4);
    }
}
