//! Feed-forward network on ndarray buffers.
//!
//! Parameters live in one `Array2` weight matrix and one `Array1` bias
//! vector per linear map. The training pass caches pre-activations,
//! activations, and dropout masks so backpropagation can run over the
//! same stack; inference skips dropout entirely (inverted dropout keeps
//! the two passes on the same scale).

use crate::error::Result;
use crate::network::topology::{Activation, TopologySpec};
use ndarray::{Array1, Array2, ArrayView1};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::Rng;

/// Multi-layer perceptron with a single linear output unit.
pub struct Mlp {
    pub(crate) weights: Vec<Array2<f64>>,
    pub(crate) biases: Vec<Array1<f64>>,
    activations: Vec<Activation>,
    dropout: Vec<Option<f64>>,
}

/// Intermediate values from one training-mode forward pass.
pub(crate) struct ForwardCache {
    input: Array1<f64>,
    /// Pre-activation of every linear map, output included.
    weighted_sums: Vec<Array1<f64>>,
    /// Post-activation (and post-dropout) output of every hidden layer.
    hidden_outputs: Vec<Array1<f64>>,
    /// Inverted-dropout masks, entries 0 or 1/keep.
    masks: Vec<Option<Array1<f64>>>,
    /// The scalar network output.
    pub prediction: f64,
}

impl Mlp {
    /// Initialize parameters for a declared topology.
    ///
    /// Weights draw from a normal with He scaling on the fan-in, biases
    /// start at zero.
    pub fn from_topology(spec: &TopologySpec, rng: &mut StdRng) -> Result<Self> {
        spec.validate()?;

        let widths = spec.widths();
        let mut weights = Vec::with_capacity(widths.len() - 1);
        let mut biases = Vec::with_capacity(widths.len() - 1);
        for pair in widths.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let std = (2.0 / fan_in as f64).sqrt();
            let dist = Normal::new(0.0, std).expect("finite positive std");
            weights.push(Array2::random_using((fan_out, fan_in), dist, rng));
            biases.push(Array1::zeros(fan_out));
        }

        Ok(Self {
            weights,
            biases,
            activations: spec.hidden.iter().map(|l| l.activation).collect(),
            dropout: spec.hidden.iter().map(|l| l.dropout).collect(),
        })
    }

    /// Number of linear maps (hidden layers plus the output).
    pub fn layer_count(&self) -> usize {
        self.weights.len()
    }

    /// Inference pass, dropout disabled.
    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        let mut activation = x.to_owned();
        for layer in 0..self.layer_count() - 1 {
            let z = self.weights[layer].dot(&activation) + &self.biases[layer];
            activation = z.mapv(|v| self.activations[layer].apply(v));
        }
        let last = self.layer_count() - 1;
        let out = self.weights[last].dot(&activation) + &self.biases[last];
        out[0]
    }

    /// Training pass with dropout, caching everything backprop needs.
    pub(crate) fn forward_train(&self, x: ArrayView1<f64>, rng: &mut StdRng) -> ForwardCache {
        let mut weighted_sums = Vec::with_capacity(self.layer_count());
        let mut hidden_outputs = Vec::with_capacity(self.layer_count() - 1);
        let mut masks = Vec::with_capacity(self.layer_count() - 1);

        let input = x.to_owned();
        let mut activation = input.clone();
        for layer in 0..self.layer_count() - 1 {
            let z = self.weights[layer].dot(&activation) + &self.biases[layer];
            let mut out = z.mapv(|v| self.activations[layer].apply(v));
            let mask = self.dropout[layer].map(|rate| {
                let keep = 1.0 - rate;
                let mask =
                    Array1::from_shape_fn(out.len(), |_| {
                        if rng.gen::<f64>() < keep {
                            1.0 / keep
                        } else {
                            0.0
                        }
                    });
                out *= &mask;
                mask
            });
            weighted_sums.push(z);
            hidden_outputs.push(out.clone());
            masks.push(mask);
            activation = out;
        }

        let last = self.layer_count() - 1;
        let out = self.weights[last].dot(&activation) + &self.biases[last];
        let prediction = out[0];
        weighted_sums.push(out);

        ForwardCache {
            input,
            weighted_sums,
            hidden_outputs,
            masks,
            prediction,
        }
    }

    /// Gradients of the squared error for one example.
    pub(crate) fn backprop(
        &self,
        cache: &ForwardCache,
        target: f64,
    ) -> (Vec<Array2<f64>>, Vec<Array1<f64>>) {
        let layers = self.layer_count();
        let mut grad_w: Vec<Array2<f64>> = self
            .weights
            .iter()
            .map(|w| Array2::zeros(w.dim()))
            .collect();
        let mut grad_b: Vec<Array1<f64>> = self
            .biases
            .iter()
            .map(|b| Array1::zeros(b.dim()))
            .collect();

        // Linear output, squared error: the output delta is 2 * residual.
        let mut delta = Array1::from_elem(1, 2.0 * (cache.prediction - target));
        let below = if layers == 1 {
            &cache.input
        } else {
            &cache.hidden_outputs[layers - 2]
        };
        grad_w[layers - 1] = outer_product(delta.view(), below.view());
        grad_b[layers - 1] = delta.clone();

        for layer in (0..layers - 1).rev() {
            let z = &cache.weighted_sums[layer];
            let mut propagated = self.weights[layer + 1].t().dot(&delta);
            if let Some(mask) = &cache.masks[layer] {
                propagated *= mask;
            }
            delta = propagated * z.mapv(|v| self.activations[layer].derivative(v));

            let below = if layer == 0 {
                &cache.input
            } else {
                &cache.hidden_outputs[layer - 1]
            };
            grad_w[layer] = outer_product(delta.view(), below.view());
            grad_b[layer] = delta.clone();
        }

        (grad_w, grad_b)
    }
}

/// Column vector times row vector.
fn outer_product(v: ArrayView1<f64>, w: ArrayView1<f64>) -> Array2<f64> {
    let mut out = Array2::zeros((v.len(), w.len()));
    for (i, &vi) in v.iter().enumerate() {
        for (j, &wj) in w.iter().enumerate() {
            out[[i, j]] = vi * wj;
        }
    }
    out
}
