//! Network topology declaration.
//!
//! A [`TopologySpec`] is data, not behavior: a stack of fully-connected
//! layers with activations and interleaved dropout, ending in a single
//! linear output unit for the price regression. The trainer turns it into
//! parameter buffers; the binary prints it before training starts.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Activation applied after a fully-connected layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// max(0, x)
    Relu,
    /// 1 / (1 + e^-x)
    Sigmoid,
    /// tanh(x)
    Tanh,
}

impl Activation {
    /// Apply the activation to a pre-activation value.
    #[inline]
    pub fn apply(&self, z: f64) -> f64 {
        match self {
            Activation::Relu => z.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-z).exp()),
            Activation::Tanh => z.tanh(),
        }
    }

    /// Derivative with respect to the pre-activation value.
    #[inline]
    pub fn derivative(&self, z: f64) -> f64 {
        match self {
            Activation::Relu => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Sigmoid => {
                let s = self.apply(z);
                s * (1.0 - s)
            }
            Activation::Tanh => 1.0 - z.tanh().powi(2),
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Relu => "relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
        }
    }
}

/// One hidden layer: width, activation, optional dropout after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Number of units.
    pub units: usize,

    /// Activation after the linear map.
    pub activation: Activation,

    /// Dropout rate applied to this layer's output during training,
    /// `None` for no dropout.
    pub dropout: Option<f64>,
}

impl LayerSpec {
    /// A layer with no dropout.
    pub fn new(units: usize, activation: Activation) -> Self {
        Self {
            units,
            activation,
            dropout: None,
        }
    }

    /// Attach a dropout rate.
    pub fn with_dropout(mut self, rate: f64) -> Self {
        self.dropout = Some(rate);
        self
    }
}

/// Declared feed-forward topology with a single linear scalar output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySpec {
    /// Input width, which must equal the dataset's feature count.
    pub input_width: usize,

    /// Hidden layers in order.
    pub hidden: Vec<LayerSpec>,
}

impl TopologySpec {
    /// The fixed regression stack used by the `train` binary.
    ///
    /// Two relu layers with interleaved dropout, then the linear output.
    pub fn regression(input_width: usize) -> Self {
        Self {
            input_width,
            hidden: vec![
                LayerSpec::new(256, Activation::Relu).with_dropout(0.5),
                LayerSpec::new(128, Activation::Relu).with_dropout(0.25),
            ],
        }
    }

    /// Layer widths including input and the scalar output.
    pub fn widths(&self) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.hidden.len() + 2);
        widths.push(self.input_width);
        widths.extend(self.hidden.iter().map(|l| l.units));
        widths.push(1);
        widths
    }

    /// Total number of trainable parameters.
    pub fn parameter_count(&self) -> usize {
        self.widths()
            .windows(2)
            .map(|w| w[0] * w[1] + w[1])
            .sum()
    }

    /// Validate the declared shape.
    pub fn validate(&self) -> Result<()> {
        if self.input_width == 0 {
            return Err(PipelineError::Config(
                "topology input_width must be > 0".to_string(),
            ));
        }
        for (i, layer) in self.hidden.iter().enumerate() {
            if layer.units == 0 {
                return Err(PipelineError::Config(format!(
                    "hidden layer {} must have > 0 units",
                    i
                )));
            }
            if let Some(rate) = layer.dropout {
                if !(0.0..1.0).contains(&rate) {
                    return Err(PipelineError::Config(format!(
                        "hidden layer {} dropout must be in [0, 1)",
                        i
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for TopologySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "network topology ({} parameters)", self.parameter_count())?;
        writeln!(f, "  input   : {} features", self.input_width)?;
        for (i, layer) in self.hidden.iter().enumerate() {
            write!(f, "  hidden {}: dense {} + {}", i, layer.units, layer.activation.name())?;
            match layer.dropout {
                Some(rate) => writeln!(f, ", dropout {}", rate)?,
                None => writeln!(f)?,
            }
        }
        write!(f, "  output  : dense 1 (linear)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_include_input_and_output() {
        let spec = TopologySpec::regression(30);
        assert_eq!(spec.widths(), vec![30, 256, 128, 1]);
    }

    #[test]
    fn test_parameter_count() {
        let spec = TopologySpec {
            input_width: 2,
            hidden: vec![LayerSpec::new(3, Activation::Relu)],
        };
        // 2*3 + 3 weights+biases into hidden, 3*1 + 1 into output.
        assert_eq!(spec.parameter_count(), 6 + 3 + 3 + 1);
    }

    #[test]
    fn test_validation() {
        assert!(TopologySpec::regression(10).validate().is_ok());
        assert!(TopologySpec::regression(0).validate().is_err());

        let bad_dropout = TopologySpec {
            input_width: 4,
            hidden: vec![LayerSpec::new(8, Activation::Relu).with_dropout(1.0)],
        };
        assert!(bad_dropout.validate().is_err());
    }

    #[test]
    fn test_activation_derivatives() {
        assert_eq!(Activation::Relu.derivative(2.0), 1.0);
        assert_eq!(Activation::Relu.derivative(-2.0), 0.0);

        let s = Activation::Sigmoid.apply(0.3);
        assert!((Activation::Sigmoid.derivative(0.3) - s * (1.0 - s)).abs() < 1e-12);

        assert!((Activation::Tanh.derivative(0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_mentions_every_layer() {
        let text = TopologySpec::regression(12).to_string();
        assert!(text.contains("input   : 12 features"));
        assert!(text.contains("dense 256 + relu, dropout 0.5"));
        assert!(text.contains("dense 128 + relu, dropout 0.25"));
        assert!(text.contains("output  : dense 1 (linear)"));
    }
}
