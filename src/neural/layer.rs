//! Fully-connected layer with cached forward input for backpropagation.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;

/// A dense layer computing `input · weights + bias`.
///
/// Weights use Xavier-uniform initialization. The forward pass caches its
/// input so [`DenseLayer::backward`] can produce parameter gradients without
/// the caller re-threading activations.
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
    input: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Creates a layer with `input_size` inputs and `output_size` outputs.
    pub fn new(input_size: usize, output_size: usize, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (input_size + output_size) as f32).sqrt();
        let weights =
            Array2::from_shape_fn((input_size, output_size), |_| rng.gen_range(-limit..limit));
        Self {
            weights,
            bias: Array1::zeros(output_size),
            input: None,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Forward pass over a batch of rows; caches the input.
    pub fn forward(&mut self, input: &Array2<f32>) -> Array2<f32> {
        let output = input.dot(&self.weights) + &self.bias;
        self.input = Some(input.clone());
        output
    }

    /// Backward pass using the cached input.
    ///
    /// Returns `(grad_input, grad_weights, grad_bias)`. The incoming gradient
    /// is expected to already carry any batch-size scaling from the loss.
    pub fn backward(&self, grad_output: &Array2<f32>) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let input = self
            .input
            .as_ref()
            .expect("forward must run before backward");
        let grad_input = grad_output.dot(&self.weights.t());
        let grad_weights = input.t().dot(grad_output);
        let grad_bias = grad_output.sum_axis(Axis(0));
        (grad_input, grad_weights, grad_bias)
    }
}
