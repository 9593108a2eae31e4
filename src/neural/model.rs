//! Fixed-topology MLP classifier for flattened MFCC vectors.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::neural::layer::DenseLayer;
use crate::neural::loss::{cross_entropy_loss, predictions};
use crate::neural::optimizer::AdamOptimizer;

/// Hidden layer widths; the topology is a constant of this design.
pub const HIDDEN_SIZES: [usize; 5] = [1024, 512, 256, 128, 64];

/// Whether dropout is active.
///
/// Callers set the mode explicitly before use: the trainer switches to
/// `Train` for each epoch, the evaluator to `Eval` before reading metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Train,
    Eval,
}

/// A feed-forward classifier producing per-class logits.
///
/// Architecture: `input_dim → 1024 → 512 → 256 → 128 → 64 → num_classes`,
/// with ReLU after every hidden layer and inverted dropout after every ReLU.
/// The output layer has neither.
pub struct MlpClassifier {
    layers: Vec<DenseLayer>,
    input_dim: usize,
    num_classes: usize,
    dropout: f32,
    mode: Mode,
    rng: StdRng,
    relu_cache: Vec<Array2<f32>>,
    dropout_masks: Vec<Array2<f32>>,
}

impl MlpClassifier {
    /// Builds the network with Xavier-initialized layers.
    ///
    /// `seed` drives both weight initialization and dropout masks, so two
    /// models built with the same arguments start identical.
    pub fn new(input_dim: usize, num_classes: usize, dropout: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut layers = Vec::with_capacity(HIDDEN_SIZES.len() + 1);
        let mut prev = input_dim;
        for &size in HIDDEN_SIZES.iter() {
            layers.push(DenseLayer::new(prev, size, &mut rng));
            prev = size;
        }
        layers.push(DenseLayer::new(prev, num_classes, &mut rng));

        Self {
            layers,
            input_dim,
            num_classes,
            dropout,
            mode: Mode::Train,
            rng,
            relu_cache: Vec::new(),
            dropout_masks: Vec::new(),
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    /// Forward pass over a batch, returning logits.
    ///
    /// In `Train` mode dropout masks are sampled and the post-activation
    /// values are cached for [`MlpClassifier::train_step`]; in `Eval` mode
    /// the pass is deterministic.
    pub fn forward(&mut self, input: &Array2<f32>) -> Array2<f32> {
        self.relu_cache.clear();
        self.dropout_masks.clear();

        let training = self.mode == Mode::Train;
        let keep = 1.0 - self.dropout;
        let last = self.layers.len() - 1;
        let mut activation = input.clone();

        for index in 0..self.layers.len() {
            activation = self.layers[index].forward(&activation);
            if index < last {
                activation.mapv_inplace(|v| v.max(0.0));
                if training {
                    self.relu_cache.push(activation.clone());
                    if self.dropout > 0.0 {
                        let rng = &mut self.rng;
                        let scale = 1.0 / keep;
                        let mask = Array2::from_shape_fn(activation.raw_dim(), |_| {
                            if rng.gen::<f32>() < keep {
                                scale
                            } else {
                                0.0
                            }
                        });
                        activation *= &mask;
                        self.dropout_masks.push(mask);
                    }
                }
            }
        }

        activation
    }

    /// One forward/backward/update cycle over a batch.
    ///
    /// Returns the mean batch loss and the argmax predictions so the caller
    /// can accumulate a training-accuracy summary without a second pass.
    pub fn train_step(
        &mut self,
        input: &Array2<f32>,
        labels: &[usize],
        optimizer: &mut AdamOptimizer,
    ) -> (f32, Vec<usize>) {
        assert_eq!(self.mode, Mode::Train, "train_step requires Mode::Train");

        let logits = self.forward(input);
        let (loss, grad_logits) = cross_entropy_loss(&logits, labels);
        let preds = predictions(&logits);

        // Backward pass - collect gradients first
        let mut layer_gradients = Vec::with_capacity(self.layers.len());
        let mut grad = grad_logits;

        for (index, layer) in self.layers.iter().enumerate().rev() {
            let (grad_input, grad_weights, grad_bias) = layer.backward(&grad);
            layer_gradients.push((grad_weights, grad_bias));
            grad = grad_input;

            if index > 0 {
                let hidden = index - 1;
                if let Some(mask) = self.dropout_masks.get(hidden) {
                    grad *= mask;
                }
                let relu_out = &self.relu_cache[hidden];
                ndarray::Zip::from(&mut grad).and(relu_out).for_each(|g, &a| {
                    if a <= 0.0 {
                        *g = 0.0;
                    }
                });
            }
        }

        // Now update parameters
        layer_gradients.reverse();
        for (layer_idx, (grad_weights, grad_bias)) in layer_gradients.into_iter().enumerate() {
            optimizer.step(
                &format!("layer{}_weights", layer_idx),
                &mut self.layers[layer_idx].weights,
                &grad_weights,
            );
            optimizer.step(
                &format!("layer{}_bias", layer_idx),
                &mut self.layers[layer_idx].bias,
                &grad_bias,
            );
        }

        (loss, preds)
    }
}
