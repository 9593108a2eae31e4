//! Feed-forward network building blocks: layers, loss, optimizer, and the
//! fixed-topology classifier.

pub mod layer;
pub mod loss;
pub mod model;
pub mod optimizer;

pub use layer::DenseLayer;
pub use loss::{accuracy, cross_entropy_loss, predictions};
pub use model::{MlpClassifier, Mode};
pub use optimizer::AdamOptimizer;
