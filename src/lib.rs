//! # MFCC Language Classifier Trainer
//!
//! Trains a fixed-topology feed-forward network that maps pre-extracted MFCC
//! feature vectors to a spoken-language label, tracks the best checkpoint by
//! validation accuracy, and reports a classification report plus a
//! confusion-matrix heatmap.
//!
//! ## Quick Start
//!
//! ```rust
//! use mfcc_langid::{MlpClassifier, Mode};
//! use ndarray::Array2;
//!
//! // Build the classifier for 20-dimensional features and 3 languages.
//! let mut model = MlpClassifier::new(20, 3, 0.3, 42);
//!
//! // Deterministic inference: dropout off.
//! model.set_mode(Mode::Eval);
//! let batch = Array2::<f32>::zeros((4, 20));
//! let logits = model.forward(&batch);
//! assert_eq!(logits.dim(), (4, 3));
//! ```
//!
//! ## Core Modules
//!
//! - [`config`] - Run configuration via TOML
//! - [`data`] - Feature loading, splitting, and standardization
//! - [`neural`] - Layers, loss, Adam, and the classifier
//! - [`train`] - Epoch loop and best-checkpoint selection
//! - [`eval`] - Loss/accuracy, confusion matrix, classification report
//! - [`logging`] - JSON line-delimited run logging

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod eval;
pub mod logging;
pub mod neural;
pub mod plot;
pub mod train;

pub use config::TrainConfig;
pub use data::loader::{load_dataset, FeatureDataset};
pub use data::scaler::StandardScaler;
pub use data::split::{split_indices, take_rows};
pub use eval::{classification_report, confusion_matrix, evaluate, format_report, EvalReport};
pub use logging::RunLogger;
pub use neural::model::{MlpClassifier, Mode};
pub use neural::optimizer::AdamOptimizer;
pub use plot::plot_confusion_matrix;
pub use train::{train, EpochRecord, TrainOutcome};
