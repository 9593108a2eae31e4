//! Dataset loading, splitting, and normalization.

pub mod loader;
pub mod scaler;
pub mod split;

pub use loader::{load_dataset, DataError, FeatureDataset};
pub use scaler::StandardScaler;
pub use split::{split_indices, take_rows, SplitIndices};
