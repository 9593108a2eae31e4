//! Deterministic train/validation splitting.

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of a train/validation partition.
///
/// The two sides are disjoint and together cover `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub val: Vec<usize>,
}

/// Partitions `0..n` into train and validation indices.
///
/// The split is seeded, so the same `(n, val_fraction, seed)` triple always
/// yields the same membership. Sizes are `ceil((1 - val_fraction) * n)` for
/// train and the remainder for validation.
pub fn split_indices(n: usize, val_fraction: f32, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_train = ((1.0 - f64::from(val_fraction)) * n as f64).ceil() as usize;
    let val = indices.split_off(n_train);
    SplitIndices {
        train: indices,
        val,
    }
}

/// Gathers the rows and labels selected by `indices` into owned arrays.
pub fn take_rows(
    features: &Array2<f32>,
    labels: &[usize],
    indices: &[usize],
) -> (Array2<f32>, Vec<usize>) {
    let selected = features.select(Axis(0), indices);
    let selected_labels = indices.iter().map(|&i| labels[i]).collect();
    (selected, selected_labels)
}
