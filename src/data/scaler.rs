//! Per-feature standardization fit on the training split only.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;

/// Zero-mean, unit-variance transform with per-column statistics.
///
/// Fitting happens once, on training data; the same statistics are then
/// applied verbatim to any split, so validation data never influences the
/// transform. Columns with zero variance keep a scale of 1 so constant
/// features pass through centered instead of producing NaNs.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f32>,
    std: Array1<f32>,
}

impl StandardScaler {
    /// Computes column means and population standard deviations.
    pub fn fit(data: &ArrayView2<f32>) -> Self {
        let mean = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(data.ncols()));
        let std = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });
        Self { mean, std }
    }

    /// Applies the fitted transform, leaving the statistics untouched.
    pub fn transform(&self, data: &ArrayView2<f32>) -> Array2<f32> {
        let ncols = data.ncols();
        assert_eq!(
            ncols,
            self.mean.len(),
            "column count differs from the fitted statistics"
        );

        let mut out = data.to_owned();
        let mean = self
            .mean
            .as_slice()
            .expect("ndarray uses contiguous layout");
        let std = self.std.as_slice().expect("ndarray uses contiguous layout");
        out.as_slice_mut()
            .expect("ndarray uses contiguous layout")
            .par_chunks_mut(ncols)
            .for_each(|row| {
                for (j, value) in row.iter_mut().enumerate() {
                    *value = (*value - mean[j]) / std[j];
                }
            });
        out
    }

    pub fn mean(&self) -> &Array1<f32> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f32> {
        &self.std
    }
}
