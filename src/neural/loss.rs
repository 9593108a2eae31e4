//! Softmax cross-entropy loss and classification accuracy.

use ndarray::Array2;

const EPSILON: f32 = 1e-9;

/// Computes mean softmax cross-entropy over a batch of logits.
///
/// Returns `(loss, grad_logits)` where the gradient is the usual
/// softmax-minus-one-hot term divided by the batch size, so downstream layers
/// need no further scaling.
pub fn cross_entropy_loss(logits: &Array2<f32>, labels: &[usize]) -> (f32, Array2<f32>) {
    let batch_size = logits.nrows();
    assert_eq!(
        batch_size,
        labels.len(),
        "label count differs from batch size"
    );

    let mut grad = softmax(logits);
    let mut total_loss = 0.0f32;
    let scale = 1.0 / batch_size as f32;

    for (mut row, &label) in grad.rows_mut().into_iter().zip(labels.iter()) {
        total_loss -= row[label].max(EPSILON).ln();
        row[label] -= 1.0;
        row.mapv_inplace(|g| g * scale);
    }

    (total_loss * scale, grad)
}

/// Row-wise softmax with max subtraction for numeric stability.
pub fn softmax(logits: &Array2<f32>) -> Array2<f32> {
    let mut probs = logits.clone();
    for mut row in probs.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let mut sum = 0.0f32;
        for value in row.iter_mut() {
            *value = (*value - max).exp();
            sum += *value;
        }
        let inv = 1.0 / sum;
        for value in row.iter_mut() {
            *value *= inv;
        }
    }
    probs
}

/// Argmax class index per row of logits.
pub fn predictions(logits: &Array2<f32>) -> Vec<usize> {
    logits
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |(bi, bv), (i, &v)| {
                    if v > bv {
                        (i, v)
                    } else {
                        (bi, bv)
                    }
                })
                .0
        })
        .collect()
}

/// Fraction of positions where the two label sequences agree.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f32 {
    assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f32 / y_true.len() as f32
}
