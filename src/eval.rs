//! Evaluation: batched loss/accuracy, confusion matrix, and the per-class
//! classification report.

use ndarray::{Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::neural::loss::{accuracy, cross_entropy_loss, predictions};
use crate::neural::model::{MlpClassifier, Mode};

/// Outcome of one evaluation pass.
///
/// `y_true` / `y_pred` are concatenated in batch-loader order, which is a
/// shuffled order, not the dataset order.
#[derive(Debug, Clone)]
pub struct EvalReport {
    /// Mean loss over batches
    pub loss: f32,
    /// Overall accuracy as a fraction
    pub accuracy: f32,
    pub y_true: Vec<usize>,
    pub y_pred: Vec<usize>,
}

/// Runs the model over shuffled batches with dropout disabled.
///
/// The model is left in `Eval` mode afterwards; parameters are only read,
/// never updated.
pub fn evaluate(
    model: &mut MlpClassifier,
    features: &ArrayView2<f32>,
    labels: &[usize],
    batch_size: usize,
    rng: &mut StdRng,
) -> EvalReport {
    model.set_mode(Mode::Eval);

    let mut indices: Vec<usize> = (0..labels.len()).collect();
    indices.shuffle(rng);

    let mut total_loss = 0.0f32;
    let mut num_batches = 0usize;
    let mut y_true = Vec::with_capacity(labels.len());
    let mut y_pred = Vec::with_capacity(labels.len());

    for chunk in indices.chunks(batch_size) {
        let batch = features.select(Axis(0), chunk);
        let batch_labels: Vec<usize> = chunk.iter().map(|&i| labels[i]).collect();

        let logits = model.forward(&batch);
        let (loss, _) = cross_entropy_loss(&logits, &batch_labels);
        total_loss += loss;
        num_batches += 1;

        y_pred.extend(predictions(&logits));
        y_true.extend(batch_labels);
    }

    let loss = if num_batches > 0 {
        total_loss / num_batches as f32
    } else {
        0.0
    };
    let accuracy = accuracy(&y_true, &y_pred);

    EvalReport {
        loss,
        accuracy,
        y_true,
        y_pred,
    }
}

/// Builds an `num_classes × num_classes` count matrix.
///
/// Rows are actual classes, columns predicted classes, so row sums equal the
/// true per-class sample counts.
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], num_classes: usize) -> Array2<usize> {
    assert_eq!(y_true.len(), y_pred.len());
    let mut matrix = Array2::zeros((num_classes, num_classes));
    for (&actual, &predicted) in y_true.iter().zip(y_pred.iter()) {
        matrix[[actual, predicted]] += 1;
    }
    matrix
}

/// Precision, recall, F1, and support for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub support: usize,
}

/// Derives per-class metrics from a confusion matrix.
///
/// Classes with no predictions get precision 0; classes with no true samples
/// get recall 0. F1 is 0 whenever precision + recall is 0.
pub fn classification_report(confusion: &Array2<usize>) -> Vec<ClassMetrics> {
    let num_classes = confusion.nrows();
    let mut metrics = Vec::with_capacity(num_classes);

    for class in 0..num_classes {
        let true_positive = confusion[[class, class]] as f32;
        let predicted: usize = confusion.column(class).sum();
        let support: usize = confusion.row(class).sum();

        let precision = if predicted > 0 {
            true_positive / predicted as f32
        } else {
            0.0
        };
        let recall = if support > 0 {
            true_positive / support as f32
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        metrics.push(ClassMetrics {
            precision,
            recall,
            f1,
            support,
        });
    }

    metrics
}

/// Formats the report as an aligned table with macro and weighted averages.
pub fn format_report(confusion: &Array2<usize>, class_names: &[String]) -> String {
    let metrics = classification_report(confusion);
    let total: usize = metrics.iter().map(|m| m.support).sum();
    let correct: usize = (0..confusion.nrows()).map(|i| confusion[[i, i]]).sum();

    let name_width = class_names
        .iter()
        .map(|n| n.len())
        .max()
        .unwrap_or(0)
        .max("weighted avg".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:>width$}  {:>9}  {:>9}  {:>9}  {:>9}\n",
        "",
        "precision",
        "recall",
        "f1-score",
        "support",
        width = name_width
    ));

    for (name, m) in class_names.iter().zip(metrics.iter()) {
        out.push_str(&format!(
            "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
            name,
            m.precision,
            m.recall,
            m.f1,
            m.support,
            width = name_width
        ));
    }

    let n = metrics.len().max(1) as f32;
    let macro_p: f32 = metrics.iter().map(|m| m.precision).sum::<f32>() / n;
    let macro_r: f32 = metrics.iter().map(|m| m.recall).sum::<f32>() / n;
    let macro_f: f32 = metrics.iter().map(|m| m.f1).sum::<f32>() / n;

    let weight = |f: fn(&ClassMetrics) -> f32| -> f32 {
        if total == 0 {
            return 0.0;
        }
        metrics
            .iter()
            .map(|m| f(m) * m.support as f32)
            .sum::<f32>()
            / total as f32
    };

    let overall = if total > 0 {
        correct as f32 / total as f32
    } else {
        0.0
    };

    out.push_str(&format!(
        "\n{:>width$}  {:>9}  {:>9}  {:>9.2}  {:>9}\n",
        "accuracy",
        "",
        "",
        overall,
        total,
        width = name_width
    ));
    out.push_str(&format!(
        "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
        "macro avg",
        macro_p,
        macro_r,
        macro_f,
        total,
        width = name_width
    ));
    out.push_str(&format!(
        "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
        "weighted avg",
        weight(|m| m.precision),
        weight(|m| m.recall),
        weight(|m| m.f1),
        total,
        width = name_width
    ));

    out
}
