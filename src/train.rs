//! The epoch loop: shuffled mini-batches, per-epoch validation, and
//! best-checkpoint selection.

use ndarray::{ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::checkpoint::{self, CheckpointError};
use crate::config::TrainConfig;
use crate::eval::evaluate;
use crate::logging::RunLogger;
use crate::neural::loss::accuracy;
use crate::neural::model::{MlpClassifier, Mode};
use crate::neural::optimizer::AdamOptimizer;

// Separate deterministic RNG streams derived from the run seed. The
// evaluation stream is re-created per pass so reloading the checkpoint and
// re-evaluating sees the same batch order.
const SHUFFLE_SEED_OFFSET: u64 = 1;
const EVAL_SEED_OFFSET: u64 = 2;

/// Metrics for one completed epoch, also serialized to the run log.
#[derive(Debug, Clone, Serialize)]
pub struct EpochRecord {
    /// 1-based epoch number
    pub epoch: usize,
    pub train_loss: f32,
    pub train_accuracy: f32,
    pub val_loss: f32,
    pub val_accuracy: f32,
    /// Whether this epoch's parameters became the persisted checkpoint
    pub new_best: bool,
}

/// Summary of a full training run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub best_val_accuracy: f32,
    /// 1-based epoch of the persisted checkpoint, if any epoch ran
    pub best_epoch: Option<usize>,
    pub epochs: Vec<EpochRecord>,
}

/// Returns a fresh evaluation RNG for the given run seed.
///
/// The final report path uses this too, so its batches match the ones that
/// produced the recorded best accuracy.
pub fn eval_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(EVAL_SEED_OFFSET))
}

/// Trains `model` for the configured number of epochs.
///
/// Each epoch shuffles the training split into batches, runs one
/// forward/backward/update per batch, then evaluates the validation split
/// with dropout disabled. Whenever validation accuracy strictly exceeds the
/// best seen so far, the parameters are persisted to
/// `config.checkpoint_path`, overwriting the previous best. The first epoch
/// always persists, so a finished run is guaranteed a checkpoint.
pub fn train(
    model: &mut MlpClassifier,
    optimizer: &mut AdamOptimizer,
    train_features: &ArrayView2<f32>,
    train_labels: &[usize],
    val_features: &ArrayView2<f32>,
    val_labels: &[usize],
    config: &TrainConfig,
    mut logger: Option<&mut RunLogger>,
) -> Result<TrainOutcome, TrainError> {
    let mut shuffle_rng = StdRng::seed_from_u64(config.seed.wrapping_add(SHUFFLE_SEED_OFFSET));
    let mut indices: Vec<usize> = (0..train_labels.len()).collect();

    let mut best_val_accuracy = f32::NEG_INFINITY;
    let mut best_epoch = None;
    let mut epochs = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        model.set_mode(Mode::Train);
        indices.shuffle(&mut shuffle_rng);

        let mut running_loss = 0.0f32;
        let mut num_batches = 0usize;
        let mut train_true = Vec::with_capacity(train_labels.len());
        let mut train_pred = Vec::with_capacity(train_labels.len());

        for chunk in indices.chunks(config.batch_size) {
            let batch = train_features.select(Axis(0), chunk);
            let batch_labels: Vec<usize> = chunk.iter().map(|&i| train_labels[i]).collect();

            let (loss, preds) = model.train_step(&batch, &batch_labels, optimizer);
            running_loss += loss;
            num_batches += 1;

            train_pred.extend(preds);
            train_true.extend(batch_labels);
        }

        let train_loss = running_loss / num_batches.max(1) as f32;
        let train_accuracy = accuracy(&train_true, &train_pred);

        let mut val_batch_rng = eval_rng(config.seed);
        let val_report = evaluate(
            model,
            val_features,
            val_labels,
            config.batch_size,
            &mut val_batch_rng,
        );

        let new_best = val_report.accuracy > best_val_accuracy;
        if new_best {
            best_val_accuracy = val_report.accuracy;
            best_epoch = Some(epoch);
            checkpoint::save(model, &config.checkpoint_path)?;
        }

        println!(
            "Epoch {}: Train Loss: {:.4}, Train Acc: {:.2}%, Val Loss: {:.4}, Val Acc: {:.2}%",
            epoch,
            train_loss,
            train_accuracy * 100.0,
            val_report.loss,
            val_report.accuracy * 100.0
        );

        let record = EpochRecord {
            epoch,
            train_loss,
            train_accuracy,
            val_loss: val_report.loss,
            val_accuracy: val_report.accuracy,
            new_best,
        };
        if let Some(logger) = logger.as_deref_mut() {
            logger.log(&record)?;
        }
        epochs.push(record);
    }

    Ok(TrainOutcome {
        best_val_accuracy,
        best_epoch,
        epochs,
    })
}

#[derive(Debug)]
pub enum TrainError {
    Checkpoint(CheckpointError),
    Log(std::io::Error),
}

impl std::fmt::Display for TrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainError::Checkpoint(err) => write!(f, "checkpoint error: {}", err),
            TrainError::Log(err) => write!(f, "run log error: {}", err),
        }
    }
}

impl std::error::Error for TrainError {}

impl From<CheckpointError> for TrainError {
    fn from(value: CheckpointError) -> Self {
        TrainError::Checkpoint(value)
    }
}

impl From<std::io::Error> for TrainError {
    fn from(value: std::io::Error) -> Self {
        TrainError::Log(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::path::PathBuf;

    fn scratch_checkpoint(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "mfcc_langid_train_{}_{}.npz",
            tag,
            std::process::id()
        ))
    }

    /// Two linearly separable blobs, 10-dimensional.
    fn toy_data(n_per_class: usize) -> (Array2<f32>, Vec<usize>) {
        let n = n_per_class * 2;
        let mut features = Array2::<f32>::zeros((n, 10));
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let class = i % 2;
            let offset = if class == 0 { -1.0 } else { 1.0 };
            for j in 0..10 {
                features[[i, j]] = offset + 0.01 * (i as f32 + j as f32) / n as f32;
            }
            labels.push(class);
        }
        (features, labels)
    }

    #[test]
    fn first_epoch_always_checkpoints() {
        let checkpoint_path = scratch_checkpoint("first_epoch");
        let config = TrainConfig {
            checkpoint_path: checkpoint_path.clone(),
            epochs: 1,
            batch_size: 8,
            ..TrainConfig::default()
        };

        let (features, labels) = toy_data(16);
        let mut model = MlpClassifier::new(10, 2, 0.3, config.seed);
        let mut optimizer = AdamOptimizer::new(config.learning_rate);

        let outcome = train(
            &mut model,
            &mut optimizer,
            &features.view(),
            &labels,
            &features.view(),
            &labels,
            &config,
            None,
        )
        .unwrap();

        assert!(checkpoint_path.exists());
        assert!(outcome.epochs[0].new_best);
        assert_eq!(outcome.best_epoch, Some(1));

        std::fs::remove_file(&checkpoint_path).unwrap();
    }

    #[test]
    fn best_accuracy_tracks_strict_improvements() {
        let checkpoint_path = scratch_checkpoint("strict");
        let config = TrainConfig {
            checkpoint_path: checkpoint_path.clone(),
            epochs: 4,
            batch_size: 8,
            ..TrainConfig::default()
        };

        let (features, labels) = toy_data(16);
        let mut model = MlpClassifier::new(10, 2, 0.3, config.seed);
        let mut optimizer = AdamOptimizer::new(config.learning_rate);

        let outcome = train(
            &mut model,
            &mut optimizer,
            &features.view(),
            &labels,
            &features.view(),
            &labels,
            &config,
            None,
        )
        .unwrap();

        // Every new_best epoch must strictly beat all earlier accuracies.
        let mut best_so_far = f32::NEG_INFINITY;
        for record in &outcome.epochs {
            assert_eq!(record.new_best, record.val_accuracy > best_so_far);
            best_so_far = best_so_far.max(record.val_accuracy);
        }
        assert_eq!(outcome.best_val_accuracy, best_so_far);

        std::fs::remove_file(&checkpoint_path).unwrap();
    }

    #[test]
    fn training_converges_on_separable_data() {
        let checkpoint_path = scratch_checkpoint("converges");
        let config = TrainConfig {
            checkpoint_path: checkpoint_path.clone(),
            epochs: 8,
            batch_size: 8,
            dropout: 0.0,
            ..TrainConfig::default()
        };

        let (features, labels) = toy_data(24);
        let mut model = MlpClassifier::new(10, 2, config.dropout, config.seed);
        let mut optimizer = AdamOptimizer::new(config.learning_rate);

        let outcome = train(
            &mut model,
            &mut optimizer,
            &features.view(),
            &labels,
            &features.view(),
            &labels,
            &config,
            None,
        )
        .unwrap();

        assert!(
            outcome.best_val_accuracy > 0.9,
            "best accuracy {} on separable blobs",
            outcome.best_val_accuracy
        );

        std::fs::remove_file(&checkpoint_path).unwrap();
    }
}
