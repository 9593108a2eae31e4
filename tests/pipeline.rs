//! End-to-end run over a synthetic three-language dataset.

use std::fs;
use std::path::PathBuf;

use ndarray::Array2;
use ndarray_npy::write_npy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mfcc_langid::{
    checkpoint, classification_report, confusion_matrix, evaluate, load_dataset, split_indices,
    take_rows, train, AdamOptimizer, MlpClassifier, RunLogger, StandardScaler, TrainConfig,
};

const CLASSES: [&str; 3] = ["english", "mandarin", "swedish"];
const SAMPLES_PER_CLASS: usize = 100;

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mfcc_langid_pipeline_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes 100 samples per class, each a 4x5 coefficient matrix (20 features
/// flattened) drawn around a class-specific center so the task is learnable.
fn write_synthetic_dataset(root: &PathBuf) {
    let mut rng = StdRng::seed_from_u64(1234);
    for (class_index, class) in CLASSES.iter().enumerate() {
        let class_dir = root.join(class);
        fs::create_dir_all(&class_dir).unwrap();
        let center = class_index as f32 * 3.0 - 3.0;
        for sample in 0..SAMPLES_PER_CLASS {
            let matrix =
                Array2::<f32>::from_shape_fn((4, 5), |_| center + rng.gen_range(-0.5..0.5));
            write_npy(class_dir.join(format!("sample_{:03}.npy", sample)), &matrix).unwrap();
        }
    }
}

#[test]
fn full_pipeline_on_three_synthetic_languages() {
    let dir = scratch_dir();
    let data_dir = dir.join("features");
    fs::create_dir_all(&data_dir).unwrap();
    write_synthetic_dataset(&data_dir);

    let config = TrainConfig {
        data_dir: data_dir.clone(),
        checkpoint_path: dir.join("best_model.npz"),
        run_log_path: dir.join("train_log.jsonl"),
        epochs: 10,
        batch_size: 64,
        ..TrainConfig::default()
    };

    let dataset = load_dataset(&config.data_dir).unwrap();
    assert_eq!(dataset.num_samples(), 300);
    assert_eq!(dataset.num_classes(), 3);
    assert_eq!(dataset.feature_dim(), 20);
    assert_eq!(dataset.class_names, CLASSES.to_vec());

    let split = split_indices(dataset.num_samples(), config.val_fraction, config.seed);
    assert_eq!(split.train.len(), 240);
    assert_eq!(split.val.len(), 60);

    let (train_raw, train_labels) = take_rows(&dataset.features, &dataset.labels, &split.train);
    let (val_raw, val_labels) = take_rows(&dataset.features, &dataset.labels, &split.val);

    let scaler = StandardScaler::fit(&train_raw.view());
    let train_features = scaler.transform(&train_raw.view());
    let val_features = scaler.transform(&val_raw.view());

    let mut model = MlpClassifier::new(
        dataset.feature_dim(),
        dataset.num_classes(),
        config.dropout,
        config.seed,
    );
    let mut optimizer = AdamOptimizer::new(config.learning_rate);
    let mut logger = RunLogger::create(&config.run_log_path).unwrap();

    let outcome = train(
        &mut model,
        &mut optimizer,
        &train_features.view(),
        &train_labels,
        &val_features.view(),
        &val_labels,
        &config,
        Some(&mut logger),
    )
    .unwrap();

    assert_eq!(outcome.epochs.len(), 10);
    assert!(config.checkpoint_path.exists());
    assert!(outcome.best_epoch.is_some());

    // The run log carries one JSON record per epoch.
    let log = fs::read_to_string(&config.run_log_path).unwrap();
    assert_eq!(log.lines().count(), 10);

    // Reloading the best checkpoint reproduces the recorded best accuracy.
    let mut best_model = MlpClassifier::new(
        dataset.feature_dim(),
        dataset.num_classes(),
        config.dropout,
        config.seed,
    );
    checkpoint::load(&mut best_model, &config.checkpoint_path).unwrap();

    let mut rng = mfcc_langid::train::eval_rng(config.seed);
    let report = evaluate(
        &mut best_model,
        &val_features.view(),
        &val_labels,
        config.batch_size,
        &mut rng,
    );
    assert!((report.accuracy - outcome.best_val_accuracy).abs() < 1e-6);

    // Well-separated blobs should be essentially solved.
    assert!(
        report.accuracy > 0.9,
        "validation accuracy {}",
        report.accuracy
    );

    let matrix = confusion_matrix(&report.y_true, &report.y_pred, dataset.num_classes());
    let metrics = classification_report(&matrix);
    assert_eq!(metrics.len(), 3);

    let total_support: usize = metrics.iter().map(|m| m.support).sum();
    assert_eq!(total_support, 60);

    // Row sums equal the true per-class validation counts.
    for class in 0..3 {
        let expected = val_labels.iter().filter(|&&l| l == class).count();
        assert_eq!(matrix.row(class).sum(), expected);
    }

    fs::remove_dir_all(&dir).unwrap();
}
