use std::env;

use anyhow::{Context, Result};

use mfcc_langid::{
    checkpoint, confusion_matrix, evaluate, format_report, load_dataset, plot_confusion_matrix,
    split_indices, take_rows, train, AdamOptimizer, MlpClassifier, RunLogger, StandardScaler,
    TrainConfig,
};

fn main() -> Result<()> {
    let config = match env::args().nth(1) {
        Some(path) => TrainConfig::load_from_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => TrainConfig::default(),
    };

    let dataset = load_dataset(&config.data_dir)
        .with_context(|| format!("loading features from {}", config.data_dir.display()))?;
    println!(
        "Loaded {} samples across {} classes ({} features each)",
        dataset.num_samples(),
        dataset.num_classes(),
        dataset.feature_dim()
    );

    let split = split_indices(dataset.num_samples(), config.val_fraction, config.seed);
    println!("Training samples: {}", split.train.len());
    println!("Validation samples: {}", split.val.len());

    let (train_raw, train_labels) = take_rows(&dataset.features, &dataset.labels, &split.train);
    let (val_raw, val_labels) = take_rows(&dataset.features, &dataset.labels, &split.val);

    // Standardization statistics come from the training split only.
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
    let mut logger = RunLogger::create(&config.run_log_path)
        .with_context(|| format!("creating run log at {}", config.run_log_path.display()))?;

    train(
        &mut model,
        &mut optimizer,
        &train_features.view(),
        &train_labels,
        &val_features.view(),
        &val_labels,
        &config,
        Some(&mut logger),
    )
    .context("training run failed")?;

    // Final report comes from a fresh model carrying the best parameters.
    let mut best_model = MlpClassifier::new(
        dataset.feature_dim(),
        dataset.num_classes(),
        config.dropout,
        config.seed,
    );
    checkpoint::load(&mut best_model, &config.checkpoint_path).with_context(|| {
        format!(
            "reloading best checkpoint from {}",
            config.checkpoint_path.display()
        )
    })?;

    let mut rng = mfcc_langid::train::eval_rng(config.seed);
    let report = evaluate(
        &mut best_model,
        &val_features.view(),
        &val_labels,
        config.batch_size,
        &mut rng,
    );

    println!("Final Validation Loss: {:.4}", report.loss);
    println!("Final Validation Accuracy: {:.2}%", report.accuracy * 100.0);

    let matrix = confusion_matrix(&report.y_true, &report.y_pred, dataset.num_classes());
    println!("{}", format_report(&matrix, &dataset.class_names));

    plot_confusion_matrix(&config.confusion_matrix_path, &matrix, &dataset.class_names)
        .map_err(|err| anyhow::anyhow!("{}", err))
        .with_context(|| {
            format!(
                "rendering confusion matrix to {}",
                config.confusion_matrix_path.display()
            )
        })?;
    println!(
        "Confusion matrix saved to {}",
        config.confusion_matrix_path.display()
    );

    Ok(())
}
