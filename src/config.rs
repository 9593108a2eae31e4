//! Run configuration management via TOML files.
//!
//! This module provides configuration parsing from TOML format with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::Value;

/// Training run configuration loaded from a TOML file.
///
/// Every field has a default, so a missing file or section yields a usable
/// configuration. The network topology itself is fixed (see
/// [`crate::neural::model`]); only the knobs around it live here.
///
/// # Examples
///
/// ```
/// use mfcc_langid::TrainConfig;
///
/// let config = TrainConfig::load_from_file("config/train.toml")
///     .unwrap_or_else(|_| TrainConfig::default());
///
/// println!("Training for {} epochs, batch size {}", config.epochs, config.batch_size);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TrainConfig {
    /// Root directory with one subdirectory of `.npy` feature files per class
    pub data_dir: PathBuf,
    /// Where the best-checkpoint archive is written
    pub checkpoint_path: PathBuf,
    /// Where the final confusion-matrix image is written
    pub confusion_matrix_path: PathBuf,
    /// Where the JSON-lines run log is written
    pub run_log_path: PathBuf,
    /// Number of full passes over the training split
    pub epochs: usize,
    /// Mini-batch size for both training and evaluation
    pub batch_size: usize,
    /// Adam learning rate
    pub learning_rate: f32,
    /// Dropout rate applied after each hidden activation
    pub dropout: f32,
    /// Fraction of samples held out for validation
    pub val_fraction: f32,
    /// Random seed for splitting, shuffling, init, and dropout
    pub seed: u64,
}

impl TrainConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let value: Value =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let defaults = Self::default();

        let paths = value
            .get("paths")
            .and_then(|v| v.as_table())
            .cloned()
            .unwrap_or_default();

        let data_dir = paths
            .get("data_dir")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let checkpoint_path = paths
            .get("checkpoint")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or(defaults.checkpoint_path);
        let confusion_matrix_path = paths
            .get("confusion_matrix")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or(defaults.confusion_matrix_path);
        let run_log_path = paths
            .get("run_log")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or(defaults.run_log_path);

        let training = value
            .get("training")
            .and_then(|v| v.as_table())
            .cloned()
            .unwrap_or_default();

        let epochs = training
            .get("epochs")
            .and_then(|v| v.as_integer())
            .map(|v| v.max(1) as usize)
            .unwrap_or(defaults.epochs);
        let batch_size = training
            .get("batch_size")
            .and_then(|v| v.as_integer())
            .map(|v| v.max(1) as usize)
            .unwrap_or(defaults.batch_size);
        let learning_rate = training
            .get("learning_rate")
            .and_then(|v| v.as_float())
            .map(|v| v as f32)
            .filter(|v| *v > 0.0)
            .unwrap_or(defaults.learning_rate);
        let dropout = training
            .get("dropout")
            .and_then(|v| v.as_float())
            .map(|v| (v as f32).clamp(0.0, 0.99))
            .unwrap_or(defaults.dropout);
        let val_fraction = training
            .get("val_fraction")
            .and_then(|v| v.as_float())
            .map(|v| (v as f32).clamp(0.05, 0.5))
            .unwrap_or(defaults.val_fraction);
        let seed = training
            .get("seed")
            .and_then(|v| v.as_integer())
            .map(|v| v as u64)
            .unwrap_or(defaults.seed);

        Ok(Self {
            data_dir,
            checkpoint_path,
            confusion_matrix_path,
            run_log_path,
            epochs,
            batch_size,
            learning_rate,
            dropout,
            val_fraction,
            seed,
        })
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("mfcc_features"),
            checkpoint_path: PathBuf::from("best_model.npz"),
            confusion_matrix_path: PathBuf::from("final_confusion_matrix.png"),
            run_log_path: PathBuf::from("train_log.jsonl"),
            epochs: 20,
            batch_size: 64,
            learning_rate: 1e-3,
            dropout: 0.3,
            val_fraction: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {}", err),
            ConfigError::Parse(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_when_sections_missing() {
        let config = TrainConfig::from_str("").unwrap();
        assert_eq!(config.epochs, 20);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.seed, 42);
        assert_eq!(config.data_dir, PathBuf::from("mfcc_features"));
    }

    #[test]
    fn config_parses_custom_values() {
        let toml = "[paths]\ndata_dir = \"features\"\ncheckpoint = \"out/model.npz\"\n\
                    [training]\nepochs = 5\nbatch_size = 16\nlearning_rate = 0.01\nseed = 7";
        let config = TrainConfig::from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("features"));
        assert_eq!(config.checkpoint_path, PathBuf::from("out/model.npz"));
        assert_eq!(config.epochs, 5);
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.learning_rate, 0.01);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn config_clamps_out_of_range_values() {
        let toml = "[training]\ndropout = 1.5\nval_fraction = 0.9\nepochs = -3";
        let config = TrainConfig::from_str(toml).unwrap();
        assert_eq!(config.dropout, 0.99);
        assert_eq!(config.val_fraction, 0.5);
        assert_eq!(config.epochs, 1);
    }

    #[test]
    fn config_rejects_invalid_toml() {
        assert!(TrainConfig::from_str("not = [valid").is_err());
    }
}
