//! Best-model persistence as an `.npz` archive of layer parameters.
//!
//! Entries are named `layer{i}_weights` / `layer{i}_bias`, one pair per dense
//! layer. Loading shape-checks every entry against the receiving model, so a
//! checkpoint from a different topology or feature length fails loudly
//! instead of silently corrupting parameters.

use std::fs::File;
use std::path::Path;

use ndarray::{Array1, Array2};
use ndarray_npy::{NpzReader, NpzWriter, ReadNpzError, WriteNpzError};

use crate::neural::model::MlpClassifier;

/// Writes every layer's parameters to `path`, overwriting any previous file.
pub fn save(model: &MlpClassifier, path: &Path) -> Result<(), CheckpointError> {
    let file = File::create(path)?;
    let mut npz = NpzWriter::new(file);
    for (index, layer) in model.layers().iter().enumerate() {
        npz.add_array(format!("layer{}_weights", index), &layer.weights)?;
        npz.add_array(format!("layer{}_bias", index), &layer.bias)?;
    }
    npz.finish()?;
    Ok(())
}

/// Replaces `model`'s parameters with the archived ones.
pub fn load(model: &mut MlpClassifier, path: &Path) -> Result<(), CheckpointError> {
    let file = File::open(path)?;
    let mut npz = NpzReader::new(file)?;

    for (index, layer) in model.layers_mut().iter_mut().enumerate() {
        let weights_name = format!("layer{}_weights", index);
        let bias_name = format!("layer{}_bias", index);

        let weights: Array2<f32> = npz.by_name(&weights_name)?;
        if weights.dim() != layer.weights.dim() {
            return Err(CheckpointError::ShapeMismatch {
                name: weights_name,
                expected: vec![layer.weights.nrows(), layer.weights.ncols()],
                found: weights.shape().to_vec(),
            });
        }

        let bias: Array1<f32> = npz.by_name(&bias_name)?;
        if bias.len() != layer.bias.len() {
            return Err(CheckpointError::ShapeMismatch {
                name: bias_name,
                expected: vec![layer.bias.len()],
                found: bias.shape().to_vec(),
            });
        }

        layer.weights = weights;
        layer.bias = bias;
    }

    Ok(())
}

#[derive(Debug)]
pub enum CheckpointError {
    Io(std::io::Error),
    Read(ReadNpzError),
    Write(WriteNpzError),
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointError::Io(err) => write!(f, "IO error: {}", err),
            CheckpointError::Read(err) => write!(f, "failed to read checkpoint: {}", err),
            CheckpointError::Write(err) => write!(f, "failed to write checkpoint: {}", err),
            CheckpointError::ShapeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "checkpoint entry '{}' has shape {:?}, model expects {:?}",
                name, found, expected
            ),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<std::io::Error> for CheckpointError {
    fn from(value: std::io::Error) -> Self {
        CheckpointError::Io(value)
    }
}

impl From<ReadNpzError> for CheckpointError {
    fn from(value: ReadNpzError) -> Self {
        CheckpointError::Read(value)
    }
}

impl From<WriteNpzError> for CheckpointError {
    fn from(value: WriteNpzError) -> Self {
        CheckpointError::Write(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::model::{MlpClassifier, Mode};
    use ndarray::Array2;
    use std::path::PathBuf;

    fn scratch_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "mfcc_langid_ckpt_{}_{}.npz",
            tag,
            std::process::id()
        ))
    }

    #[test]
    fn save_and_load_round_trips_parameters() {
        let path = scratch_path("roundtrip");
        let mut source = MlpClassifier::new(12, 3, 0.3, 42);
        source.set_mode(Mode::Eval);
        save(&source, &path).unwrap();

        // A differently seeded model starts with different weights.
        let mut restored = MlpClassifier::new(12, 3, 0.3, 99);
        restored.set_mode(Mode::Eval);
        load(&mut restored, &path).unwrap();

        let batch = Array2::<f32>::ones((2, 12));
        assert_eq!(source.forward(&batch), restored.forward(&batch));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_rejects_mismatched_topology() {
        let path = scratch_path("mismatch");
        let source = MlpClassifier::new(12, 3, 0.3, 42);
        save(&source, &path).unwrap();

        let mut other_dim = MlpClassifier::new(16, 3, 0.3, 42);
        assert!(matches!(
            load(&mut other_dim, &path),
            Err(CheckpointError::ShapeMismatch { .. })
        ));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_fails_on_missing_file() {
        let mut model = MlpClassifier::new(8, 2, 0.3, 42);
        let missing = scratch_path("missing_never_written");
        assert!(matches!(
            load(&mut model, &missing),
            Err(CheckpointError::Io(_))
        ));
    }
}
