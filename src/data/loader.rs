//! Feature-file loading from a class-per-directory tree.
//!
//! The expected layout is a root directory with one subdirectory per language;
//! each subdirectory holds `.npy` files, one 2-D MFCC coefficient matrix per
//! audio sample. Directory names become class names; class indices are
//! assigned by sorted directory name so repeated runs agree on the mapping.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array2, Axis};
use ndarray_npy::{read_npy, ReadNpyError};

/// An in-memory dataset of flattened feature vectors with parallel labels.
#[derive(Debug, Clone)]
pub struct FeatureDataset {
    /// One flattened feature vector per row
    pub features: Array2<f32>,
    /// Class index for each row, parallel to `features`
    pub labels: Vec<usize>,
    /// Class names; position is the class index
    pub class_names: Vec<String>,
}

impl FeatureDataset {
    pub fn num_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn feature_dim(&self) -> usize {
        self.features.ncols()
    }

    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Per-class sample counts, indexed by class.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_classes()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

/// Loads every `.npy` feature file under `root` into a single dataset.
///
/// Subdirectories are enumerated in sorted order and assigned zero-based
/// class indices; non-directory entries are ignored. Each feature file must
/// hold a 2-D `f32` array, and every flattened vector must have the same
/// length as the first one seen. Any violation is a fatal [`DataError`]
/// reported before training starts.
pub fn load_dataset(root: &Path) -> Result<FeatureDataset, DataError> {
    let mut class_dirs: Vec<(String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(root).map_err(|err| DataError::Io(root.to_path_buf(), err))? {
        let entry = entry.map_err(|err| DataError::Io(root.to_path_buf(), err))?;
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name().to_string_lossy().into_owned();
            class_dirs.push((name, path));
        }
    }
    class_dirs.sort_by(|a, b| a.0.cmp(&b.0));

    if class_dirs.len() < 2 {
        return Err(DataError::TooFewClasses {
            root: root.to_path_buf(),
            found: class_dirs.len(),
        });
    }

    let mut rows: Vec<f32> = Vec::new();
    let mut labels: Vec<usize> = Vec::new();
    let mut class_names: Vec<String> = Vec::new();
    let mut feature_dim: Option<usize> = None;

    for (index, (name, dir)) in class_dirs.into_iter().enumerate() {
        let mut files: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(|err| DataError::Io(dir.clone(), err))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "npy"))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(DataError::EmptyClass(name));
        }

        for file in files {
            let matrix: Array2<f32> =
                read_npy(&file).map_err(|err| DataError::Npy(file.clone(), err))?;
            let flat_len = matrix.len();
            match feature_dim {
                None => feature_dim = Some(flat_len),
                Some(expected) if expected != flat_len => {
                    return Err(DataError::ShapeMismatch {
                        path: file,
                        expected,
                        found: flat_len,
                    });
                }
                Some(_) => {}
            }
            for row in matrix.axis_iter(Axis(0)) {
                rows.extend(row.iter().copied());
            }
            labels.push(index);
        }
        class_names.push(name);
    }

    let dim = feature_dim.unwrap_or(0);
    let features = Array2::from_shape_vec((labels.len(), dim), rows)
        .expect("row lengths validated during load");

    Ok(FeatureDataset {
        features,
        labels,
        class_names,
    })
}

#[derive(Debug)]
pub enum DataError {
    /// Filesystem failure while scanning or reading, with the offending path
    Io(PathBuf, std::io::Error),
    /// A feature file could not be parsed as a 2-D `f32` array
    Npy(PathBuf, ReadNpyError),
    /// The root directory holds fewer than two class subdirectories
    TooFewClasses { root: PathBuf, found: usize },
    /// A class directory contains no `.npy` files
    EmptyClass(String),
    /// A sample's flattened length differs from the rest of the run
    ShapeMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Io(path, err) => write!(f, "IO error at {}: {}", path.display(), err),
            DataError::Npy(path, err) => {
                write!(f, "failed to read {}: {}", path.display(), err)
            }
            DataError::TooFewClasses { root, found } => write!(
                f,
                "{} holds {} class directories; at least 2 are required",
                root.display(),
                found
            ),
            DataError::EmptyClass(name) => {
                write!(f, "class directory '{}' contains no .npy files", name)
            }
            DataError::ShapeMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "{} flattens to {} values but earlier samples have {}",
                path.display(),
                found,
                expected
            ),
        }
    }
}

impl std::error::Error for DataError {}
