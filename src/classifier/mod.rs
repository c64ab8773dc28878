// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Action classifiers.
//!
//! An [`ActionClassifier`] maps one 51-value landmark row (`x, y, score` per
//! keypoint) to a probability vector over the classes of a
//! [`ClassCatalog`](crate::ClassCatalog). Two runtimes are provided:
//!
//! - [`MlpClassifier`]: native feed-forward network with JSON weights.
//! - [`OnnxClassifier`]: exported model on ONNX Runtime.

mod mlp;
mod onnx;

pub use mlp::{Activation, DenseLayer, EMBEDDING_SIZE, HIDDEN_UNITS, MlpClassifier, relu6};
pub use onnx::OnnxClassifier;

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{PoseError, Result};
use crate::keypoint::NUM_LANDMARK_VALUES;
use crate::table::LandmarkTable;

/// A classifier over pose landmark rows.
pub trait ActionClassifier {
    /// Number of classes in the output vector.
    fn num_classes(&self) -> usize;

    /// Run the model on a row already known to hold 51 values.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    fn infer(&mut self, landmarks: &[f32; NUM_LANDMARK_VALUES]) -> Result<Array1<f32>>;

    /// Class probabilities for one landmark row.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `landmarks` doesn't hold exactly 51 values;
    /// the model is not run in that case.
    fn predict(&mut self, landmarks: &[f32]) -> Result<Array1<f32>> {
        let row: &[f32; NUM_LANDMARK_VALUES] =
            landmarks.try_into().map_err(|_| PoseError::ShapeMismatch {
                expected: NUM_LANDMARK_VALUES,
                actual: landmarks.len(),
            })?;
        self.infer(row)
    }

    /// Class probabilities for every record of a table, one row per record.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the model output length
    /// disagrees with [`Self::num_classes`].
    fn predict_table(&mut self, table: &LandmarkTable) -> Result<Array2<f32>> {
        let num_classes = self.num_classes();
        let mut out = Array2::zeros((table.len(), num_classes));
        for (mut row, record) in out.rows_mut().into_iter().zip(table) {
            let probs = self.infer(&record.landmarks)?;
            if probs.len() != num_classes {
                return Err(PoseError::InferenceError(format!(
                    "Classifier returned {} probabilities, expected {num_classes}",
                    probs.len()
                )));
            }
            row.assign(&probs);
        }
        Ok(out)
    }
}

impl<C: ActionClassifier + ?Sized> ActionClassifier for Box<C> {
    fn num_classes(&self) -> usize {
        (**self).num_classes()
    }

    fn infer(&mut self, landmarks: &[f32; NUM_LANDMARK_VALUES]) -> Result<Array1<f32>> {
        (**self).infer(landmarks)
    }
}

/// Load a classifier artifact, picking the runtime from the file extension.
///
/// `.onnx` files load as [`OnnxClassifier`]; anything else as a JSON
/// [`MlpClassifier`].
///
/// # Errors
///
/// Returns `ModelLoadError` if the artifact can't be loaded.
pub fn load_classifier<P: AsRef<Path>>(
    path: P,
    num_classes: usize,
    num_threads: usize,
) -> Result<Box<dyn ActionClassifier>> {
    let path = path.as_ref();
    let is_onnx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"));

    if is_onnx {
        Ok(Box::new(OnnxClassifier::load(path, num_classes, num_threads)?))
    } else {
        Ok(Box::new(MlpClassifier::load(path)?))
    }
}

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &ArrayView1<'_, f32>) -> Array1<f32> {
    let max_val = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp = logits.mapv(|v| (v - max_val).exp());
    let sum = exp.sum();
    if sum > 0.0 { exp / sum } else { exp }
}

/// Whether a vector already looks like a probability distribution.
#[must_use]
pub fn is_distribution(values: &ArrayView1<'_, f32>) -> bool {
    values.iter().all(|&v| v >= 0.0) && (values.sum() - 1.0).abs() <= 1e-3
}
