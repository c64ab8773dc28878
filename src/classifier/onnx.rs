// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Exported pose classifier on ONNX Runtime.
//!
//! The exported graph takes the raw (1, 51) landmark row and contains the
//! embedding step itself.

use std::path::Path;

use ndarray::{Array1, Array2};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;

use super::{ActionClassifier, is_distribution, softmax};
use crate::error::{PoseError, Result};
use crate::keypoint::NUM_LANDMARK_VALUES;

/// Classifier backed by an ONNX export.
pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    output_name: String,
    num_classes: usize,
}

impl OnnxClassifier {
    /// Load an exported classifier.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the `.onnx` file.
    /// * `num_classes` - Expected output width, normally the catalog size.
    /// * `num_threads` - Intra-op threads; `0` lets ONNX Runtime decide.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoadError` if the model doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P, num_classes: usize, num_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PoseError::ModelLoadError(format!(
                "Classifier file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(num_threads)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to set intra-thread count: {e}")))?
            .commit_from_file(path)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to load classifier: {e}")))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| PoseError::ModelLoadError("Classifier has no inputs".to_string()))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| PoseError::ModelLoadError("Classifier has no outputs".to_string()))?;

        Ok(Self {
            session,
            input_name,
            output_name,
            num_classes,
        })
    }
}

/// Turn raw model output into a probability vector of the expected width.
fn to_probabilities(output: &[f32], num_classes: usize) -> Result<Array1<f32>> {
    if output.len() != num_classes {
        return Err(PoseError::InferenceError(format!(
            "Classifier returned {} values, expected {num_classes}",
            output.len()
        )));
    }
    let values = Array1::from_vec(output.to_vec());
    if is_distribution(&values.view()) {
        Ok(values)
    } else {
        Ok(softmax(&values.view()))
    }
}

impl ActionClassifier for OnnxClassifier {
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn infer(&mut self, landmarks: &[f32; NUM_LANDMARK_VALUES]) -> Result<Array1<f32>> {
        let row = Array2::from_shape_vec((1, NUM_LANDMARK_VALUES), landmarks.to_vec())
            .map_err(|e| PoseError::InferenceError(format!("Invalid landmark row: {e}")))?;
        let input = Tensor::from_array(row)
            .map_err(|e| PoseError::InferenceError(format!("Failed to create input tensor: {e}")))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| PoseError::InferenceError(format!("Inference failed: {e}")))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| PoseError::InferenceError(format!("Output '{}' not found", self.output_name)))?;
        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PoseError::InferenceError(format!("Failed to extract output: {e}")))?;

        to_probabilities(data, self.num_classes)
    }
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("num_classes", &self.num_classes)
            .finish()
    }
}
