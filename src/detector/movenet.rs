// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! MoveNet single-pose detector on ONNX Runtime.
//!
//! The model takes an NHWC image tensor of shape (1, S, S, 3) with raw 0-255
//! values and returns a tensor of shape (1, 1, 17, 3) holding `(y, x, score)`
//! per keypoint, normalized to the input crop.

use std::path::Path;

use image::{DynamicImage, GenericImageView};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::{DynValue, Tensor};

use super::crop::{CropRegion, determine_crop_region, init_crop_region};
use super::KeypointDetector;
use crate::config::PipelineConfig;
use crate::error::{PoseError, Result};
use crate::keypoint::{NUM_KEYPOINTS, Person};
use crate::preprocessing::{crop_and_resize, image_to_nhwc};

/// MoveNet keypoint detector with crop-region tracking.
///
/// # Example
///
/// ```no_run
/// use pose_action::{MoveNet, PipelineConfig};
/// use pose_action::detector::{KeypointDetector, detect_with_refinement};
///
/// let mut detector = MoveNet::load("movenet_thunder.onnx", &PipelineConfig::default())?;
/// let image = image::open("runner.jpg")?;
/// let person = detect_with_refinement(&mut detector, &image, 3)?;
/// println!("min keypoint score {:.2}", person.min_score());
/// # Ok::<(), pose_action::PoseError>(())
/// ```
pub struct MoveNet {
    /// ONNX Runtime session.
    session: Session,
    /// Input tensor name.
    input_name: String,
    /// Output tensor name.
    output_name: String,
    /// Square model input size.
    input_size: u32,
    /// Whether the model takes int32 input.
    int_input: bool,
    /// Region of interest carried between calls of one tracking sequence.
    crop_region: Option<CropRegion>,
}

impl MoveNet {
    /// Load a MoveNet model from an ONNX file.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PoseError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(config.num_threads)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to set intra-thread count: {e}")))?
            .commit_from_file(path)
            .map_err(|e| PoseError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| PoseError::ModelLoadError("Model has no outputs".to_string()))?;

        Ok(Self {
            session,
            input_name,
            output_name,
            input_size: config.input_size,
            int_input: config.int_input,
            crop_region: None,
        })
    }

    /// Run the model on one crop and return `(y, x, score)` triples
    /// normalized to the full image.
    fn run_detector(&mut self, image: &DynamicImage, region: &CropRegion) -> Result<[[f32; 3]; NUM_KEYPOINTS]> {
        let crop = crop_and_resize(image, region, self.input_size)?;
        let tensor = image_to_nhwc(&crop);

        #[allow(clippy::cast_possible_truncation)]
        let input: DynValue = if self.int_input {
            Tensor::from_array(tensor.mapv(|v| v as i32))
                .map_err(|e| PoseError::InferenceError(format!("Failed to create input tensor: {e}")))?
                .into_dyn()
        } else {
            Tensor::from_array(tensor)
                .map_err(|e| PoseError::InferenceError(format!("Failed to create input tensor: {e}")))?
                .into_dyn()
        };

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

        decode_keypoints(data, region)
    }
}

/// Map raw model output into full-image normalized `(y, x, score)` triples.
fn decode_keypoints(data: &[f32], region: &CropRegion) -> Result<[[f32; 3]; NUM_KEYPOINTS]> {
    if data.len() < NUM_KEYPOINTS * 3 {
        return Err(PoseError::InferenceError(format!(
            "Keypoint model returned {} values, expected {}",
            data.len(),
            NUM_KEYPOINTS * 3
        )));
    }

    Ok(std::array::from_fn(|i| {
        let (y, x, score) = (data[i * 3], data[i * 3 + 1], data[i * 3 + 2]);
        [
            region.height().mul_add(y, region.y_min),
            region.width().mul_add(x, region.x_min),
            score,
        ]
    }))
}

/// Convert normalized `(y, x, score)` triples into a person in pixel coordinates.
#[allow(clippy::cast_precision_loss)]
fn person_from_keypoints(keypoints: &[[f32; 3]; NUM_KEYPOINTS], height: u32, width: u32) -> Person {
    let coords = std::array::from_fn(|i| {
        let [y, x, score] = keypoints[i];
        [x * width as f32, y * height as f32, score]
    });
    Person::from_coordinates(&coords)
}

impl KeypointDetector for MoveNet {
    fn detect(&mut self, image: &DynamicImage, reset_crop_region: bool) -> Result<Person> {
        let (width, height) = image.dimensions();

        let region = match self.crop_region {
            Some(region) if !reset_crop_region => region,
            _ => init_crop_region(height, width),
        };

        let keypoints = self.run_detector(image, &region)?;
        self.crop_region = Some(determine_crop_region(&keypoints, height, width));

        Ok(person_from_keypoints(&keypoints, height, width))
    }
}

impl std::fmt::Debug for MoveNet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveNet")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("int_input", &self.int_input)
            .field("crop_region", &self.crop_region)
            .finish()
    }
}
