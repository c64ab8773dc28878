// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pipeline configuration.
//!
//! This module defines the [`PipelineConfig`] struct, which controls the pose
//! extraction pipeline: the keypoint confidence threshold used to reject
//! detections, how many refinement passes the detector gets per image, and
//! the detector's input tensor layout.

/// Configuration for pose extraction and classification.
///
/// It uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use pose_action::PipelineConfig;
///
/// let config = PipelineConfig::new()
///     .with_confidence(0.2)
///     .with_inference_count(3)
///     .with_input_size(192);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum score every one of the 17 keypoints must reach (0.0 to 1.0).
    /// Items with any keypoint below this value are skipped.
    pub confidence_threshold: f32,
    /// Number of detector calls per image. Only the last result is kept;
    /// the earlier calls let the detector's crop region converge.
    pub inference_count: usize,
    /// Square input size of the keypoint model (192 for lightning, 256 for thunder).
    pub input_size: u32,
    /// Whether the keypoint model expects an int32 input tensor instead of float32.
    pub int_input: bool,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose the optimal number.
    pub num_threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            inference_count: 3,
            input_size: 256,
            int_input: true,
            num_threads: 0,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keypoint confidence threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum keypoint score (0.0 to 1.0).
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the number of detector passes per image.
    ///
    /// Values below 1 are treated as 1 when the detector runs.
    #[must_use]
    pub const fn with_inference_count(mut self, count: usize) -> Self {
        self.inference_count = count;
        self
    }

    /// Set the square input size of the keypoint model.
    #[must_use]
    pub const fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }

    /// Select an int32 (`true`) or float32 (`false`) input tensor for the keypoint model.
    #[must_use]
    pub const fn with_int_input(mut self, int_input: bool) -> Self {
        self.int_input = int_input;
        self
    }

    /// Set the number of threads for inference.
    ///
    /// # Arguments
    ///
    /// * `threads` - The number of intra-op threads. Set to `0` for auto-configuration.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Validate value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the threshold is outside `[0, 1]` or the input size is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(crate::PoseError::ConfigError(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.input_size == 0 {
            return Err(crate::PoseError::ConfigError(
                "input size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert!((config.confidence_threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.inference_count, 3);
        assert_eq!(config.input_size, 256);
        assert!(config.int_input);
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::new()
            .with_confidence(0.1)
            .with_inference_count(5)
            .with_input_size(192)
            .with_int_input(false)
            .with_threads(4);

        assert!((config.confidence_threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.inference_count, 5);
        assert_eq!(config.input_size, 192);
        assert!(!config.int_input);
        assert_eq!(config.num_threads, 4);
    }

    #[test]
    fn test_config_validate() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(PipelineConfig::new().with_confidence(1.5).validate().is_err());
        assert!(PipelineConfig::new().with_input_size(0).validate().is_err());
    }
}
