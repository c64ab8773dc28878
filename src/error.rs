// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the pose-action library.

use std::fmt;

/// Result type alias for pose-action operations.
pub type Result<T> = std::result::Result<T, PoseError>;

/// Main error type for the pose-action library.
#[derive(Debug)]
pub enum PoseError {
    /// Error loading a detector or classifier model.
    ModelLoadError(String),
    /// Error during model inference.
    InferenceError(String),
    /// Error decoding or processing images.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// No item of a folder, class or video produced a pose record.
    NoValidData(String),
    /// Classifier input has the wrong number of values.
    ShapeMismatch {
        /// Expected vector length.
        expected: usize,
        /// Actual vector length.
        actual: usize,
    },
    /// Malformed landmark table file.
    TableError(String),
    /// Malformed or inconsistent class catalog.
    CatalogError(String),
    /// Video decoding error.
    VideoError(String),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::NoValidData(msg) => write!(f, "No valid data: {msg}"),
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "Shape mismatch: expected {expected} landmark values, got {actual}"
            ),
            Self::TableError(msg) => write!(f, "Landmark table error: {msg}"),
            Self::CatalogError(msg) => write!(f, "Class catalog error: {msg}"),
            Self::VideoError(msg) => write!(f, "Video error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for PoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PoseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for PoseError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for PoseError {
    fn from(err: serde_json::Error) -> Self {
        Self::ModelLoadError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PoseError::NoValidData("No valid images found for the \"run\" class.".to_string());
        assert_eq!(
            err.to_string(),
            "No valid data: No valid images found for the \"run\" class."
        );

        let err = PoseError::ShapeMismatch {
            expected: 51,
            actual: 34,
        };
        assert_eq!(
            err.to_string(),
            "Shape mismatch: expected 51 landmark values, got 34"
        );
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = PoseError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(PoseError::TableError("x".to_string()).source().is_none());
    }
}
