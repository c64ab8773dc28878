// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Prediction modes.

use std::fmt;
use std::str::FromStr;

/// How the files of a prediction folder are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PredictionMode {
    /// Every file is one image with its own label.
    #[default]
    Image,
    /// Every file is one video; frame probabilities are summed into one label.
    Video,
}

impl PredictionMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for PredictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PredictionMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" | "images" | "img" => Ok(Self::Image),
            "video" | "videos" | "vid" => Ok(Self::Video),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid mode string.
#[derive(Debug, Clone)]
pub struct ModeParseError(String);

impl fmt::Display for ModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid mode '{}', expected one of: image, video", self.0)
    }
}

impl std::error::Error for ModeParseError {}
