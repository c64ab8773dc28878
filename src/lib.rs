// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Pose Action Classification
//!
//! Classifies human actions in images and videos from body keypoints. A
//! MoveNet keypoint detector finds the 17 skeletal landmarks of one person,
//! the landmarks are normalized into a scale- and translation-invariant
//! embedding, and a small classifier turns that into class probabilities.
//! Videos are labeled by summing the probabilities of all valid frames.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use std::path::Path;
//!
//! use pose_action::{
//!     ClassCatalog, MoveNet, PipelineConfig, PredictionMode, classifier::load_classifier,
//!     run_prediction,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let catalog = ClassCatalog::read("labels.txt")?;
//!     let mut detector = MoveNet::load("movenet_thunder.onnx", &config)?;
//!     let mut classifier = load_classifier("pose_classifier.json", catalog.len(), 0)?;
//!
//!     let report = run_prediction(
//!         Path::new("clips/"),
//!         PredictionMode::Image,
//!         &mut detector,
//!         &mut classifier,
//!         &catalog,
//!         &config,
//!     )?;
//!
//!     for line in &report.lines {
//!         println!("{line}");
//!     }
//!     println!("accuracy: {:.2}%", report.accuracy);
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Classify every image of a folder (file names start with `<class>_`)
//! pose-action predict --source photos/ --model movenet_thunder.onnx \
//!     --classifier pose_classifier.json --labels labels.txt
//!
//! # Classify every video of a folder (requires the `video` feature)
//! pose-action predict --source clips/ --mode video --classifier pose_classifier.onnx
//!
//! # Build a landmark table from a dataset with one subfolder per class
//! pose-action extract --source dataset/train --output train.csv --labels-out labels.txt
//!
//! # Write a freshly initialized classifier for a label file
//! pose-action init-classifier --labels labels.txt --output pose_classifier.json
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`detector`] | [`KeypointDetector`] trait and the [`MoveNet`] implementation |
//! | [`normalize`] | Landmark normalization into the 34-value embedding |
//! | [`extract`] | [`PoseExtractor`] for image folders, videos and labeled datasets |
//! | [`classifier`] | [`ActionClassifier`] trait, [`MlpClassifier`], [`OnnxClassifier`] |
//! | [`aggregate`] | Argmax, soft voting and accuracy |
//! | [`predict`] | [`run_prediction`] folder-level entry point |
//! | [`table`] | [`LandmarkTable`] records and delimited-file persistence |
//! | [`catalog`] | [`ClassCatalog`] label files |
//! | [`error`] | Error types ([`PoseError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `video` | Video decoding through `video-rs` (FFmpeg) |

// Modules
pub mod aggregate;
pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod extract;
pub mod keypoint;
pub mod media;
pub mod mode;
pub mod normalize;
pub mod predict;
pub mod preprocessing;
pub mod results;
pub mod table;

// Re-export main types for convenience
pub use catalog::ClassCatalog;
pub use classifier::{ActionClassifier, MlpClassifier, OnnxClassifier};
pub use config::PipelineConfig;
pub use detector::{KeypointDetector, MoveNet};
pub use error::{PoseError, Result};
pub use extract::{DatasetExtraction, Extraction, PoseExtractor};
pub use keypoint::{BodyPart, BoundingBox, Keypoint, Person};
pub use mode::PredictionMode;
pub use normalize::{landmarks_to_embedding, normalize_pose_landmarks};
pub use predict::{PredictionReport, run_prediction, run_prediction_with_frames};
pub use results::{Prediction, Probs};
pub use table::{LandmarkTable, PoseRecord};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
