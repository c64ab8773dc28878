// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose extraction pipeline.
//!
//! Turns image folders, video frames and labeled dataset roots into
//! [`LandmarkTable`]s. Items that can't be decoded, aren't RGB, or whose
//! detection has any keypoint below the confidence threshold are skipped with
//! a diagnostic message; partial records are never produced.

use std::path::Path;

use image::DynamicImage;

use crate::catalog::ClassCatalog;
use crate::config::PipelineConfig;
use crate::detector::{KeypointDetector, detect_with_refinement};
use crate::error::{PoseError, Result};
use crate::keypoint::Person;
use crate::media::{list_entries, list_subdirectories, read_video_frames};
use crate::table::{LandmarkTable, PoseRecord};
use crate::verbose;

/// Class index carried by records extracted for prediction.
pub const PLACEHOLDER_CLASS_NO: usize = 0;

/// Class name of records extracted from an image folder for prediction.
pub const IMAGE_PLACEHOLDER_CLASS: &str = "temp";

/// Class name of records extracted from a video.
pub const VIDEO_PLACEHOLDER_CLASS: &str = "predict";

/// Records and diagnostics from one extraction.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// One message per skipped item, in visiting order.
    pub messages: Vec<String>,
    /// Accepted records.
    pub table: LandmarkTable,
}

/// Result of extracting a labeled dataset root.
#[derive(Debug, Clone)]
pub struct DatasetExtraction {
    /// Skip messages and per-class failures.
    pub messages: Vec<String>,
    /// Records of every class that produced at least one record.
    pub table: LandmarkTable,
    /// All class subdirectories in index order.
    pub catalog: ClassCatalog,
}

/// Why an item was not turned into a record.
enum Outcome {
    Accepted(Person),
    NotRgb,
    NoPose,
}

/// Runs a keypoint detector over media and collects landmark records.
pub struct PoseExtractor<D: KeypointDetector> {
    detector: D,
    config: PipelineConfig,
}

impl<D: KeypointDetector> PoseExtractor<D> {
    /// Create an extractor.
    pub const fn new(detector: D, config: PipelineConfig) -> Self {
        Self { detector, config }
    }

    /// Pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Mutable access to the detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Consume the extractor and return its detector.
    pub fn into_detector(self) -> D {
        self.detector
    }

    fn process(&mut self, image: &DynamicImage) -> Result<Outcome> {
        if image.color().channel_count() != 3 {
            return Ok(Outcome::NotRgb);
        }
        let person = detect_with_refinement(&mut self.detector, image, self.config.inference_count)?;
        if person.all_scores_at_least(self.config.confidence_threshold) {
            Ok(Outcome::Accepted(person))
        } else {
            Ok(Outcome::NoPose)
        }
    }

    /// Extract one record per accepted image of a folder.
    ///
    /// Entries are visited in alphabetical order and hidden entries are
    /// ignored. Every record carries `class_no` and `class_name`.
    ///
    /// # Errors
    ///
    /// Returns `NoValidData` if no image was accepted, `IoError` if the
    /// folder can't be listed, or the first detector error.
    pub fn extract_from_image_folder(
        &mut self,
        folder: &Path,
        class_no: usize,
        class_name: &str,
    ) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        for path in list_entries(folder)? {
            let shown = path.display();
            let image = match image::open(&path) {
                Ok(image) => image,
                Err(_) => {
                    extraction.messages.push(format!("Skipped {shown}. Invalid image."));
                    continue;
                }
            };

            match self.process(&image)? {
                Outcome::Accepted(person) => {
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    extraction
                        .table
                        .push(PoseRecord::from_person(file_name, &person, class_no, class_name));
                }
                Outcome::NotRgb => extraction
                    .messages
                    .push(format!("Skipped {shown}. Image isn't in RGB format.")),
                Outcome::NoPose => extraction
                    .messages
                    .push(format!("Skipped {shown}. No pose was confidently detected.")),
            }
        }

        if extraction.table.is_empty() {
            return Err(PoseError::NoValidData(format!(
                "No valid images found for the \"{class_name}\" class."
            )));
        }
        Ok(extraction)
    }

    /// Extract one record per accepted frame.
    ///
    /// Frames are identified by their 1-based position and carry the
    /// placeholder class `(0, "predict")`. A frame given as an error is
    /// reported as an invalid image.
    ///
    /// # Errors
    ///
    /// Returns `NoValidData` if no frame was accepted, or the first detector error.
    pub fn extract_from_video_frames<I>(&mut self, frames: I) -> Result<Extraction>
    where
        I: IntoIterator<Item = Result<DynamicImage>>,
    {
        let mut extraction = Extraction::default();

        for (idx, frame) in frames.into_iter().enumerate() {
            let frame_no = idx + 1;
            let Ok(image) = frame else {
                extraction.messages.push(format!("Skipped {frame_no}. Invalid image."));
                continue;
            };

            match self.process(&image)? {
                Outcome::Accepted(person) => extraction.table.push(PoseRecord::from_person(
                    frame_no.to_string(),
                    &person,
                    PLACEHOLDER_CLASS_NO,
                    VIDEO_PLACEHOLDER_CLASS,
                )),
                Outcome::NotRgb => extraction
                    .messages
                    .push(format!("Skipped {frame_no}. Image isn't in RGB format.")),
                Outcome::NoPose => extraction
                    .messages
                    .push(format!("Skipped {frame_no}. No pose was confidently detected.")),
            }
        }

        if extraction.table.is_empty() {
            return Err(PoseError::NoValidData(format!(
                "No valid images found for the \"{VIDEO_PLACEHOLDER_CLASS}\" class."
            )));
        }
        Ok(extraction)
    }

    /// Decode a video file and extract its frames.
    ///
    /// The decoder is released before any frame reaches the detector.
    ///
    /// # Errors
    ///
    /// Returns `VideoError` or `FeatureNotEnabled` if the video can't be
    /// decoded, plus the errors of [`Self::extract_from_video_frames`].
    pub fn extract_from_video(&mut self, path: &Path) -> Result<Extraction> {
        let frames = read_video_frames(path)?;
        self.extract_from_video_frames(frames)
    }

    /// Extract a labeled dataset where each subdirectory of `root` is one class.
    ///
    /// Class indices follow the sorted subdirectory names. A class with no
    /// accepted image adds a message and is skipped. When `csv_out` is given
    /// the combined table is written there.
    ///
    /// # Errors
    ///
    /// Returns `NoValidData` if no class produced a record, or any listing,
    /// detector or write error.
    pub fn extract_labeled_dataset(
        &mut self,
        root: &Path,
        csv_out: Option<&Path>,
    ) -> Result<DatasetExtraction> {
        let class_dirs = list_subdirectories(root)?;
        let catalog = ClassCatalog::new(
            class_dirs
                .iter()
                .filter_map(|d| d.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
        )?;

        let mut messages = Vec::new();
        let mut table = LandmarkTable::new();

        for (class_no, dir) in class_dirs.iter().enumerate() {
            let class_name = catalog.get(class_no).unwrap_or_default();
            verbose!("Preprocessing {class_name}");

            match self.extract_from_image_folder(dir, class_no, class_name) {
                Ok(extraction) => {
                    messages.extend(extraction.messages);
                    table.append(extraction.table);
                }
                Err(PoseError::NoValidData(msg)) => messages.push(msg),
                Err(e) => return Err(e),
            }
        }

        if table.is_empty() {
            return Err(PoseError::NoValidData(format!(
                "No valid images found under {}",
                root.display()
            )));
        }

        if let Some(path) = csv_out {
            table.write_csv(path)?;
        }

        Ok(DatasetExtraction {
            messages,
            table,
            catalog,
        })
    }
}

impl<D: KeypointDetector + std::fmt::Debug> std::fmt::Debug for PoseExtractor<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseExtractor")
            .field("detector", &self.detector)
            .field("config", &self.config)
            .finish()
    }
}
