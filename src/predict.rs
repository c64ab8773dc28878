// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Folder-level prediction.
//!
//! [`run_prediction`] is the single entry point front ends call: it extracts
//! poses from a folder of images or videos, classifies them, resolves labels
//! and scores them against the ground truth encoded in the file names.

use std::path::Path;

use image::DynamicImage;

use crate::aggregate::{
    accuracy, ground_truth_from_file_name, image_labels, unknown_ground_truth_warnings,
    video_label,
};
use crate::catalog::ClassCatalog;
use crate::classifier::ActionClassifier;
use crate::config::PipelineConfig;
use crate::detector::KeypointDetector;
use crate::error::{PoseError, Result};
use crate::extract::{IMAGE_PLACEHOLDER_CLASS, PLACEHOLDER_CLASS_NO, PoseExtractor};
use crate::media::{list_entries, read_video_frames};
use crate::mode::PredictionMode;
use crate::results::{Prediction, Probs};

/// Everything a front end shows after a prediction run.
#[derive(Debug, Clone, Default)]
pub struct PredictionReport {
    /// One `<file> is <label>` line per predicted file.
    pub lines: Vec<String>,
    /// Skip messages and warnings, in the order they occurred.
    pub messages: Vec<String>,
    /// Percentage of predictions matching their file-name ground truth.
    pub accuracy: f64,
    /// Structured predictions behind `lines`.
    pub predictions: Vec<Prediction>,
}

impl PredictionReport {
    fn from_predictions(predictions: Vec<Prediction>, mut messages: Vec<String>, catalog: &ClassCatalog) -> Self {
        let names: Vec<&str> = predictions.iter().map(|p| p.file_name.as_str()).collect();
        messages.extend(unknown_ground_truth_warnings(&names, catalog));

        let truth: Vec<&str> = names.iter().map(|n| ground_truth_from_file_name(n)).collect();
        let predicted: Vec<&str> = predictions.iter().map(|p| p.label.as_str()).collect();
        let accuracy = accuracy(&predicted, &truth);

        Self {
            lines: predictions.iter().map(ToString::to_string).collect(),
            messages,
            accuracy,
            predictions,
        }
    }
}

/// Predict a label for every file in `folder`.
///
/// In image mode every file is one image. In video mode every non-hidden
/// file is one video whose frame probabilities are summed; a video without
/// any valid frame adds a message and is left out of the accuracy.
///
/// # Errors
///
/// Returns `NoValidData` if no image of an image folder is usable, or any
/// listing, inference, catalog or feature error.
pub fn run_prediction<D, C>(
    folder: &Path,
    mode: PredictionMode,
    detector: &mut D,
    classifier: &mut C,
    catalog: &ClassCatalog,
    config: &PipelineConfig,
) -> Result<PredictionReport>
where
    D: KeypointDetector + ?Sized,
    C: ActionClassifier + ?Sized,
{
    run_prediction_with_frames(folder, mode, detector, classifier, catalog, config, read_video_frames)
}

/// [`run_prediction`] with a custom video decoder.
///
/// `read_frames` returns every frame of one video file in playback order and
/// must release the file before returning. It is only called in video mode.
///
/// # Errors
///
/// Same as [`run_prediction`]. A `VideoError` from `read_frames` becomes a
/// skip message; any other decoder error is returned.
pub fn run_prediction_with_frames<D, C, F>(
    folder: &Path,
    mode: PredictionMode,
    detector: &mut D,
    classifier: &mut C,
    catalog: &ClassCatalog,
    config: &PipelineConfig,
    read_frames: F,
) -> Result<PredictionReport>
where
    D: KeypointDetector + ?Sized,
    C: ActionClassifier + ?Sized,
    F: FnMut(&Path) -> Result<Vec<Result<DynamicImage>>>,
{
    config.validate()?;
    if classifier.num_classes() != catalog.len() {
        return Err(PoseError::CatalogError(format!(
            "classifier predicts {} classes but the catalog lists {}",
            classifier.num_classes(),
            catalog.len()
        )));
    }

    let mut extractor = PoseExtractor::new(detector, config.clone());
    match mode {
        PredictionMode::Image => predict_images(folder, &mut extractor, classifier, catalog),
        PredictionMode::Video => {
            predict_videos(folder, &mut extractor, classifier, catalog, read_frames)
        }
    }
}

fn predict_images<D, C>(
    folder: &Path,
    extractor: &mut PoseExtractor<D>,
    classifier: &mut C,
    catalog: &ClassCatalog,
) -> Result<PredictionReport>
where
    D: KeypointDetector,
    C: ActionClassifier + ?Sized,
{
    let extraction =
        extractor.extract_from_image_folder(folder, PLACEHOLDER_CLASS_NO, IMAGE_PLACEHOLDER_CLASS)?;
    let probs = classifier.predict_table(&extraction.table)?;
    let labels = image_labels(&probs.view(), catalog)?;

    let predictions = extraction
        .table
        .iter()
        .zip(labels)
        .zip(probs.rows())
        .map(|((record, label), row)| Prediction {
            file_name: record.file_name.clone(),
            label,
            probs: Probs::new(row.to_owned()),
        })
        .collect();

    Ok(PredictionReport::from_predictions(predictions, extraction.messages, catalog))
}

fn predict_videos<D, C, F>(
    folder: &Path,
    extractor: &mut PoseExtractor<D>,
    classifier: &mut C,
    catalog: &ClassCatalog,
    mut read_frames: F,
) -> Result<PredictionReport>
where
    D: KeypointDetector,
    C: ActionClassifier + ?Sized,
    F: FnMut(&Path) -> Result<Vec<Result<DynamicImage>>>,
{
    let mut messages = Vec::new();
    let mut predictions = Vec::new();

    for path in list_entries(folder)?.into_iter().filter(|p| p.is_file()) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extraction = match read_frames(&path)
            .and_then(|frames| extractor.extract_from_video_frames(frames))
        {
            Ok(extraction) => extraction,
            Err(PoseError::NoValidData(msg) | PoseError::VideoError(msg)) => {
                messages.push(format!("Skipped {file_name}. {msg}"));
                continue;
            }
            Err(e) => return Err(e),
        };
        messages.extend(extraction.messages);

        let frame_probs = classifier.predict_table(&extraction.table)?;
        let (label, probs) = video_label(&frame_probs.view(), catalog)?;
        predictions.push(Prediction {
            file_name,
            label,
            probs,
        });
    }

    Ok(PredictionReport::from_predictions(predictions, messages, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::{NUM_KEYPOINTS, NUM_LANDMARK_VALUES, Person};
    use image::{DynamicImage, Rgb, RgbImage};
    use ndarray::{Array1, array};
    use std::fs;
    use std::path::PathBuf;

    /// Puts the red channel of the top-left pixel into every keypoint's x.
    struct RedDetector;

    impl KeypointDetector for RedDetector {
        fn detect(&mut self, image: &DynamicImage, _reset: bool) -> Result<Person> {
            let red = f32::from(image.to_rgb8().get_pixel(0, 0)[0]);
            Ok(Person::from_coordinates(&[[red, 0.0, 0.9]; NUM_KEYPOINTS]))
        }
    }

    /// Class 1 when the first landmark x exceeds 127, class 0 otherwise.
    struct ThresholdClassifier;

    impl ActionClassifier for ThresholdClassifier {
        fn num_classes(&self) -> usize {
            2
        }

        fn infer(&mut self, landmarks: &[f32; NUM_LANDMARK_VALUES]) -> Result<Array1<f32>> {
            Ok(if landmarks[0] > 127.0 { array![0.1_f32, 0.9] } else { array![0.9_f32, 0.1] })
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pose_action_predict_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_image_prediction_report() {
        let dir = temp_dir("images");
        RgbImage::from_pixel(4, 4, Rgb([10, 0, 0])).save(dir.join("run_1.png")).unwrap();
        RgbImage::from_pixel(4, 4, Rgb([200, 0, 0])).save(dir.join("run_2.png")).unwrap();
        RgbImage::from_pixel(4, 4, Rgb([250, 0, 0])).save(dir.join("walk_1.png")).unwrap();
        fs::write(dir.join("zz.txt"), b"text").unwrap();

        let catalog = ClassCatalog::new(["run", "walk"]).unwrap();
        let report = run_prediction(
            &dir,
            PredictionMode::Image,
            &mut RedDetector,
            &mut ThresholdClassifier,
            &catalog,
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(
            report.lines,
            vec!["run_1.png is run", "run_2.png is walk", "walk_1.png is walk"]
        );
        assert!((report.accuracy - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].ends_with("zz.txt. Invalid image."));
        assert_eq!(report.predictions[1].class_index(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_catalog_size_must_match() {
        let dir = temp_dir("mismatch");
        let catalog = ClassCatalog::new(["run"]).unwrap();
        let err = run_prediction(
            &dir,
            PredictionMode::Image,
            &mut RedDetector,
            &mut ThresholdClassifier,
            &catalog,
            &PipelineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PoseError::CatalogError(_)));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_report_warns_on_unknown_prefix() {
        let predictions = vec![Prediction {
            file_name: "jump_1.png".to_string(),
            label: "run".to_string(),
            probs: Probs::new(array![0.9_f32, 0.1]),
        }];
        let catalog = ClassCatalog::new(["run", "walk"]).unwrap();
        let report = PredictionReport::from_predictions(predictions, Vec::new(), &catalog);

        assert_eq!(report.lines, vec!["jump_1.png is run"]);
        assert_eq!(report.messages.len(), 1);
        assert!(report.accuracy.abs() < f64::EPSILON);
    }

    fn red_frame(red: u8) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([red, 0, 0]))))
    }

    fn gray_frame() -> Result<DynamicImage> {
        Ok(DynamicImage::ImageLuma8(image::GrayImage::new(4, 4)))
    }

    #[test]
    fn test_video_prediction_report() {
        let dir = temp_dir("videos_scripted");
        for name in ["run_1.mp4", "run_2.mp4", "run_3.mp4", "walk_1.mp4", "walk_2.mp4", ".hidden.mp4"] {
            fs::write(dir.join(name), b"frames").unwrap();
        }
        fs::create_dir_all(dir.join("nested")).unwrap();

        let catalog = ClassCatalog::new(["run", "walk"]).unwrap();
        let mut opened = Vec::new();
        let report = run_prediction_with_frames(
            &dir,
            PredictionMode::Video,
            &mut RedDetector,
            &mut ThresholdClassifier,
            &catalog,
            &PipelineConfig::default(),
            |path: &Path| {
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                opened.push(name.clone());
                match name.as_str() {
                    "run_1.mp4" => Ok(vec![red_frame(10), red_frame(10), red_frame(200)]),
                    "run_2.mp4" => Ok(vec![red_frame(200), red_frame(200), gray_frame()]),
                    "run_3.mp4" => Err(PoseError::VideoError("corrupt header".to_string())),
                    "walk_1.mp4" => Ok(vec![
                        red_frame(200),
                        Err(PoseError::ImageError("bad packet".to_string())),
                    ]),
                    _ => Ok(vec![gray_frame(), gray_frame()]),
                }
            },
        )
        .unwrap();

        assert_eq!(opened, vec!["run_1.mp4", "run_2.mp4", "run_3.mp4", "walk_1.mp4", "walk_2.mp4"]);
        assert_eq!(
            report.lines,
            vec!["run_1.mp4 is run", "run_2.mp4 is walk", "walk_1.mp4 is walk"]
        );
        assert_eq!(
            report.messages,
            vec![
                "Skipped 3. Image isn't in RGB format.",
                "Skipped run_3.mp4. corrupt header",
                "Skipped 2. Invalid image.",
                "Skipped walk_2.mp4. No valid images found for the \"predict\" class.",
            ]
        );
        // Skipped videos stay out of the total: 2 of 3, not 2 of 5.
        assert_eq!(format!("{:.2}", report.accuracy), "66.67");

        let summed = &report.predictions[0].probs.data;
        assert!((summed[0] - 1.9).abs() < 1e-6);
        assert!((summed[1] - 1.1).abs() < 1e-6);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_video_decoder_errors_other_than_open_failures_propagate() {
        let dir = temp_dir("videos_failing");
        fs::write(dir.join("run_1.mp4"), b"frames").unwrap();

        let catalog = ClassCatalog::new(["run", "walk"]).unwrap();
        let err = run_prediction_with_frames(
            &dir,
            PredictionMode::Video,
            &mut RedDetector,
            &mut ThresholdClassifier,
            &catalog,
            &PipelineConfig::default(),
            |_: &Path| Err(PoseError::IoError("disk gone".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, PoseError::IoError(_)));

        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(not(feature = "video"))]
    #[test]
    fn test_video_mode_requires_feature() {
        let dir = temp_dir("videos");
        fs::write(dir.join("run_1.mp4"), b"not a video").unwrap();

        let catalog = ClassCatalog::new(["run", "walk"]).unwrap();
        let err = run_prediction(
            &dir,
            PredictionMode::Video,
            &mut RedDetector,
            &mut ThresholdClassifier,
            &catalog,
            &PipelineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PoseError::FeatureNotEnabled(_)));

        let _ = fs::remove_dir_all(&dir);
    }
}
