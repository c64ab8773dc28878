// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! End-to-end tests for the pose-action pipeline.
//!
//! A scripted detector reads the pose out of the image colors: red above 127
//! means arms raised, green is the score of every keypoint. The classifier is
//! a single softmax layer that only looks at the wrist heights.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use ndarray::{Array1, Array2, array};

use pose_action::aggregate::{accuracy, video_label};
use pose_action::classifier::{Activation, DenseLayer, EMBEDDING_SIZE};
use pose_action::keypoint::NUM_KEYPOINTS;
use pose_action::{
    ActionClassifier, BodyPart, ClassCatalog, KeypointDetector, LandmarkTable, MlpClassifier,
    Person, PipelineConfig, PoseError, PoseExtractor, PredictionMode, Result, run_prediction,
};

struct ScriptedDetector {
    calls: usize,
}

impl ScriptedDetector {
    const fn new() -> Self {
        Self { calls: 0 }
    }
}

fn standing_pose(arms_up: bool, score: f32) -> Person {
    let wrist_y = if arms_up { 5.0 } else { 90.0 };
    let mut coords = [[50.0, 15.0, score]; NUM_KEYPOINTS];
    let mut set = |part: BodyPart, x: f32, y: f32| coords[part.index()] = [x, y, score];
    set(BodyPart::LeftShoulder, 43.0, 30.0);
    set(BodyPart::RightShoulder, 57.0, 30.0);
    set(BodyPart::LeftElbow, 40.0, 45.0);
    set(BodyPart::RightElbow, 60.0, 45.0);
    set(BodyPart::LeftWrist, 40.0, wrist_y);
    set(BodyPart::RightWrist, 60.0, wrist_y);
    set(BodyPart::LeftHip, 45.0, 60.0);
    set(BodyPart::RightHip, 55.0, 60.0);
    set(BodyPart::LeftKnee, 45.0, 80.0);
    set(BodyPart::RightKnee, 55.0, 80.0);
    set(BodyPart::LeftAnkle, 45.0, 100.0);
    set(BodyPart::RightAnkle, 55.0, 100.0);
    Person::from_coordinates(&coords)
}

impl KeypointDetector for ScriptedDetector {
    fn detect(&mut self, image: &DynamicImage, _reset_crop_region: bool) -> Result<Person> {
        self.calls += 1;
        let pixel = *image.to_rgb8().get_pixel(0, 0);
        Ok(standing_pose(pixel[0] > 127, f32::from(pixel[1]) / 255.0))
    }
}

/// Class 0 "rest" for lowered wrists, class 1 "wave" for raised wrists.
fn wrist_classifier() -> MlpClassifier {
    let mut weights = Array2::zeros((EMBEDDING_SIZE, 2));
    for part in [BodyPart::LeftWrist, BodyPart::RightWrist] {
        let y = part.index() * 2 + 1;
        weights[[y, 0]] = 10.0;
        weights[[y, 1]] = -10.0;
    }
    let layer = DenseLayer::new(weights, Array1::zeros(2), Activation::Softmax).unwrap();
    MlpClassifier::from_layers(vec![layer]).unwrap()
}

fn catalog() -> ClassCatalog {
    ClassCatalog::new(["rest", "wave"]).unwrap()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pose_action_it_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_image(path: &Path, arms_up: bool, green: u8) {
    let red = if arms_up { 255 } else { 0 };
    RgbImage::from_pixel(8, 8, Rgb([red, green, 0])).save(path).unwrap();
}

fn frame(arms_up: bool, green: u8) -> Result<DynamicImage> {
    let red = if arms_up { 255 } else { 0 };
    Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([red, green, 0]))))
}

#[test]
fn test_dataset_extraction_to_classification() {
    let root = temp_dir("dataset");
    fs::create_dir_all(root.join("rest")).unwrap();
    fs::create_dir_all(root.join("wave")).unwrap();
    write_image(&root.join("rest").join("r1.png"), false, 255);
    write_image(&root.join("rest").join("r2.png"), false, 200);
    write_image(&root.join("wave").join("w1.png"), true, 230);
    write_image(&root.join("wave").join("w2.png"), true, 20);
    let csv = root.join("train.csv");
    let labels = root.join("labels.txt");

    let mut extractor = PoseExtractor::new(ScriptedDetector::new(), PipelineConfig::default());
    let result = extractor.extract_labeled_dataset(&root, Some(&csv)).unwrap();
    assert_eq!(extractor.into_detector().calls, 3 * 4);

    assert_eq!(result.table.len(), 3);
    assert_eq!(result.messages.len(), 1);
    assert!(result.messages[0].ends_with("w2.png. No pose was confidently detected."));
    result.catalog.write(&labels).unwrap();

    let table = LandmarkTable::read_csv(&csv).unwrap();
    let catalog = ClassCatalog::read(&labels).unwrap();
    assert_eq!(catalog, self::catalog());

    let mut classifier = wrist_classifier();
    let probs = classifier.predict_table(&table).unwrap();
    let predicted: Vec<&str> = probs
        .rows()
        .into_iter()
        .map(|row| {
            let idx = if row[1] > row[0] { 1 } else { 0 };
            catalog.get(idx).unwrap()
        })
        .collect();
    let truth: Vec<&str> = table.iter().map(|r| r.class_name.as_str()).collect();
    assert_eq!(truth, vec!["rest", "rest", "wave"]);
    assert!((accuracy(&predicted, &truth) - 100.0).abs() < 1e-9);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_image_folder_prediction() {
    let dir = temp_dir("predict");
    write_image(&dir.join("rest_1.png"), false, 255);
    write_image(&dir.join("wave_1.png"), true, 255);
    write_image(&dir.join("wave_2.png"), false, 255);
    write_image(&dir.join("wave_3.png"), true, 30);

    let report = run_prediction(
        &dir,
        PredictionMode::Image,
        &mut ScriptedDetector::new(),
        &mut wrist_classifier(),
        &catalog(),
        &PipelineConfig::default(),
    )
    .unwrap();

    assert_eq!(
        report.lines,
        vec!["rest_1.png is rest", "wave_1.png is wave", "wave_2.png is rest"]
    );
    assert_eq!(report.messages.len(), 1);
    assert_eq!(format!("{:.2}", report.accuracy), "66.67");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_image_folder_without_poses() {
    let dir = temp_dir("no_pose");
    write_image(&dir.join("wave_1.png"), true, 10);

    let err = run_prediction(
        &dir,
        PredictionMode::Image,
        &mut ScriptedDetector::new(),
        &mut wrist_classifier(),
        &catalog(),
        &PipelineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PoseError::NoValidData(_)));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_video_frames_soft_vote() {
    let frames = vec![
        frame(true, 255),
        frame(true, 255),
        frame(false, 255),
        frame(true, 5),
    ];

    let mut extractor = PoseExtractor::new(
        ScriptedDetector::new(),
        PipelineConfig::default().with_inference_count(1),
    );
    let extraction = extractor.extract_from_video_frames(frames).unwrap();
    assert_eq!(extraction.table.len(), 3);
    assert_eq!(extraction.messages, vec!["Skipped 4. No pose was confidently detected."]);

    let mut classifier = wrist_classifier();
    let frame_probs = classifier.predict_table(&extraction.table).unwrap();
    let (label, summed) = video_label(&frame_probs.view(), &catalog()).unwrap();
    assert_eq!(label, "wave");
    assert!((summed.data.sum() - 3.0).abs() < 1e-4);
}

#[test]
fn test_soft_vote_sums_frames() {
    let frames = array![[0.1_f32, 0.9], [0.2, 0.8], [0.9, 0.1]];
    let (label, summed) = video_label(&frames.view(), &ClassCatalog::new(["a", "b"]).unwrap()).unwrap();
    assert_eq!(label, "b");
    assert!((summed.data[0] - 1.2).abs() < 1e-6);
    assert!((summed.data[1] - 1.8).abs() < 1e-6);
}

#[test]
fn test_threshold_is_inclusive() {
    let person = standing_pose(true, 0.3);
    assert!(person.all_scores_at_least(0.3));
    assert!(!person.all_scores_at_least(0.31));
}

#[test]
fn test_classifier_rejects_embedding_input() {
    let mut classifier = wrist_classifier();
    let err = classifier.predict(&[0.0; 34]).unwrap_err();
    assert!(matches!(
        err,
        PoseError::ShapeMismatch {
            expected: 51,
            actual: 34
        }
    ));
}

#[test]
fn test_classifier_ignores_translation_and_scale() {
    let mut classifier = wrist_classifier();
    let base = standing_pose(true, 0.9).to_landmarks();
    let mut moved = base;
    for i in 0..NUM_KEYPOINTS {
        moved[i * 3] = base[i * 3].mul_add(3.0, 40.0);
        moved[i * 3 + 1] = base[i * 3 + 1].mul_add(3.0, -25.0);
    }

    let a = classifier.predict(&base).unwrap();
    let b = classifier.predict(&moved).unwrap();
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).abs() < 1e-4);
    }
}
