// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Body keypoints and detected persons.
//!
//! The 17 keypoints follow the COCO ordering used by MoveNet. The same
//! [`BodyPart`] ordering is shared by detector output, the normalizer and the
//! landmark table schema.

use std::fmt;

/// Number of keypoints per detected person.
pub const NUM_KEYPOINTS: usize = 17;

/// Number of flattened landmark values per person (x, y, score per keypoint).
pub const NUM_LANDMARK_VALUES: usize = NUM_KEYPOINTS * 3;

/// Minimum keypoint score counted towards the overall person score.
const PERSON_SCORE_KEYPOINT_THRESHOLD: f32 = 0.1;

/// Body part identity of a keypoint, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyPart {
    /// All body parts in index order.
    pub const ALL: [Self; NUM_KEYPOINTS] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Index of this part in model output and table order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Column name prefix used in landmark table headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "NOSE",
            Self::LeftEye => "LEFT_EYE",
            Self::RightEye => "RIGHT_EYE",
            Self::LeftEar => "LEFT_EAR",
            Self::RightEar => "RIGHT_EAR",
            Self::LeftShoulder => "LEFT_SHOULDER",
            Self::RightShoulder => "RIGHT_SHOULDER",
            Self::LeftElbow => "LEFT_ELBOW",
            Self::RightElbow => "RIGHT_ELBOW",
            Self::LeftWrist => "LEFT_WRIST",
            Self::RightWrist => "RIGHT_WRIST",
            Self::LeftHip => "LEFT_HIP",
            Self::RightHip => "RIGHT_HIP",
            Self::LeftKnee => "LEFT_KNEE",
            Self::RightKnee => "RIGHT_KNEE",
            Self::LeftAnkle => "LEFT_ANKLE",
            Self::RightAnkle => "RIGHT_ANKLE",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected keypoint in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Body part this keypoint belongs to.
    pub part: BodyPart,
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
    /// Detection confidence in `[0, 1]`.
    pub score: f32,
}

impl Keypoint {
    /// Create a new keypoint.
    #[must_use]
    pub const fn new(part: BodyPart, x: f32, y: f32, score: f32) -> Self {
        Self { part, x, y, score }
    }
}

/// Axis-aligned box spanning all keypoints of a person.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    /// Minimum x.
    pub x_min: f32,
    /// Minimum y.
    pub y_min: f32,
    /// Maximum x.
    pub x_max: f32,
    /// Maximum y.
    pub y_max: f32,
}

/// One detected person: 17 keypoints in [`BodyPart`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// Keypoints indexed by [`BodyPart::index`].
    pub keypoints: [Keypoint; NUM_KEYPOINTS],
    /// Box spanning all keypoints.
    pub bounding_box: BoundingBox,
    /// Mean score of the keypoints above 0.1, or 0 when there are none.
    pub score: f32,
}

impl Person {
    /// Build a person from `(x, y, score)` triples in body part order.
    ///
    /// The bounding box and the overall score are derived from the keypoints.
    #[must_use]
    pub fn from_coordinates(coords: &[[f32; 3]; NUM_KEYPOINTS]) -> Self {
        let keypoints: [Keypoint; NUM_KEYPOINTS] = std::array::from_fn(|i| {
            let [x, y, score] = coords[i];
            Keypoint::new(BodyPart::ALL[i], x, y, score)
        });

        let bounding_box = keypoints.iter().fold(
            BoundingBox {
                x_min: f32::INFINITY,
                y_min: f32::INFINITY,
                x_max: f32::NEG_INFINITY,
                y_max: f32::NEG_INFINITY,
            },
            |b, kp| BoundingBox {
                x_min: b.x_min.min(kp.x),
                y_min: b.y_min.min(kp.y),
                x_max: b.x_max.max(kp.x),
                y_max: b.y_max.max(kp.y),
            },
        );

        let confident: Vec<f32> = keypoints
            .iter()
            .map(|kp| kp.score)
            .filter(|&s| s > PERSON_SCORE_KEYPOINT_THRESHOLD)
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let score = if confident.is_empty() {
            0.0
        } else {
            confident.iter().sum::<f32>() / confident.len() as f32
        };

        Self {
            keypoints,
            bounding_box,
            score,
        }
    }

    /// Keypoint of the given body part.
    #[must_use]
    pub const fn keypoint(&self, part: BodyPart) -> &Keypoint {
        &self.keypoints[part.index()]
    }

    /// Lowest keypoint score.
    #[must_use]
    pub fn min_score(&self) -> f32 {
        self.keypoints
            .iter()
            .map(|kp| kp.score)
            .fold(f32::INFINITY, f32::min)
    }

    /// Whether every one of the 17 keypoints scores at least `threshold`.
    ///
    /// NaN scores never pass.
    #[must_use]
    pub fn all_scores_at_least(&self, threshold: f32) -> bool {
        self.keypoints.iter().all(|kp| kp.score >= threshold)
    }

    /// Flatten to 51 values: `x, y, score` per keypoint in body part order.
    #[must_use]
    pub fn to_landmarks(&self) -> [f32; NUM_LANDMARK_VALUES] {
        let mut out = [0.0; NUM_LANDMARK_VALUES];
        for (i, kp) in self.keypoints.iter().enumerate() {
            out[i * 3] = kp.x;
            out[i * 3 + 1] = kp.y;
            out[i * 3 + 2] = kp.score;
        }
        out
    }
}
