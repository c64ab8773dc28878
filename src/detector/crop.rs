// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! MoveNet crop-region tracking.
//!
//! Each detection sees a square crop around the previously detected body
//! instead of the whole frame. Regions are in normalized image coordinates
//! and may extend past `[0, 1]`.

use crate::keypoint::{BodyPart, NUM_KEYPOINTS};

/// Keypoints scoring at or below this value are ignored when sizing the crop.
const MIN_CROP_KEYPOINT_SCORE: f32 = 0.2;

/// Expansion of the torso extent when sizing the crop.
const TORSO_EXPANSION_RATIO: f32 = 1.9;

/// Expansion of the full-body extent when sizing the crop.
const BODY_EXPANSION_RATIO: f32 = 1.2;

const TORSO_JOINTS: [BodyPart; 4] = [
    BodyPart::LeftShoulder,
    BodyPart::RightShoulder,
    BodyPart::LeftHip,
    BodyPart::RightHip,
];

/// Region of interest in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub y_min: f32,
    pub x_min: f32,
    pub y_max: f32,
    pub x_max: f32,
}

impl CropRegion {
    /// Normalized height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Normalized width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }
}

/// Square region centered on the image, padded along the shorter side.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn init_crop_region(image_height: u32, image_width: u32) -> CropRegion {
    let (h, w) = (image_height as f32, image_width as f32);
    if w > h {
        let box_height = w / h;
        let y_min = (h / 2.0 - w / 2.0) / h;
        CropRegion {
            y_min,
            x_min: 0.0,
            y_max: y_min + box_height,
            x_max: 1.0,
        }
    } else {
        let box_width = h / w;
        let x_min = (w / 2.0 - h / 2.0) / w;
        CropRegion {
            y_min: 0.0,
            x_min,
            y_max: 1.0,
            x_max: x_min + box_width,
        }
    }
}

/// Whether enough of the torso is visible to center a crop on it.
fn torso_visible(keypoints: &[[f32; 3]; NUM_KEYPOINTS]) -> bool {
    let score = |part: BodyPart| keypoints[part.index()][2];
    (score(BodyPart::LeftHip) > MIN_CROP_KEYPOINT_SCORE
        || score(BodyPart::RightHip) > MIN_CROP_KEYPOINT_SCORE)
        && (score(BodyPart::LeftShoulder) > MIN_CROP_KEYPOINT_SCORE
            || score(BodyPart::RightShoulder) > MIN_CROP_KEYPOINT_SCORE)
}

/// Compute the next crop region from keypoints of the previous detection.
///
/// `keypoints` are `(y, x, score)` triples normalized to the full image. The
/// crop is centered on the hip midpoint and sized to cover the torso and all
/// confident joints. Falls back to [`init_crop_region`] when the torso is not
/// visible or the crop would exceed the image.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn determine_crop_region(
    keypoints: &[[f32; 3]; NUM_KEYPOINTS],
    image_height: u32,
    image_width: u32,
) -> CropRegion {
    if !torso_visible(keypoints) {
        return init_crop_region(image_height, image_width);
    }

    let (h, w) = (image_height as f32, image_width as f32);
    let pixel = |part: usize| (keypoints[part][0] * h, keypoints[part][1] * w);

    let (ly, lx) = pixel(BodyPart::LeftHip.index());
    let (ry, rx) = pixel(BodyPart::RightHip.index());
    let center_y = (ly + ry) / 2.0;
    let center_x = (lx + rx) / 2.0;

    let (mut torso_y, mut torso_x) = (0.0_f32, 0.0_f32);
    for part in TORSO_JOINTS {
        let (y, x) = pixel(part.index());
        torso_y = torso_y.max((center_y - y).abs());
        torso_x = torso_x.max((center_x - x).abs());
    }

    let (mut body_y, mut body_x) = (0.0_f32, 0.0_f32);
    for (i, kp) in keypoints.iter().enumerate() {
        if kp[2] < MIN_CROP_KEYPOINT_SCORE {
            continue;
        }
        let (y, x) = pixel(i);
        body_y = body_y.max((center_y - y).abs());
        body_x = body_x.max((center_x - x).abs());
    }

    let mut half = (torso_x * TORSO_EXPANSION_RATIO)
        .max(torso_y * TORSO_EXPANSION_RATIO)
        .max(body_y * BODY_EXPANSION_RATIO)
        .max(body_x * BODY_EXPANSION_RATIO);

    let max_border_distance = center_x.max(w - center_x).max(center_y).max(h - center_y);
    half = half.min(max_border_distance);

    if half > w.max(h) / 2.0 {
        return init_crop_region(image_height, image_width);
    }

    let length = half * 2.0;
    let corner_y = center_y - half;
    let corner_x = center_x - half;
    CropRegion {
        y_min: corner_y / h,
        x_min: corner_x / w,
        y_max: (corner_y + length) / h,
        x_max: (corner_x + length) / w,
    }
}
