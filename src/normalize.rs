// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Landmark normalization.
//!
//! Converts raw keypoint coordinates into an embedding that is invariant to
//! translation and overall body scale. The pose is centered on the hip
//! midpoint and divided by a pose size derived from the torso length and the
//! farthest keypoint.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, s};

use crate::error::{PoseError, Result};
use crate::keypoint::{BodyPart, NUM_KEYPOINTS, NUM_LANDMARK_VALUES};

/// Torso length multiplier used as the lower bound of the pose size.
pub const TORSO_SIZE_MULTIPLIER: f32 = 2.5;

/// Smallest pose size used as a divisor. Collapsed poses normalize to zeros.
pub const POSE_SIZE_EPSILON: f32 = 1e-6;

/// Midpoint of two body parts of one pose with shape (17, 2).
#[must_use]
pub fn center_point(pose: &ArrayView2<'_, f32>, left: BodyPart, right: BodyPart) -> [f32; 2] {
    let (l, r) = (left.index(), right.index());
    [
        pose[[l, 0]].mul_add(0.5, pose[[r, 0]] * 0.5),
        pose[[l, 1]].mul_add(0.5, pose[[r, 1]] * 0.5),
    ]
}

/// Pose size of one pose with shape (17, 2).
///
/// The maximum of the torso size times [`TORSO_SIZE_MULTIPLIER`] and the
/// largest distance from the hip center to any keypoint, floored at
/// [`POSE_SIZE_EPSILON`].
#[must_use]
pub fn pose_size(pose: &ArrayView2<'_, f32>) -> f32 {
    let hips = center_point(pose, BodyPart::LeftHip, BodyPart::RightHip);
    let shoulders = center_point(pose, BodyPart::LeftShoulder, BodyPart::RightShoulder);
    let torso_size = (shoulders[0] - hips[0]).hypot(shoulders[1] - hips[1]);

    let max_dist = pose
        .axis_iter(Axis(0))
        .map(|p| (p[0] - hips[0]).hypot(p[1] - hips[1]))
        .fold(0.0_f32, f32::max);

    (torso_size * TORSO_SIZE_MULTIPLIER)
        .max(max_dist)
        .max(POSE_SIZE_EPSILON)
}

/// Normalize a batch of poses with shape (batch, 17, 2).
///
/// Each pose is translated so its hip center sits at the origin, then divided
/// by its [`pose_size`].
///
/// # Errors
///
/// Returns `ShapeMismatch` if the input is not (batch, 17, 2).
pub fn normalize_pose_landmarks(landmarks: &ArrayView3<'_, f32>) -> Result<Array3<f32>> {
    let shape = landmarks.shape();
    if shape[1] != NUM_KEYPOINTS || shape[2] != 2 {
        return Err(PoseError::ShapeMismatch {
            expected: NUM_KEYPOINTS * 2,
            actual: shape[1] * shape[2],
        });
    }

    let mut out = landmarks.to_owned();
    for mut pose in out.axis_iter_mut(Axis(0)) {
        let center = center_point(&pose.view(), BodyPart::LeftHip, BodyPart::RightHip);
        for mut point in pose.axis_iter_mut(Axis(0)) {
            point[0] -= center[0];
            point[1] -= center[1];
        }
        let size = pose_size(&pose.view());
        pose.mapv_inplace(|v| v / size);
    }
    Ok(out)
}

/// Turn raw landmark rows with shape (batch, 51) into embeddings with shape (batch, 34).
///
/// The score columns are dropped; the remaining `x, y` pairs are normalized
/// and flattened in body part order.
///
/// # Errors
///
/// Returns `ShapeMismatch` if rows do not have 51 values.
pub fn landmarks_to_embedding(rows: &ArrayView2<'_, f32>) -> Result<Array2<f32>> {
    let (batch, width) = rows.dim();
    if width != NUM_LANDMARK_VALUES {
        return Err(PoseError::ShapeMismatch {
            expected: NUM_LANDMARK_VALUES,
            actual: width,
        });
    }

    let reshaped = rows
        .to_owned()
        .into_shape_with_order((batch, NUM_KEYPOINTS, 3))
        .map_err(|e| PoseError::InferenceError(format!("Failed to reshape landmarks: {e}")))?;
    let coords = reshaped.slice(s![.., .., 0..2]);
    let normalized = normalize_pose_landmarks(&coords)?;

    normalized
        .as_standard_layout()
        .to_owned()
        .into_shape_with_order((batch, NUM_KEYPOINTS * 2))
        .map_err(|e| PoseError::InferenceError(format!("Failed to flatten embedding: {e}")))
}
