// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Media input handling.
//!
//! Directory listing for image folders and dataset roots, and video frame
//! decoding (behind the `video` feature).

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{PoseError, Result};

/// Whether a path's final component starts with a dot.
#[must_use]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

/// List the non-hidden entries of a directory in alphabetical order.
///
/// Both files and subdirectories are returned.
///
/// # Errors
///
/// Returns `IoError` if `dir` is not a readable directory.
pub fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PoseError::IoError(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| PoseError::IoError(format!("Failed to list {}: {e}", dir.display())))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| !is_hidden(path))
        .collect();

    paths.sort();
    Ok(paths)
}

/// List the non-hidden subdirectories of a directory in alphabetical order.
///
/// # Errors
///
/// Returns `IoError` if `dir` is not a readable directory.
pub fn list_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_entries(dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect())
}

#[cfg(feature = "video")]
static VIDEO_INIT: std::sync::Once = std::sync::Once::new();

/// Decode every frame of a video file.
///
/// Each entry is one frame in playback order; a frame that can't be converted
/// to an RGB image is kept as an error so callers can report it by position.
/// The decoder is closed before this function returns.
///
/// # Errors
///
/// Returns `VideoError` if the file can't be opened, or `FeatureNotEnabled`
/// when built without the `video` feature.
#[cfg(feature = "video")]
pub fn read_video_frames(path: &Path) -> Result<Vec<Result<DynamicImage>>> {
    VIDEO_INIT.call_once(|| {
        if let Err(e) = video_rs::init() {
            eprintln!("Failed to initialize video-rs: {e}");
        }
    });

    let mut decoder = video_rs::decode::Decoder::new(path).map_err(|e| {
        PoseError::VideoError(format!("Failed to open {}: {e}", path.display()))
    })?;

    let mut frames = Vec::new();
    // Any decode error ends the stream; end of file surfaces the same way.
    while let Ok((_ts, frame)) = decoder.decode() {
        frames.push(video_frame_to_image(&frame));
    }
    drop(decoder);

    Ok(frames)
}

/// Decode every frame of a video file.
///
/// # Errors
///
/// Always returns `FeatureNotEnabled`; rebuild with `--features video`.
#[cfg(not(feature = "video"))]
pub fn read_video_frames(path: &Path) -> Result<Vec<Result<DynamicImage>>> {
    Err(PoseError::FeatureNotEnabled(format!(
        "Decoding {} requires the 'video' feature",
        path.display()
    )))
}

/// Convert a `video_rs` HWC frame to a `DynamicImage`.
#[cfg(feature = "video")]
fn video_frame_to_image(arr: &video_rs::Frame) -> Result<DynamicImage> {
    let shape = arr.shape();
    if shape.len() != 3 || shape[2] != 3 {
        return Err(PoseError::ImageError(format!(
            "Unexpected video frame shape {shape:?}"
        )));
    }
    let height = u32::try_from(shape[0])
        .map_err(|_| PoseError::ImageError("Frame height exceeds u32::MAX".to_string()))?;
    let width = u32::try_from(shape[1])
        .map_err(|_| PoseError::ImageError("Frame width exceeds u32::MAX".to_string()))?;

    let rgb_data: Vec<u8> = arr.iter().copied().collect();
    let buffer = image::RgbImage::from_raw(width, height, rgb_data).ok_or_else(|| {
        PoseError::ImageError("Failed to create image from video frame".to_string())
    })?;

    Ok(DynamicImage::ImageRgb8(buffer))
}
