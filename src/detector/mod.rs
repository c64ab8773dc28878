// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint detection.
//!
//! [`KeypointDetector`] is the capability the extraction pipeline consumes:
//! given an image, return one [`Person`] with 17 keypoints. Detectors may keep
//! tracking state between calls; the `reset_crop_region` flag starts a new
//! tracking sequence.

mod crop;
mod movenet;

pub use crop::{CropRegion, determine_crop_region, init_crop_region};
pub use movenet::MoveNet;

use image::DynamicImage;

use crate::error::Result;
use crate::keypoint::Person;

/// A pose keypoint detector.
pub trait KeypointDetector {
    /// Detect the keypoints of a single person.
    ///
    /// # Arguments
    ///
    /// * `image` - The image to run detection on.
    /// * `reset_crop_region` - Start a new tracking sequence instead of reusing
    ///   the region of interest computed by the previous call.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    fn detect(&mut self, image: &DynamicImage, reset_crop_region: bool) -> Result<Person>;
}

impl<D: KeypointDetector + ?Sized> KeypointDetector for Box<D> {
    fn detect(&mut self, image: &DynamicImage, reset_crop_region: bool) -> Result<Person> {
        (**self).detect(image, reset_crop_region)
    }
}

impl<D: KeypointDetector + ?Sized> KeypointDetector for &mut D {
    fn detect(&mut self, image: &DynamicImage, reset_crop_region: bool) -> Result<Person> {
        (**self).detect(image, reset_crop_region)
    }
}

/// Run the detector `inference_count` times on the same image and keep the last result.
///
/// The first call resets the crop region; later calls refine it. A count of
/// zero still runs the detector once.
///
/// # Errors
///
/// Returns the first detector error.
pub fn detect_with_refinement<D: KeypointDetector + ?Sized>(
    detector: &mut D,
    image: &DynamicImage,
    inference_count: usize,
) -> Result<Person> {
    let mut person = detector.detect(image, true)?;
    for _ in 1..inference_count {
        person = detector.detect(image, false)?;
    }
    Ok(person)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::NUM_KEYPOINTS;

    /// Records reset flags and returns a person whose score encodes the call number.
    struct CountingDetector {
        resets: Vec<bool>,
    }

    impl KeypointDetector for CountingDetector {
        fn detect(&mut self, _image: &DynamicImage, reset_crop_region: bool) -> Result<Person> {
            self.resets.push(reset_crop_region);
            #[allow(clippy::cast_precision_loss)]
            let call = self.resets.len() as f32;
            Ok(Person::from_coordinates(&[[0.0, 0.0, call / 10.0]; NUM_KEYPOINTS]))
        }
    }

    #[test]
    fn test_refinement_resets_only_first_call() {
        let mut detector = CountingDetector { resets: Vec::new() };
        let image = DynamicImage::new_rgb8(8, 8);

        let person = detect_with_refinement(&mut detector, &image, 3).unwrap();

        assert_eq!(detector.resets, vec![true, false, false]);
        assert!((person.min_score() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_refinement_runs_at_least_once() {
        let mut detector = CountingDetector { resets: Vec::new() };
        let image = DynamicImage::new_rgb8(8, 8);

        detect_with_refinement(&mut detector, &image, 0).unwrap();
        assert_eq!(detector.resets, vec![true]);
    }

    #[test]
    fn test_boxed_detector() {
        let mut detector: Box<dyn KeypointDetector> =
            Box::new(CountingDetector { resets: Vec::new() });
        let image = DynamicImage::new_rgb8(8, 8);
        assert!(detect_with_refinement(&mut detector, &image, 2).is_ok());
    }
}
