// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for the keypoint detector.
//!
//! MoveNet runs on a square crop of the frame. The crop region is expressed in
//! normalized image coordinates and may extend past the image borders, in
//! which case the missing area is padded with black before resizing.

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;

use crate::detector::CropRegion;
use crate::error::{PoseError, Result};

/// Crop `image` to `region`, pad whatever falls outside the image, and resize
/// to a `size` x `size` RGB image.
///
/// # Errors
///
/// Returns `ImageError` if the crop is empty or resizing fails.
pub fn crop_and_resize(image: &DynamicImage, region: &CropRegion, size: u32) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    let (w, h) = (width as f32, height as f32);

    let crop_top = if region.y_min < 0.0 { 0 } else { (region.y_min * h) as u32 };
    let crop_bottom = if region.y_max >= 1.0 { height } else { (region.y_max * h) as u32 };
    let crop_left = if region.x_min < 0.0 { 0 } else { (region.x_min * w) as u32 };
    let crop_right = if region.x_max >= 1.0 { width } else { (region.x_max * w) as u32 };

    let pad_top = if region.y_min < 0.0 { (-region.y_min * h) as u32 } else { 0 };
    let pad_bottom = if region.y_max >= 1.0 { ((region.y_max - 1.0) * h) as u32 } else { 0 };
    let pad_left = if region.x_min < 0.0 { (-region.x_min * w) as u32 } else { 0 };
    let pad_right = if region.x_max >= 1.0 { ((region.x_max - 1.0) * w) as u32 } else { 0 };

    let crop_w = crop_right.saturating_sub(crop_left);
    let crop_h = crop_bottom.saturating_sub(crop_top);
    let out_w = crop_w + pad_left + pad_right;
    let out_h = crop_h + pad_top + pad_bottom;
    if out_w == 0 || out_h == 0 {
        return Err(PoseError::ImageError(format!(
            "Empty crop region {region:?} for {width}x{height} image"
        )));
    }

    let src_rgb = image.to_rgb8();
    let cropped = image::imageops::crop_imm(&src_rgb, crop_left, crop_top, crop_w, crop_h).to_image();
    let mut padded = RgbImage::new(out_w, out_h);
    image::imageops::replace(&mut padded, &cropped, i64::from(pad_left), i64::from(pad_top));

    resize_rgb(padded, size, size)
}

/// Bilinear resize of an RGB image.
fn resize_rgb(src: RgbImage, dst_w: u32, dst_h: u32) -> Result<RgbImage> {
    let (src_w, src_h) = src.dimensions();
    if (src_w, src_h) == (dst_w, dst_h) {
        return Ok(src);
    }

    let src_image = Image::from_vec_u8(src_w, src_h, src.into_raw(), PixelType::U8x3)
        .map_err(|e| PoseError::ImageError(format!("Failed to create source image: {e}")))?;
    let mut dst_image = Image::new(dst_w, dst_h, PixelType::U8x3);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| PoseError::ImageError(format!("Failed to resize image: {e}")))?;

    RgbImage::from_raw(dst_w, dst_h, dst_image.into_vec())
        .ok_or_else(|| PoseError::ImageError("Failed to create resized buffer".to_string()))
}

/// Convert an RGB image to an NHWC tensor with shape (1, H, W, 3) holding raw 0-255 values.
#[must_use]
pub fn image_to_nhwc(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array4::zeros((1, height as usize, width as usize, 3));
    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = f32::from(pixel[c]);
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_crop_inside_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([200, 10, 10])));
        let region = CropRegion {
            y_min: 0.0,
            x_min: 0.25,
            y_max: 1.0,
            x_max: 0.75,
        };
        let out = crop_and_resize(&img, &region, 32).unwrap();
        assert_eq!(out.dimensions(), (32, 32));
        assert_eq!(out.get_pixel(16, 16), &Rgb([200, 10, 10]));
    }

    #[test]
    fn test_crop_pads_outside_image() {
        // Wide image: the square crop spans the full width and overflows vertically.
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([255, 255, 255])));
        let region = CropRegion {
            y_min: -0.5,
            x_min: 0.0,
            y_max: 1.5,
            x_max: 1.0,
        };
        let out = crop_and_resize(&img, &region, 100).unwrap();
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out.get_pixel(50, 2), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(50, 50), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(50, 97), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_image_to_nhwc() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(1, 0, Rgb([1, 2, 3]));
        let tensor = image_to_nhwc(&img);
        assert_eq!(tensor.shape(), &[1, 1, 2, 3]);
        assert!((tensor[[0, 0, 1, 2]] - 3.0).abs() < f32::EPSILON);
        assert!(tensor[[0, 0, 0, 0]].abs() < f32::EPSILON);
    }
}
