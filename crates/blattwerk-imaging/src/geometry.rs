// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometric transforms.

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::{debug, instrument};

/// Resize an image to exactly `width` x `height` with bilinear interpolation.
///
/// Aspect ratio is not preserved; pick the target dimensions accordingly.
#[instrument(skip(image), fields(width, height))]
pub fn resize_image(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    debug!(
        from_w = image.width(),
        from_h = image.height(),
        width,
        height,
        "Resizing image"
    );
    image.resize_exact(width, height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn resize_produces_exact_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([10, 20, 30])));

        let out = resize_image(&img, 100, 100);
        assert_eq!((out.width(), out.height()), (100, 100));

        let out = resize_image(&img, 7, 31);
        assert_eq!((out.width(), out.height()), (7, 31));
    }

    #[test]
    fn resize_ignores_aspect_ratio() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, Rgb([0, 0, 0])));
        let out = resize_image(&img, 50, 50);
        assert_eq!((out.width(), out.height()), (50, 50));
    }

    #[test]
    fn upscaling_a_constant_image_stays_constant() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([90, 120, 200])));
        let out = resize_image(&img, 25, 25).to_rgb8();
        for pixel in out.pixels() {
            assert_eq!(*pixel, Rgb([90, 120, 200]));
        }
    }
}
