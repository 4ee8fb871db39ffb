// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast enhancement — CLAHE on the lightness plane, linear contrast
// stretching, and kernel sharpening.

mod clahe;

use blattwerk_core::types::ClaheParams;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, LumaA, Pixel, Rgb, RgbImage, Rgba};
use imageproc::filter::filter3x3;
use lab::{labs_to_rgb_bytes, rgb_bytes_to_labs};
use tracing::{debug, instrument};

/// High-pass sharpening kernel: centre 5, four-neighbours -1, corners 0.
/// Weights sum to 1, so flat regions are left untouched.
const SHARPEN_KERNEL: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];

/// Enhance local contrast with CLAHE at the standard settings
/// (clip limit 2.0, 8x8 tile grid).
///
/// The image is taken through CIELAB, the lightness plane is equalized
/// adaptively, and the result is recomposed with the original chroma, so
/// colors shift as little as possible.
#[instrument(skip(image))]
pub fn contrast(image: &RgbImage) -> RgbImage {
    contrast_with(image, &ClaheParams::default())
}

/// [`contrast`] with an explicit clip limit and tile grid.
#[instrument(skip(image), fields(clip_limit = params.clip_limit, tile_grid = params.tile_grid))]
pub fn contrast_with(image: &RgbImage, params: &ClaheParams) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut labs = rgb_bytes_to_labs(image.as_raw());

    let plane = GrayImage::from_fn(width, height, |x, y| {
        let l = labs[(y * width + x) as usize].l;
        Luma([(l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8])
    });

    let equalized = clahe::equalize_adaptive(&plane, params.clip_limit, params.tile_grid);
    debug!("CLAHE pass complete");

    for (i, lab) in labs.iter_mut().enumerate() {
        let l8 = equalized.as_raw()[i];
        lab.l = l8 as f32 * 100.0 / 255.0;
    }

    let bytes = labs_to_rgb_bytes(&labs);
    RgbImage::from_raw(width, height, bytes).expect("conversion preserves buffer size")
}

/// Sharpen with the fixed 3x3 high-pass kernel. Output has the same shape
/// and sample type as the input.
#[instrument(skip(image))]
pub fn sharpen(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(img) => {
            DynamicImage::ImageLuma8(filter3x3::<Luma<u8>, i32, u8>(img, &SHARPEN_KERNEL))
        }
        DynamicImage::ImageLumaA8(img) => {
            DynamicImage::ImageLumaA8(filter3x3::<LumaA<u8>, i32, u8>(img, &SHARPEN_KERNEL))
        }
        DynamicImage::ImageRgb8(img) => {
            DynamicImage::ImageRgb8(filter3x3::<Rgb<u8>, i32, u8>(img, &SHARPEN_KERNEL))
        }
        DynamicImage::ImageRgba8(img) => {
            DynamicImage::ImageRgba8(filter3x3::<Rgba<u8>, i32, u8>(img, &SHARPEN_KERNEL))
        }
        other => {
            DynamicImage::ImageRgb8(filter3x3::<Rgb<u8>, i32, u8>(&other.to_rgb8(), &SHARPEN_KERNEL))
        }
    }
}

/// Rescale so the sample values span [0, 255].
///
/// The minimum and maximum are taken over every channel jointly (alpha
/// included for RGBA input). A constant image has zero range and maps to
/// all zeros.
#[instrument(skip(image))]
pub fn contrast_stretch(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(img) => DynamicImage::ImageLuma8(stretch_buffer(img)),
        DynamicImage::ImageLumaA8(img) => DynamicImage::ImageLumaA8(stretch_buffer(img)),
        DynamicImage::ImageRgb8(img) => DynamicImage::ImageRgb8(stretch_buffer(img)),
        DynamicImage::ImageRgba8(img) => DynamicImage::ImageRgba8(stretch_buffer(img)),
        other => DynamicImage::ImageRgb8(stretch_buffer(&other.to_rgb8())),
    }
}

fn stretch_buffer<P>(image: &ImageBuffer<P, Vec<u8>>) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let samples = image.as_raw();

    let mut low = u8::MAX;
    let mut high = u8::MIN;
    for &v in samples.iter() {
        low = low.min(v);
        high = high.max(v);
    }
    let (min, max) = (low as f32, high as f32);
    debug!(min, max, "Sample range before stretching");

    let mut lut = [0u8; 256];
    if max > min {
        let scale = 255.0 / (max - min);
        for (v, entry) in lut.iter_mut().enumerate() {
            *entry = ((v as f32 - min) * scale).round().clamp(0.0, 255.0) as u8;
        }
    }
    // Zero range: the lut stays all zeros, so constant images go to black.

    let data: Vec<u8> = samples.iter().map(|&v| lut[v as usize]).collect();
    ImageBuffer::from_raw(image.width(), image.height(), data)
        .expect("lut mapping preserves buffer size")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sharpen_twice_leaves_flat_image_unchanged() {
        let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([90, 140, 200])));
        let once = sharpen(&flat);
        let twice = sharpen(&once);
        assert_eq!(twice.to_rgb8().as_raw(), flat.to_rgb8().as_raw());
    }

    #[test]
    fn sharpen_boosts_a_step_edge() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(20, 20, |x, _| {
            Luma([if x < 10 { 50 } else { 200 }])
        }));
        let out = sharpen(&img).to_luma8();

        // Pixels adjacent to the edge overshoot; pixels well away from it
        // are untouched.
        assert!(out.get_pixel(9, 10).0[0] < 50);
        assert!(out.get_pixel(10, 10).0[0] > 200);
        assert_eq!(out.get_pixel(2, 10).0[0], 50);
        assert_eq!(out.get_pixel(17, 10).0[0], 200);
    }

    #[test]
    fn contrast_stretch_spans_full_range() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(16, 16, |x, y| {
            Luma([(40 + x * 4 + y) as u8])
        }));
        let out = contrast_stretch(&img).to_luma8();

        let min = out.pixels().map(|p| p.0[0]).min().unwrap();
        let max = out.pixels().map(|p| p.0[0]).max().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn contrast_stretch_of_constant_image_is_all_zero() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([128, 128, 128])));
        let out = contrast_stretch(&img);

        assert_eq!((out.width(), out.height()), (100, 100));
        assert!(out.to_rgb8().as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn contrast_stretch_preserves_sample_ordering() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(32, 1, |x, _| Luma([(60 + x) as u8])));
        let out = contrast_stretch(&img).to_luma8();
        for x in 1..32 {
            assert!(out.get_pixel(x, 0).0[0] >= out.get_pixel(x - 1, 0).0[0]);
        }
    }

    #[test]
    fn contrast_on_flat_image_is_nearly_identity() {
        let flat = RgbImage::from_pixel(256, 256, Rgb([128, 128, 128]));
        let out = contrast(&flat);

        assert_eq!(out.dimensions(), (256, 256));
        for pixel in out.pixels() {
            for c in 0..3 {
                let diff = (pixel.0[c] as i32 - 128).abs();
                assert!(diff <= 6, "flat gray moved to {:?}", pixel.0);
            }
        }
    }

    #[test]
    fn contrast_with_high_clip_expands_a_dull_image() {
        // A gray ramp squeezed into [100, 140): with a clip limit high
        // enough to disable clipping, the lightness plane equalizes fully.
        let img = RgbImage::from_fn(256, 256, |x, _| {
            let v = 100 + (x * 40 / 256) as u8;
            Rgb([v, v, v])
        });
        let out = contrast_with(
            &img,
            &ClaheParams {
                clip_limit: 64.0,
                tile_grid: 8,
            },
        );

        let luma = DynamicImage::ImageRgb8(out).to_luma8();
        let min = luma.pixels().map(|p| p.0[0]).min().unwrap();
        let max = luma.pixels().map(|p| p.0[0]).max().unwrap();
        assert!(
            max - min > 120,
            "expected the dull ramp to spread, got {min}..{max}"
        );
    }
}
