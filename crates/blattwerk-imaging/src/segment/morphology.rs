// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Morphological dilation with a filled square structuring element.
//
// The square window makes the operation separable: a sliding maximum over
// rows followed by one over columns is equivalent to the maximum over the
// full square. Each channel is dilated independently, so the operation works
// on binary masks, grayscale images, and color images alike.

use image::{DynamicImage, ImageBuffer, Pixel};
use tracing::instrument;

/// Dilate an image with a `kernel_size` x `kernel_size` square structuring
/// element. Lighter areas grow by up to half the kernel in each direction;
/// output shape equals input shape.
#[instrument(skip(image), fields(kernel_size))]
pub fn dilation(image: &DynamicImage, kernel_size: u32) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(img) => DynamicImage::ImageLuma8(dilate_buffer(img, kernel_size)),
        DynamicImage::ImageLumaA8(img) => {
            DynamicImage::ImageLumaA8(dilate_buffer(img, kernel_size))
        }
        DynamicImage::ImageRgb8(img) => DynamicImage::ImageRgb8(dilate_buffer(img, kernel_size)),
        DynamicImage::ImageRgba8(img) => DynamicImage::ImageRgba8(dilate_buffer(img, kernel_size)),
        other => DynamicImage::ImageRgb8(dilate_buffer(&other.to_rgb8(), kernel_size)),
    }
}

/// Per-channel sliding maximum, row pass then column pass.
///
/// The anchor sits at `kernel_size / 2`, so even kernel sides reach one
/// pixel further up-left than down-right. Samples outside the image are
/// ignored rather than padded.
fn dilate_buffer<P>(image: &ImageBuffer<P, Vec<u8>>, kernel_size: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    assert!(kernel_size > 0, "kernel size must be positive");

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let channels = P::CHANNEL_COUNT as usize;
    let reach_back = (kernel_size / 2) as i64;
    let reach_forward = (kernel_size - 1 - kernel_size / 2) as i64;

    let source = image.as_raw();
    let row_stride = width as usize * channels;

    // Row pass.
    let mut rows = vec![0u8; source.len()];
    for y in 0..height as usize {
        for x in 0..width as i64 {
            for c in 0..channels {
                let mut max = 0u8;
                for dx in -reach_back..=reach_forward {
                    let sx = x + dx;
                    if sx < 0 || sx >= width as i64 {
                        continue;
                    }
                    max = max.max(source[y * row_stride + sx as usize * channels + c]);
                }
                rows[y * row_stride + x as usize * channels + c] = max;
            }
        }
    }

    // Column pass.
    let mut output = vec![0u8; source.len()];
    for y in 0..height as i64 {
        for x in 0..width as usize {
            for c in 0..channels {
                let mut max = 0u8;
                for dy in -reach_back..=reach_forward {
                    let sy = y + dy;
                    if sy < 0 || sy >= height as i64 {
                        continue;
                    }
                    max = max.max(rows[sy as usize * row_stride + x * channels + c]);
                }
                output[y as usize * row_stride + x * channels + c] = max;
            }
        }
    }

    ImageBuffer::from_raw(width, height, output).expect("passes preserve buffer size")
}
