// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Segmentation primitives — binarization and morphological dilation.

pub mod morphology;

pub use morphology::dilation;

use blattwerk_core::types::ThresholdMethod;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use tracing::{debug, instrument};

/// Binarize an image to separate objects from the background.
///
/// The input is converted to grayscale first. `Otsu` picks one global
/// threshold from the histogram; `Adaptive` thresholds each pixel against
/// the mean of its surrounding block minus a constant offset, which copes
/// with uneven lighting. Output pixels are 0 or 255.
#[instrument(skip(image))]
pub fn apply_threshold(image: &DynamicImage, method: ThresholdMethod) -> GrayImage {
    let gray = image.to_luma8();

    match method {
        ThresholdMethod::Otsu => {
            let level = otsu_level(&gray);
            debug!(level, "Otsu threshold computed");
            threshold(&gray, level, ThresholdType::Binary)
        }
        ThresholdMethod::Adaptive { block_size, offset } => {
            adaptive_mean_threshold(&gray, block_size, offset)
        }
    }
}

/// Local-mean adaptive thresholding.
///
/// For each pixel the threshold is the mean intensity of the surrounding
/// `block_size` x `block_size` block (clamped to the image), minus `offset`.
/// `block_size` must be odd so the block centres on the pixel.
fn adaptive_mean_threshold(gray: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    assert!(block_size % 2 == 1, "block size must be odd");

    let (width, height) = gray.dimensions();
    let radius = block_size / 2;
    let integral = summed_area_table(gray);

    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let local_mean = block_mean(&integral, width, height, x, y, radius);
            let level = local_mean - offset as f64;
            let value = if gray.get_pixel(x, y).0[0] as f64 > level {
                255u8
            } else {
                0u8
            };
            output.put_pixel(x, y, Luma([value]));
        }
    }

    output
}

/// Summed-area table with a zero-padded border: entry `(x, y)` holds the sum
/// of all pixels in the rectangle below and left of (exclusive) `(x, y)`.
fn summed_area_table(gray: &GrayImage) -> Vec<u64> {
    let (width, height) = gray.dimensions();
    let stride = (width + 1) as usize;
    let mut table = vec![0u64; stride * (height + 1) as usize];

    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += gray.get_pixel(x, y).0[0] as u64;
            let here = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[here] = row_sum + table[above];
        }
    }

    table
}

/// Mean pixel value of the square block centred on `(cx, cy)`, clamped to
/// the image bounds.
fn block_mean(integral: &[u64], width: u32, height: u32, cx: u32, cy: u32, radius: u32) -> f64 {
    let stride = (width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = ((cx + radius + 1) as usize).min(width as usize);
    let y2 = ((cy + radius + 1) as usize).min(height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;

    // S = I[y2][x2] - I[y1][x2] - I[y2][x1] + I[y1][x1]
    let sum = integral[y2 * stride + x2] as f64 - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;

    sum / area
}
