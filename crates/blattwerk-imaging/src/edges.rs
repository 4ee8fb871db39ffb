// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge detection — Canny for binary edge maps, Sobel for raw gradients.

use blattwerk_core::types::EdgeMethod;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Image;
use imageproc::edges::canny;
use imageproc::gradients::horizontal_sobel;
use tracing::{debug, instrument};

/// Output of [`detect_edges`]. The two methods produce different sample
/// types: Canny a binary 0/255 map, Sobel a signed float gradient.
#[derive(Debug, Clone)]
pub enum EdgeMap {
    /// Binary edge map; edge pixels are 255, everything else 0.
    Binary(GrayImage),
    /// Horizontal-derivative gradient image.
    Gradient(Image<Luma<f32>>),
}

impl EdgeMap {
    /// Spatial dimensions of the map, whichever variant it is.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Binary(map) => map.dimensions(),
            Self::Gradient(map) => map.dimensions(),
        }
    }

    pub fn as_binary(&self) -> Option<&GrayImage> {
        match self {
            Self::Binary(map) => Some(map),
            Self::Gradient(_) => None,
        }
    }

    pub fn as_gradient(&self) -> Option<&Image<Luma<f32>>> {
        match self {
            Self::Gradient(map) => Some(map),
            Self::Binary(_) => None,
        }
    }
}

/// Detect edges in an image.
///
/// The input is converted to grayscale first. `Canny` runs the full
/// hysteresis detector and yields a binary map; `Sobel` convolves with the
/// horizontal Sobel kernel and yields the raw derivative as floats, sign
/// included.
#[instrument(skip(image))]
pub fn detect_edges(image: &DynamicImage, method: EdgeMethod) -> EdgeMap {
    let gray = image.to_luma8();

    match method {
        EdgeMethod::Canny {
            low_threshold,
            high_threshold,
        } => {
            debug!(low_threshold, high_threshold, "Running Canny detector");
            EdgeMap::Binary(canny(&gray, low_threshold, high_threshold))
        }
        EdgeMethod::Sobel => {
            let gradients = horizontal_sobel(&gray);
            let float = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
                Luma([gradients.get_pixel(x, y).0[0] as f32])
            });
            EdgeMap::Gradient(float)
        }
    }
}
