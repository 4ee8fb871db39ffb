// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Non-local-means denoising.
//
// The image is split into CIELAB planes; the lightness plane is filtered
// with `luma_strength` and the two chroma planes with `chroma_strength`.
// For every pixel, patches inside the search window are compared against the
// patch around the pixel, and similar patches contribute their centre value
// with an exponential weight in the squared patch distance.

use blattwerk_core::types::DenoiseParams;
use image::RgbImage;
use lab::{Lab, labs_to_rgb_bytes, rgb_bytes_to_labs};
use tracing::{debug, instrument};

/// Reduce noise with non-local-means averaging.
#[instrument(skip(image, params))]
pub fn reduce_noise(image: &RgbImage, params: &DenoiseParams) -> RgbImage {
    let (width, height) = image.dimensions();
    let labs = rgb_bytes_to_labs(image.as_raw());

    let mut l_plane = Vec::with_capacity(labs.len());
    let mut a_plane = Vec::with_capacity(labs.len());
    let mut b_plane = Vec::with_capacity(labs.len());
    for lab in &labs {
        l_plane.push((lab.l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8);
        a_plane.push((lab.a + 128.0).round().clamp(0.0, 255.0) as u8);
        b_plane.push((lab.b + 128.0).round().clamp(0.0, 255.0) as u8);
    }

    debug!(
        luma_strength = params.luma_strength,
        chroma_strength = params.chroma_strength,
        template_window = params.template_window,
        search_window = params.search_window,
        "Filtering CIELAB planes"
    );

    let l_out = nl_means_plane(&l_plane, width, height, params.luma_strength, params);
    let a_out = nl_means_plane(&a_plane, width, height, params.chroma_strength, params);
    let b_out = nl_means_plane(&b_plane, width, height, params.chroma_strength, params);

    let denoised: Vec<Lab> = (0..labs.len())
        .map(|i| Lab {
            l: l_out[i] as f32 * 100.0 / 255.0,
            a: a_out[i] as f32 - 128.0,
            b: b_out[i] as f32 - 128.0,
        })
        .collect();

    let bytes = labs_to_rgb_bytes(&denoised);
    RgbImage::from_raw(width, height, bytes).expect("conversion preserves buffer size")
}

/// Non-local-means on a single 8-bit plane.
fn nl_means_plane(
    plane: &[u8],
    width: u32,
    height: u32,
    strength: f32,
    params: &DenoiseParams,
) -> Vec<u8> {
    assert!(strength > 0.0, "filter strength must be positive");

    let w = width as i64;
    let h = height as i64;
    let template_radius = (params.template_window / 2) as i64;
    let search_radius = (params.search_window / 2) as i64;
    let patch_len = ((2 * template_radius + 1) * (2 * template_radius + 1)) as f32;
    let inv_h2 = 1.0 / (strength * strength);

    let mut output = Vec::with_capacity(plane.len());
    for y in 0..h {
        for x in 0..w {
            let mut weight_sum = 0.0f32;
            let mut value_sum = 0.0f32;

            for dy in -search_radius..=search_radius {
                for dx in -search_radius..=search_radius {
                    let cx = x + dx;
                    let cy = y + dy;

                    let mut distance = 0.0f32;
                    for py in -template_radius..=template_radius {
                        for px in -template_radius..=template_radius {
                            let diff = sample(plane, w, h, x + px, y + py)
                                - sample(plane, w, h, cx + px, cy + py);
                            distance += diff * diff;
                        }
                    }
                    distance /= patch_len;

                    let weight = (-distance * inv_h2).exp();
                    weight_sum += weight;
                    value_sum += weight * sample(plane, w, h, cx, cy);
                }
            }

            output.push((value_sum / weight_sum).round().clamp(0.0, 255.0) as u8);
        }
    }

    output
}

/// Border-replicating plane access.
fn sample(plane: &[u8], width: i64, height: i64, x: i64, y: i64) -> f32 {
    let cx = x.clamp(0, width - 1);
    let cy = y.clamp(0, height - 1);
    plane[(cy * width + cx) as usize] as f32
}
