// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color-space conversions. All three-channel buffers use the `Rgb<u8>`
// container; for HSV and LAB outputs the channels carry the converted
// samples in the 8-bit ranges documented on each function.

use image::{ImageBuffer, Rgb, RgbImage};
use lab::rgb_bytes_to_labs;

/// Convert an RGB image to 8-bit HSV.
///
/// Channel ranges follow the common 8-bit packing: H in [0, 180) (hue halved
/// so it fits a byte), S and V in [0, 255].
pub fn rgb_to_hsv(image: &RgbImage) -> RgbImage {
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        Rgb(pixel_rgb_to_hsv(image.get_pixel(x, y).0))
    })
}

/// Invert [`rgb_to_hsv`]: 8-bit HSV samples back to RGB.
pub fn hsv_to_rgb(image: &RgbImage) -> RgbImage {
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        Rgb(pixel_hsv_to_rgb(image.get_pixel(x, y).0))
    })
}

/// Convert an RGB image to 8-bit CIELAB.
///
/// L is rescaled from [0, 100] to [0, 255]; a and b are offset by +128 so
/// the neutral axis sits at 128.
pub fn rgb_to_lab(image: &RgbImage) -> RgbImage {
    let labs = rgb_bytes_to_labs(image.as_raw());
    let width = image.width();

    ImageBuffer::from_fn(width, image.height(), |x, y| {
        let lab = labs[(y * width + x) as usize];
        Rgb([
            quantize(lab.l * 255.0 / 100.0),
            quantize(lab.a + 128.0),
            quantize(lab.b + 128.0),
        ])
    })
}

fn quantize(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn pixel_rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;

    let v = max;
    let s = if max == 0 {
        0
    } else {
        (255.0 * delta / max as f32).round() as u8
    };

    if delta == 0.0 {
        return [0, s, v];
    }

    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let mut hue = if max == r {
        60.0 * (gf - bf) / delta
    } else if max == g {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    // Halve the hue so [0, 360) packs into a byte.
    let h = ((hue / 2.0).round() as u16 % 180) as u8;
    [h, s, v]
}

fn pixel_hsv_to_rgb([h, s, v]: [u8; 3]) -> [u8; 3] {
    if s == 0 {
        return [v, v, v];
    }

    let hue = h as f32 * 2.0;
    let sat = s as f32 / 255.0;
    let val = v as f32 / 255.0;

    let sector = (hue / 60.0).floor();
    let frac = hue / 60.0 - sector;
    let p = val * (1.0 - sat);
    let q = val * (1.0 - frac * sat);
    let t = val * (1.0 - (1.0 - frac) * sat);

    let (rf, gf, bf) = match sector as u32 % 6 {
        0 => (val, t, p),
        1 => (q, val, p),
        2 => (p, val, t),
        3 => (p, q, val),
        4 => (t, p, val),
        _ => (val, p, q),
    };

    [
        quantize(rf * 255.0),
        quantize(gf * 255.0),
        quantize(bf * 255.0),
    ]
}
