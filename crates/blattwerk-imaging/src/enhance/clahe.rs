// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast-limited adaptive histogram equalization on a single 8-bit plane.
//
// The plane is divided into a grid of tiles. Each tile gets a clipped
// histogram (excess mass redistributed uniformly) whose CDF becomes a
// 256-entry lookup table; pixels are then mapped by bilinear interpolation
// between the four surrounding tile LUTs, which hides the tile seams.

use image::GrayImage;

/// One remapping table per tile.
type TileLut = [u8; 256];

/// Equalize `plane` adaptively with the given clip limit and tile grid.
///
/// `clip_limit` is a multiple of the uniform bin height (`tile_area / 256`);
/// `tile_grid` is the number of tiles along each axis.
pub(crate) fn equalize_adaptive(plane: &GrayImage, clip_limit: f32, tile_grid: u32) -> GrayImage {
    assert!(tile_grid > 0, "tile grid must be positive");
    assert!(clip_limit > 0.0, "clip limit must be positive");

    let (width, height) = plane.dimensions();
    if width == 0 || height == 0 {
        return plane.clone();
    }

    let tiles = tile_grid as usize;
    let tile_w = width.div_ceil(tile_grid);
    let tile_h = height.div_ceil(tile_grid);

    let mut luts: Vec<TileLut> = Vec::with_capacity(tiles * tiles);
    for ty in 0..tile_grid {
        for tx in 0..tile_grid {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts.push(tile_lut(plane, x0, y0, x1, y1, clip_limit));
        }
    }

    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        // Tile-space coordinate of the pixel row, measured from tile centers.
        let fy = (y as f32 + 0.5) / tile_h as f32 - 0.5;
        let ty0 = fy.floor();
        let wy = fy - ty0;
        let row0 = clamp_tile(ty0 as i64, tiles);
        let row1 = clamp_tile(ty0 as i64 + 1, tiles);

        for x in 0..width {
            let fx = (x as f32 + 0.5) / tile_w as f32 - 0.5;
            let tx0 = fx.floor();
            let wx = fx - tx0;
            let col0 = clamp_tile(tx0 as i64, tiles);
            let col1 = clamp_tile(tx0 as i64 + 1, tiles);

            let v = plane.get_pixel(x, y).0[0] as usize;
            let top = (1.0 - wx) * luts[row0 * tiles + col0][v] as f32
                + wx * luts[row0 * tiles + col1][v] as f32;
            let bottom = (1.0 - wx) * luts[row1 * tiles + col0][v] as f32
                + wx * luts[row1 * tiles + col1][v] as f32;
            let mapped = (1.0 - wy) * top + wy * bottom;

            output.put_pixel(x, y, image::Luma([mapped.round().clamp(0.0, 255.0) as u8]));
        }
    }

    output
}

fn clamp_tile(index: i64, tiles: usize) -> usize {
    index.clamp(0, tiles as i64 - 1) as usize
}

/// Build the clipped-histogram LUT for one tile region.
fn tile_lut(plane: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> TileLut {
    let mut lut = [0u8; 256];

    // Degenerate tile (grid larger than the image along one axis).
    if x0 >= x1 || y0 >= y1 {
        for (i, entry) in lut.iter_mut().enumerate() {
            *entry = i as u8;
        }
        return lut;
    }

    let mut histogram = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            histogram[plane.get_pixel(x, y).0[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);
    let clip = ((clip_limit * area as f32 / 256.0) as u32).max(1);

    // Clip the histogram and pool the excess.
    let mut excess = 0u32;
    for bin in histogram.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }

    // Redistribute the pooled mass: a uniform share to every bin, then the
    // remainder one count at a time at an even stride so the total stays
    // exact without biasing any part of the range.
    let bonus = excess / 256;
    for bin in histogram.iter_mut() {
        *bin += bonus;
    }
    let mut residual = excess % 256;
    if residual > 0 {
        let step = (256 / residual).max(1) as usize;
        let mut i = 0;
        while i < 256 && residual > 0 {
            histogram[i] += 1;
            residual -= 1;
            i += step;
        }
    }

    let mut cumulative = 0u64;
    for (i, &bin) in histogram.iter().enumerate() {
        cumulative += bin as u64;
        lut[i] = ((cumulative * 255 + area as u64 / 2) / area as u64).min(255) as u8;
    }

    lut
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn constant_plane_is_nearly_unchanged() {
        // With the histogram clipped to near-uniform, the CDF is close to the
        // identity ramp, so a flat region should map almost to itself.
        for value in [30u8, 128, 200] {
            let plane = GrayImage::from_pixel(256, 256, Luma([value]));
            let out = equalize_adaptive(&plane, 2.0, 8);
            for pixel in out.pixels() {
                let diff = (pixel.0[0] as i32 - value as i32).abs();
                assert!(diff <= 4, "flat {value} mapped to {}", pixel.0[0]);
            }
        }
    }

    #[test]
    fn high_clip_limit_spreads_a_low_contrast_ramp() {
        // With the clip limit far above the bin heights no clipping happens
        // and each tile equalizes fully, so a ramp squeezed into [100, 140)
        // should spread over most of the output range.
        let plane = GrayImage::from_fn(256, 256, |x, _| Luma([100 + (x * 40 / 256) as u8]));
        let out = equalize_adaptive(&plane, 64.0, 8);

        let min = out.pixels().map(|p| p.0[0]).min().unwrap();
        let max = out.pixels().map(|p| p.0[0]).max().unwrap();
        assert!(
            max - min > 150,
            "expected the 40-level ramp to spread, got {}..{}",
            min,
            max
        );
    }

    #[test]
    fn output_dimensions_match_input() {
        let plane = GrayImage::from_fn(50, 33, |x, y| Luma([(x * y % 251) as u8]));
        let out = equalize_adaptive(&plane, 2.0, 8);
        assert_eq!(out.dimensions(), (50, 33));
    }

    #[test]
    fn grid_larger_than_image_still_works() {
        let plane = GrayImage::from_fn(5, 5, |x, y| Luma([(40 * (x + y)) as u8]));
        let out = equalize_adaptive(&plane, 2.0, 8);
        assert_eq!(out.dimensions(), (5, 5));
    }
}
