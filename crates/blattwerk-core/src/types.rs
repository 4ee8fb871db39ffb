// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Blattwerk imaging library.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlattwerkError;

/// Thresholding strategy for separating foreground objects from background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdMethod {
    /// Global threshold chosen automatically by Otsu's method.
    Otsu,
    /// Local threshold: mean intensity of the surrounding block, minus a
    /// constant offset. `block_size` is the side of the (odd) square block.
    Adaptive { block_size: u32, offset: i32 },
}

impl ThresholdMethod {
    /// The `Adaptive` variant with its standard block size and offset.
    pub fn adaptive() -> Self {
        Self::Adaptive {
            block_size: 5,
            offset: 2,
        }
    }

    /// Keyword form accepted by [`FromStr`].
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Otsu => "otsu",
            Self::Adaptive { .. } => "adaptive",
        }
    }
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::Otsu
    }
}

impl FromStr for ThresholdMethod {
    type Err = BlattwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "otsu" => Ok(Self::Otsu),
            "adaptive" => Ok(Self::adaptive()),
            other => Err(BlattwerkError::InvalidThresholdMethod(other.to_string())),
        }
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Edge detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeMethod {
    /// Canny detector with hysteresis thresholds; produces a binary edge map.
    Canny {
        low_threshold: f32,
        high_threshold: f32,
    },
    /// Horizontal Sobel derivative; produces a float gradient image.
    Sobel,
}

impl EdgeMethod {
    /// The `Canny` variant with its standard hysteresis thresholds.
    pub fn canny() -> Self {
        Self::Canny {
            low_threshold: 50.0,
            high_threshold: 150.0,
        }
    }

    /// Keyword form accepted by [`FromStr`].
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Canny { .. } => "canny",
            Self::Sobel => "sobel",
        }
    }
}

impl Default for EdgeMethod {
    fn default() -> Self {
        Self::canny()
    }
}

impl FromStr for EdgeMethod {
    type Err = BlattwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canny" => Ok(Self::canny()),
            "sobel" => Ok(Self::Sobel),
            other => Err(BlattwerkError::InvalidEdgeMethod(other.to_string())),
        }
    }
}

impl fmt::Display for EdgeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parameters for non-local-means denoising.
///
/// Filter strengths are split by plane: `luma_strength` smooths the lightness
/// plane, `chroma_strength` the two chroma planes. `template_window` is the
/// side of the patch compared between pixels and `search_window` the side of
/// the neighbourhood scanned for similar patches; both are in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DenoiseParams {
    pub luma_strength: f32,
    pub chroma_strength: f32,
    pub template_window: u32,
    pub search_window: u32,
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self {
            luma_strength: 20.0,
            chroma_strength: 10.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

/// Parameters for contrast-limited adaptive histogram equalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClaheParams {
    /// Histogram clip limit, as a multiple of the uniform bin height.
    pub clip_limit: f32,
    /// The image is divided into `tile_grid` x `tile_grid` tiles.
    pub tile_grid: u32,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_grid: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_method_parses_keywords() {
        assert_eq!("otsu".parse::<ThresholdMethod>().unwrap(), ThresholdMethod::Otsu);
        assert_eq!(
            "adaptive".parse::<ThresholdMethod>().unwrap(),
            ThresholdMethod::Adaptive {
                block_size: 5,
                offset: 2
            }
        );
    }

    #[test]
    fn threshold_method_rejects_unknown_keyword() {
        let err = "bogus".parse::<ThresholdMethod>().unwrap_err();
        assert!(err.to_string().contains("bogus"), "got: {err}");
    }

    #[test]
    fn edge_method_parses_keywords() {
        assert_eq!(
            "canny".parse::<EdgeMethod>().unwrap(),
            EdgeMethod::Canny {
                low_threshold: 50.0,
                high_threshold: 150.0
            }
        );
        assert_eq!("sobel".parse::<EdgeMethod>().unwrap(), EdgeMethod::Sobel);
    }

    #[test]
    fn edge_method_rejects_unknown_keyword() {
        let err = "bogus".parse::<EdgeMethod>().unwrap_err();
        assert!(err.to_string().contains("bogus"), "got: {err}");
    }

    #[test]
    fn keywords_round_trip_through_display() {
        for method in ["otsu", "adaptive"] {
            assert_eq!(method.parse::<ThresholdMethod>().unwrap().to_string(), method);
        }
        for method in ["canny", "sobel"] {
            assert_eq!(method.parse::<EdgeMethod>().unwrap().to_string(), method);
        }
    }

    #[test]
    fn denoise_defaults_match_pipeline_settings() {
        let params = DenoiseParams::default();
        assert_eq!(params.luma_strength, 20.0);
        assert_eq!(params.chroma_strength, 10.0);
        assert_eq!(params.template_window, 7);
        assert_eq!(params.search_window, 21);
    }
}
