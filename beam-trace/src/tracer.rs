// SPDX-License-Identifier: MIT
//! # Contour Extraction Strategies
//!
//! The [`ContourExtractor`] trait is the seam between segmentation and the path
//! core. Implementations receive a mutable working copy of the frame and may
//! overwrite it freely; callers must never pass the frame they intend to sample
//! brightness from afterwards.
//!
//! ## Strategies
//!
//! - [`BorderTracer`]: optional Canny edge pass, optional binarisation, then
//!   Suzuki-Abe border following (`imageproc::contours::find_contours`)
//! - [`FixedContours`]: replays a stored list, ignoring the frame
//!
//! Contour order is the order border following discovers borders (row-major
//! scan of the image), and the path core keeps it unless asked to reorder.

use image::GrayImage;

use crate::types::{Contour, Point};

/// Edge detection mode selectable from the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EdgeMode {
    /// Trace the frame as-is: every non-zero pixel is foreground.
    #[default]
    #[clap(name = "off")]
    Off,
    /// Run Canny first and trace the resulting edge map.
    #[clap(name = "canny")]
    Canny,
}

/// Canny hysteresis thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCfg {
    pub low: f32,
    pub high: f32,
}

impl Default for EdgeCfg {
    fn default() -> Self {
        Self {
            low: 128.0,
            high: 130.0,
        }
    }
}

impl EdgeCfg {
    /// Build thresholds, swapping them if given in the wrong order.
    pub fn new(low: f32, high: f32) -> Self {
        if low <= high {
            Self { low, high }
        } else {
            Self {
                low: high,
                high: low,
            }
        }
    }
}

/// Produces contours from a private, mutable working copy of a luma frame.
pub trait ContourExtractor: Send {
    /// Extract contours from `working`. The buffer may be overwritten.
    fn extract(&mut self, working: &mut GrayImage) -> Vec<Contour>;
}

/// Border-following extractor with optional Canny preprocessing.
///
/// The Canny gradient is a fixed 3x3 Sobel; there is no aperture setting.
#[derive(Clone, Debug, Default)]
pub struct BorderTracer {
    edges: Option<EdgeCfg>,
    threshold: u8,
}

impl BorderTracer {
    pub fn new(edges: Option<EdgeCfg>) -> Self {
        Self {
            edges,
            threshold: 0,
        }
    }

    /// Pixels at or below `threshold` are cleared before tracing.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn edges(&self) -> Option<EdgeCfg> {
        self.edges
    }
}

impl ContourExtractor for BorderTracer {
    fn extract(&mut self, working: &mut GrayImage) -> Vec<Contour> {
        if let Some(cfg) = self.edges {
            *working = imageproc::edges::canny(working, cfg.low, cfg.high);
        }

        if self.threshold > 0 {
            let threshold = self.threshold;
            for px in working.pixels_mut() {
                if px.0[0] <= threshold {
                    px.0[0] = 0;
                }
            }
        }

        imageproc::contours::find_contours::<i32>(working)
            .into_iter()
            .map(|c| c.points.into_iter().map(|p| Point::new(p.x, p.y)).collect())
            .collect()
    }
}

/// Replays a fixed contour list for every frame.
#[derive(Clone, Debug, Default)]
pub struct FixedContours {
    contours: Vec<Contour>,
}

impl FixedContours {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }
}

impl ContourExtractor for FixedContours {
    fn extract(&mut self, _working: &mut GrayImage) -> Vec<Contour> {
        self.contours.clone()
    }
}
