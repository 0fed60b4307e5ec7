//! # Configuration Module
//!
//! Configuration structure and validation for vector rendering. It is the common
//! interface between the CLI and the library: the CLI fills a [`BeamConfig`],
//! validates it and turns it into generator options.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `output` | `String` | Any valid path | Output file for packed sample records |
//! | `output_width` | `u32` | 1-4096 | Device buffer width |
//! | `output_height` | `u32` | 1-4096 | Device buffer height |
//! | `mode` | `GeneratorKind` | contour / raster | Path generator |
//! | `move_speed` | `f64` | >= 0 | Demand per pixel of travel, 0 disables move segments |
//! | `blank_fraction` | `f64` | 0.0-1.0 | Beam-off share of each move segment |
//! | `min_contour_length` | `usize` | any | Minimum points for a contour to be drawn |
//! | `dither` | `bool` | true/false | Sub-sample dithering of contour points |
//! | `ordering` | `ContourOrdering` | identity / greedy | Contour drawing order |
//! | `scan_width` | `u32` | 1-4096 | Raster scan columns |
//! | `scan_height` | `u32` | 1-4096 | Raster scan rows |
//! | `canny` | `Option<EdgeCfg>` | low <= high | Edge detection before tracing |
//! | `park` | `(u8, u8)` | any | Device coordinate of blank samples |
//!
//! The sample capacity of every frame is `output_width * output_height`.
//!
//! ## Examples
//!
//! ```rust
//! use beamscan::config::config::BeamConfig;
//! use beamscan::path::{GeneratorKind, PathGenerator};
//!
//! let mut config = BeamConfig::default();
//! config.mode = GeneratorKind::Raster;
//! assert!(config.validate().is_ok());
//! assert_eq!(config.capacity(), 800 * 600);
//!
//! let generator = config.build_generator();
//! assert_eq!(generator.kind(), GeneratorKind::Raster);
//! ```

use beam_trace::{BorderTracer, EdgeCfg};

use crate::path::{
    ContourOptions, ContourOrdering, ContourPathGenerator, GeneratorKind, PathGenerator,
    RasterOptions, RasterPathGenerator,
};

/// Largest accepted device or scan dimension.
pub const MAX_DIMENSION: u32 = 4096;

/// Configuration for a rendering session.
#[derive(Clone, Debug, PartialEq)]
pub struct BeamConfig {
    /// Output path for packed `[x, y, intensity, 0]` records, appended frame after frame.
    pub output: String,

    /// Device buffer width. Together with `output_height` this fixes the
    /// number of samples every frame must produce.
    pub output_width: u32,

    pub output_height: u32,

    pub mode: GeneratorKind,

    /// Travel cost per source pixel between contours.
    ///
    /// 0 disables move segments entirely; larger values spend more of the
    /// frame on travel and less on drawing.
    pub move_speed: f64,

    /// Portion of each move segment emitted beam-off (the rest is a visible stroke).
    pub blank_fraction: f64,

    /// Contours with fewer points are treated as noise. Values below 1 act as 1.
    pub min_contour_length: usize,

    pub dither: bool,

    pub ordering: ContourOrdering,

    pub scan_width: u32,
    pub scan_height: u32,

    /// Canny thresholds applied before tracing; `None` traces the raw luma.
    pub canny: Option<EdgeCfg>,

    /// Luma at or below this value is cleared before tracing.
    pub trace_threshold: u8,

    pub park: (u8, u8),
}

impl Default for BeamConfig {
    /// Defaults:
    /// - `output`: "vector.bin"
    /// - 800x600 device buffer, contour mode
    /// - no move segments, identity ordering, no dithering
    /// - 512x256 raster scan grid
    /// - Canny 128/130 before tracing
    /// - park at (0, 0)
    fn default() -> Self {
        Self {
            output: "vector.bin".to_string(),
            output_width: 800,
            output_height: 600,
            mode: GeneratorKind::Contour,
            move_speed: 0.0,
            blank_fraction: 0.0,
            min_contour_length: 3,
            dither: false,
            ordering: ContourOrdering::Identity,
            scan_width: 512,
            scan_height: 256,
            canny: Some(EdgeCfg::default()),
            trace_threshold: 0,
            park: (0, 0),
        }
    }
}

impl BeamConfig {
    /// Defaults with the given output and device geometry.
    pub fn new(output: String, output_width: u32, output_height: u32, mode: GeneratorKind) -> Self {
        Self {
            output,
            output_width,
            output_height,
            mode,
            ..Self::default()
        }
    }

    /// Samples per frame.
    pub fn capacity(&self) -> usize {
        self.output_width as usize * self.output_height as usize
    }

    pub fn validate(&self) -> Result<(), String> {
        let dims = [
            ("Output width", self.output_width),
            ("Output height", self.output_height),
            ("Scan width", self.scan_width),
            ("Scan height", self.scan_height),
        ];
        for (name, value) in dims {
            if !(1..=MAX_DIMENSION).contains(&value) {
                return Err(format!("{} must be between 1 and {}", name, MAX_DIMENSION));
            }
        }
        if !self.move_speed.is_finite() || self.move_speed < 0.0 {
            return Err("Move speed must be a non-negative number".to_string());
        }
        if !(0.0..=1.0).contains(&self.blank_fraction) {
            return Err("Blank fraction must be between 0.0 and 1.0".to_string());
        }
        if let Some(cfg) = self.canny {
            if !(cfg.low.is_finite() && cfg.high.is_finite()) || cfg.low < 0.0 {
                return Err("Canny thresholds must be non-negative numbers".to_string());
            }
        }
        Ok(())
    }

    pub fn to_contour_options(&self) -> ContourOptions {
        ContourOptions {
            move_speed: self.move_speed,
            blank_fraction: self.blank_fraction,
            min_contour_length: self.min_contour_length,
            dither: self.dither,
            ordering: self.ordering,
            park: self.park,
        }
    }

    pub fn to_raster_options(&self) -> RasterOptions {
        RasterOptions {
            scan_width: self.scan_width,
            scan_height: self.scan_height,
            park: self.park,
        }
    }

    /// The generator selected by `mode`, with its extractor for contour mode.
    pub fn build_generator(&self) -> Box<dyn PathGenerator> {
        match self.mode {
            GeneratorKind::Contour => {
                let tracer = BorderTracer::new(self.canny).with_threshold(self.trace_threshold);
                Box::new(ContourPathGenerator::new(
                    self.to_contour_options(),
                    Box::new(tracer),
                ))
            }
            GeneratorKind::Raster => Box::new(RasterPathGenerator::new(self.to_raster_options())),
        }
    }
}
