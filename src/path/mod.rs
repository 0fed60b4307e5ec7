//! # Path Generation
//!
//! Turns one input frame into exactly `capacity` beam samples.
//!
//! ## Components
//!
//! - [`mapper`]: source → device coordinates, optional parity dithering
//! - [`budget`]: scale factor and carry-corrected rounding
//! - [`ordering`]: contour drawing order policies
//! - [`contour`]: contour-based generator (move segments + brightness dwell)
//! - [`raster`]: serpentine raster-scan generator (brightness-cubed dwell)
//!
//! Both generators share one contract, [`PathGenerator`]: they write into a
//! caller-provided [`SampleBuffer`], never past its capacity, blank-fill
//! whatever their path did not use, and describe what happened in a
//! [`FrameReport`]. Content never makes generation fail; an over-full frame is
//! truncated and the truncation is reported.

pub mod budget;
pub mod contour;
pub mod mapper;
pub mod ordering;
pub mod raster;

use serde_json::{Value, json};

use crate::core::frame::GrayFrame;
use crate::core::sample::SampleBuffer;
use crate::error::BeamResult;

pub use budget::BudgetAllocator;
pub use contour::{ContourOptions, ContourPathGenerator};
pub use mapper::CoordinateMapper;
pub use ordering::ContourOrdering;
pub use raster::{RasterOptions, RasterPathGenerator};

/// Which generator produced a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GeneratorKind {
    #[default]
    #[clap(name = "contour")]
    Contour,
    #[clap(name = "raster")]
    Raster,
}

impl GeneratorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contour => "contour",
            Self::Raster => "raster",
        }
    }
}

/// Emission that did not fit into the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Truncation {
    /// Size of the batch that hit the end of the buffer
    pub requested: usize,
    /// Samples of that batch that still fit
    pub written: usize,
    /// `requested - written`
    pub unwritten: usize,
    /// Contours (or scan cells) not emitted at all after the cut
    pub skipped: usize,
}

/// Per-frame diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub kind: GeneratorKind,
    /// Contours delivered by the extractor (0 for raster frames)
    pub contours_seen: usize,
    /// Contours surviving the minimum length filter
    pub contours_kept: usize,
    /// Contours emitted completely
    pub contours_emitted: usize,
    pub total_demand: f64,
    /// `capacity / total_demand`, 0 for blank frames
    pub scale: f64,
    pub path_samples: usize,
    pub fill_samples: usize,
    pub truncation: Option<Truncation>,
}

impl FrameReport {
    pub fn new(kind: GeneratorKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Nothing was drawn: the whole buffer is parked beam-off samples.
    pub fn is_blank(&self) -> bool {
        self.path_samples == 0
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    pub fn samples_written(&self) -> usize {
        self.path_samples + self.fill_samples
    }

    pub fn to_json(&self) -> Value {
        json!({
            "generator": self.kind.as_str(),
            "contours_seen": self.contours_seen,
            "contours_kept": self.contours_kept,
            "contours_emitted": self.contours_emitted,
            "total_demand": self.total_demand,
            "scale": self.scale,
            "path_samples": self.path_samples,
            "fill_samples": self.fill_samples,
            "truncation": self.truncation.map(|t| json!({
                "requested": t.requested,
                "written": t.written,
                "unwritten": t.unwritten,
                "skipped": t.skipped,
            })),
        })
    }
}

/// One frame in, one exactly-full sample buffer out.
///
/// Implementations are synchronous and run a frame start to finish; the buffer
/// is exclusively theirs for the duration of the call.
pub trait PathGenerator: Send {
    fn kind(&self) -> GeneratorKind;

    /// Fill `out` completely from `frame`.
    ///
    /// `out` is expected to be empty; its full remaining capacity is the
    /// frame's sample budget.
    fn generate(&mut self, frame: &GrayFrame, out: &mut SampleBuffer) -> BeamResult<FrameReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_shape() {
        let mut report = FrameReport::new(GeneratorKind::Raster);
        report.path_samples = 10;
        report.fill_samples = 2;
        report.truncation = Some(Truncation {
            requested: 5,
            written: 1,
            unwritten: 4,
            skipped: 3,
        });

        let v = report.to_json();
        assert_eq!(v["generator"], "raster");
        assert_eq!(v["truncation"]["unwritten"], 4);
        assert_eq!(report.samples_written(), 12);
        assert!(!report.is_blank());
        assert!(report.is_truncated());
    }
}
