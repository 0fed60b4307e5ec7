//! # Raster Scan Path Generator
//!
//! Sweeps a fixed logical grid of `scan_width x scan_height` cells in serpentine
//! order (even rows left to right, odd rows right to left), independent of the
//! source resolution. Every cell dwells in proportion to `(brightness + 1)^3`,
//! so bright cells dominate the frame while dark cells still get a trickle of
//! samples. The first and last column of each row are forced to
//! [`EDGE_BRIGHTNESS`] so the beam always crosses the full row width.
//!
//! Counts use plain truncation, `floor(demand * capacity / total)`; whatever the
//! truncation leaves over goes to the blank fill. Each cell has two precomputed
//! coordinate variants one fine step apart horizontally, alternated by buffer
//! index for a 50/50 temporal dither.

use crate::core::frame::GrayFrame;
use crate::core::sample::{Sample, SampleBuffer};
use crate::error::BeamResult;
use crate::path::budget::truncated_share;
use crate::path::mapper::{NATIVE_MAX, fold};
use crate::path::{FrameReport, GeneratorKind, PathGenerator, Truncation};

/// Brightness forced onto the first and last column of every scan row.
pub const EDGE_BRIGHTNESS: u8 = 0xF0;

pub const DEFAULT_SCAN_WIDTH: u32 = 512;
pub const DEFAULT_SCAN_HEIGHT: u32 = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterOptions {
    pub scan_width: u32,
    pub scan_height: u32,
    pub park: (u8, u8),
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scan_width: DEFAULT_SCAN_WIDTH,
            scan_height: DEFAULT_SCAN_HEIGHT,
            park: (0, 0),
        }
    }
}

/// One visited scan cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    /// Column in scan coordinates (already serpentine-adjusted)
    sx: u32,
    row: u32,
    brightness: u8,
}

#[inline]
fn demand(brightness: u8) -> u64 {
    let b = u64::from(brightness) + 1;
    b * b * b
}

#[derive(Clone, Debug, Default)]
pub struct RasterPathGenerator {
    options: RasterOptions,
}

impl RasterPathGenerator {
    pub fn new(options: RasterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    /// Cells in serpentine scan order with their sampled brightness.
    fn cells(&self, frame: &GrayFrame) -> impl Iterator<Item = Cell> {
        let sw = self.options.scan_width.max(1);
        let sh = self.options.scan_height.max(1);
        let (w, h) = (u64::from(frame.width), u64::from(frame.height));

        (0..sh).flat_map(move |row| {
            // nearest-neighbour source row, bottom of the image first
            let src_y = h - 1 - u64::from(row) * h / u64::from(sh);
            (0..sw).map(move |col| {
                let sx = if row % 2 == 1 { sw - 1 - col } else { col };
                let brightness = if sx == 0 || sx == sw - 1 {
                    EDGE_BRIGHTNESS
                } else {
                    let src_x = u64::from(sx) * w / u64::from(sw);
                    frame.brightness(src_x as i32, src_y as i32)
                };
                Cell { sx, row, brightness }
            })
        })
    }

    /// Both dither variants of a cell's device coordinate.
    fn variants(&self, cell: Cell) -> [(u8, u8); 2] {
        let sw = u64::from(self.options.scan_width.max(1));
        let sh = u64::from(self.options.scan_height.max(1));
        let span = u64::from(NATIVE_MAX) + 1;

        let fine_x = (u64::from(cell.sx) * 2 * span / sw) as u16;
        let y = (u64::from(cell.row) * span / sh).min(u64::from(NATIVE_MAX)) as u8;
        // the last column never steps past its own position
        let last = u64::from(cell.sx) + 1 == sw;
        [(fold(fine_x, false), y), (fold(fine_x, !last), y)]
    }
}

impl PathGenerator for RasterPathGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Raster
    }

    fn generate(&mut self, frame: &GrayFrame, out: &mut SampleBuffer) -> BeamResult<FrameReport> {
        let mut report = FrameReport::new(GeneratorKind::Raster);
        let capacity = out.remaining();
        let start = out.len();

        let total: u64 = self.cells(frame).map(|c| demand(c.brightness)).sum();
        report.total_demand = total as f64;

        if total > 0 {
            report.scale = capacity as f64 / total as f64;
            let cell_count =
                self.options.scan_width.max(1) as usize * self.options.scan_height.max(1) as usize;

            for (i, cell) in self.cells(frame).enumerate() {
                let count = truncated_share(demand(cell.brightness), capacity, total);
                let variants = self.variants(cell);
                let written = out.push_with(count, |idx| {
                    let (x, y) = variants[idx & 1];
                    Sample::on(x, y)
                });
                if written < count {
                    let cut = Truncation {
                        requested: count,
                        written,
                        unwritten: count - written,
                        skipped: cell_count - i - 1,
                    };
                    log::warn!(
                        "raster frame truncated: {} of {} samples unwritten, {} cells skipped",
                        cut.unwritten,
                        cut.requested,
                        cut.skipped
                    );
                    report.truncation = Some(cut);
                    break;
                }
            }
        }

        let (px, py) = self.options.park;
        report.path_samples = out.len() - start;
        report.fill_samples = out.fill_remaining(Sample::off(px, py));

        log::debug!(
            "raster frame: {}x{} cells, demand {}, {} path + {} fill samples",
            self.options.scan_width,
            self.options.scan_height,
            total,
            report.path_samples,
            report.fill_samples
        );
        Ok(report)
    }
}
