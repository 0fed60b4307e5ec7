//! # Contour Path Generator
//!
//! Draws a frame as a sequence of traced contours.
//!
//! ## Per-frame flow
//!
//! 1. Keep contours with at least `min_contour_length` points (never fewer than 1)
//! 2. Put them in drawing order ([`ContourOrdering`])
//! 3. Demand pass: travel cost from the previous contour's end (or the origin)
//!    times `move_speed`, plus the summed brightness of every point
//! 4. Emission pass in the same order: an optional move segment held at the
//!    contour's first point (beam-off part first, then beam-on), then each point
//!    repeated in proportion to its brightness
//! 5. Fill whatever capacity is left with beam-off samples at the park position
//!
//! A batch that does not fit is cut at the end of the buffer and the frame stops
//! there; the cut is reported in [`FrameReport::truncation`].

use beam_trace::{Contour, ContourExtractor, Point};

use crate::core::frame::GrayFrame;
use crate::core::sample::{Sample, SampleBuffer};
use crate::error::BeamResult;
use crate::path::budget::BudgetAllocator;
use crate::path::mapper::CoordinateMapper;
use crate::path::ordering::ContourOrdering;
use crate::path::{FrameReport, GeneratorKind, PathGenerator, Truncation};

/// Tuning for [`ContourPathGenerator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourOptions {
    /// Demand units per source pixel of travel; 0 disables move segments
    pub move_speed: f64,
    /// Portion of every move segment drawn beam-off, 0.0..=1.0
    pub blank_fraction: f64,
    pub min_contour_length: usize,
    pub dither: bool,
    pub ordering: ContourOrdering,
    /// Device coordinate of blank-fill samples
    pub park: (u8, u8),
}

impl Default for ContourOptions {
    fn default() -> Self {
        Self {
            move_speed: 0.0,
            blank_fraction: 0.0,
            min_contour_length: 3,
            dither: false,
            ordering: ContourOrdering::Identity,
            park: (0, 0),
        }
    }
}

pub struct ContourPathGenerator {
    options: ContourOptions,
    extractor: Box<dyn ContourExtractor>,
}

impl ContourPathGenerator {
    pub fn new(options: ContourOptions, extractor: Box<dyn ContourExtractor>) -> Self {
        Self { options, extractor }
    }

    pub fn options(&self) -> &ContourOptions {
        &self.options
    }

    /// Emit an already extracted contour list for `frame`.
    ///
    /// Brightness is read from `frame`; the contours are only borrowed.
    pub fn generate_from_contours(
        &self,
        frame: &GrayFrame,
        contours: &[Contour],
        out: &mut SampleBuffer,
    ) -> FrameReport {
        let opts = &self.options;
        let min_len = opts.min_contour_length.max(1);
        let kept: Vec<&Contour> = contours.iter().filter(|c| c.len() >= min_len).collect();
        let kept = opts.ordering.apply(kept);

        let mut report = FrameReport::new(GeneratorKind::Contour);
        report.contours_seen = contours.len();
        report.contours_kept = kept.len();

        let moving = opts.move_speed > 0.0;
        let brightness = |p: &Point| f64::from(frame.brightness(p.x, p.y));

        let mut move_times = Vec::with_capacity(kept.len());
        let mut last = Point::ORIGIN;
        let mut total = 0.0;
        for contour in &kept {
            let (Some(first), Some(end)) = (contour.first(), contour.last()) else {
                move_times.push(0.0);
                continue;
            };
            let move_time = if moving {
                last.distance(first) * opts.move_speed
            } else {
                0.0
            };
            let draw_time: f64 = contour.iter().map(brightness).sum();
            total += move_time + draw_time;
            move_times.push(move_time);
            last = end;
        }
        report.total_demand = total;

        let start = out.len();
        if let Some(mut budget) = BudgetAllocator::new(total, out.remaining()) {
            report.scale = budget.scale();
            let mapper = CoordinateMapper::new(frame.width, frame.height, opts.dither);
            let blank = opts.blank_fraction.clamp(0.0, 1.0);

            for (i, (contour, move_time)) in kept.iter().zip(&move_times).enumerate() {
                let result = emit_contour(
                    out,
                    &mut budget,
                    &mapper,
                    contour,
                    moving.then_some((*move_time, blank)),
                    &brightness,
                );
                if let Err(mut cut) = result {
                    cut.skipped = kept.len() - i - 1;
                    log::warn!(
                        "contour frame truncated: {} of {} samples unwritten, {} contours skipped",
                        cut.unwritten,
                        cut.requested,
                        cut.skipped
                    );
                    report.truncation = Some(cut);
                    break;
                }
                report.contours_emitted += 1;
            }
        }

        report.path_samples = out.len() - start;
        report.fill_samples = out.fill_remaining(Sample::off(opts.park.0, opts.park.1));

        log::debug!(
            "contour frame: {}/{} contours, demand {:.1}, scale {:.4}, {} path + {} fill samples",
            report.contours_emitted,
            report.contours_seen,
            report.total_demand,
            report.scale,
            report.path_samples,
            report.fill_samples
        );
        report
    }
}

/// Emit `count` samples at `variants`, picking the variant by absolute index parity.
fn emit(
    out: &mut SampleBuffer,
    count: usize,
    variants: [(u8, u8); 2],
    z: u8,
) -> Result<(), Truncation> {
    let written = out.push_with(count, |idx| {
        let (x, y) = variants[idx & 1];
        Sample { x, y, z }
    });
    if written < count {
        return Err(Truncation {
            requested: count,
            written,
            unwritten: count - written,
            skipped: 0,
        });
    }
    Ok(())
}

fn emit_contour(
    out: &mut SampleBuffer,
    budget: &mut BudgetAllocator,
    mapper: &CoordinateMapper,
    contour: &Contour,
    travel: Option<(f64, f64)>,
    brightness: &impl Fn(&Point) -> f64,
) -> Result<(), Truncation> {
    if let (Some((move_time, blank)), Some(first)) = (travel, contour.first()) {
        let move_points = budget.rounded_count(move_time);
        let off = ((move_points as f64 * blank).floor() as usize).min(move_points);
        let variants = mapper.variants(first);
        emit(out, off, variants, Sample::BEAM_OFF)?;
        emit(out, move_points - off, variants, Sample::BEAM_ON)?;
    }
    for p in contour {
        let n = budget.rounded_count(brightness(p));
        emit(out, n, mapper.variants(*p), Sample::BEAM_ON)?;
    }
    Ok(())
}

impl PathGenerator for ContourPathGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Contour
    }

    fn generate(&mut self, frame: &GrayFrame, out: &mut SampleBuffer) -> BeamResult<FrameReport> {
        // the extractor may overwrite its input, so it gets a private copy
        let mut working = frame.working_copy();
        let contours = self.extractor.extract(&mut working);
        drop(working);
        Ok(self.generate_from_contours(frame, &contours, out))
    }
}
