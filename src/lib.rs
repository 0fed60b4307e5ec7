//! # Beamscan
//!
//! Renders raster frames as beam paths for vector displays (oscilloscopes in
//! X/Y mode, laser galvos): every frame becomes exactly `width * height`
//! samples of `(x, y, intensity)`, ready to be clocked out at a constant rate.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `core`: sample records, the fixed-capacity sample buffer, frame types,
//!   buffer pool and the double-buffered frame hand-off
//! - `path`: coordinate mapping, budget allocation and the two path
//!   generators (contour tracing and serpentine raster scan)
//! - `processing`: async frame processor and stream outputs
//! - `config`: configuration management and validation
//! - `session`: high-level session orchestration
//!
//! Contour extraction lives in the `beam-trace` workspace crate and is
//! re-exported as [`beam_trace`].
//!
//! ## Guarantees
//!
//! - **Exact capacity**: every rendered frame holds exactly `capacity` samples;
//!   unused time is parked beam-off
//! - **No overflow**: emission is bounds-checked; content that does not fit is
//!   truncated and reported, never written past the buffer
//! - **Deterministic**: the same frame and configuration give the same bytes
//!
//! ## Example
//!
//! ```rust
//! use beamscan::{BeamConfig, GeneratorKind, GrayFrame};
//!
//! # fn example() -> Result<(), beamscan::BeamError> {
//! let mut config = BeamConfig::new("out.bin".to_string(), 64, 48, GeneratorKind::Raster);
//! config.scan_width = 32;
//! config.scan_height = 16;
//!
//! let frame = GrayFrame::new(vec![128; 100 * 80], 100, 80)?;
//! let vector = beamscan::render_frame(&config, &frame)?;
//! assert_eq!(vector.samples.len(), 64 * 48);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::path::PathBuf;

use anyhow::{Result, anyhow};

pub mod config;
pub mod core;
pub mod error;
pub mod path;
pub mod processing;
pub mod session;

/// Re-export error types for convenience
pub use error::{BeamError, BeamResult};

/// Re-export the segmentation crate and its shared types
pub use beam_trace;
pub use beam_trace::{Contour, Point};

pub use crate::config::BeamConfig;
pub use crate::core::{GrayFrame, Sample, SampleBuffer, VectorFrame};
pub use crate::path::{FrameReport, GeneratorKind, PathGenerator, Truncation};
pub use crate::session::{ImageSequenceSource, SessionSummary, VectorSession};

/// Render a single frame with the generator described by `config`.
///
/// The synchronous entry point: no pool, no streams, one fresh buffer.
pub fn render_frame(config: &BeamConfig, frame: &GrayFrame) -> BeamResult<VectorFrame> {
    config
        .validate()
        .map_err(|reason| BeamError::config("config", "", reason))?;
    let mut generator = config.build_generator();
    let mut buffer = SampleBuffer::try_with_capacity(config.capacity())?;
    let report = generator.generate(frame, &mut buffer)?;
    Ok(VectorFrame {
        samples: buffer.finish()?,
        width: config.output_width,
        height: config.output_height,
        pts_ns: frame.pts_ns,
        report,
    })
}

/// Render a sequence of image files to `config.output`.
///
/// Writes one JSON line per frame to `report` when given. `loops` passes over
/// the inputs, 0 meaning forever.
pub async fn render_images(
    config: &BeamConfig,
    inputs: Vec<PathBuf>,
    loops: u32,
    report: Option<String>,
) -> Result<SessionSummary> {
    config.validate().map_err(|e| anyhow!(e))?;
    if inputs.is_empty() {
        return Err(anyhow!("No input images given"));
    }

    log::info!(
        "rendering {} inputs in {} mode to '{}' ({}x{} samples per frame)",
        inputs.len(),
        config.mode.as_str(),
        config.output,
        config.output_width,
        config.output_height
    );

    let mut builder = VectorSession::builder()
        .with_config(config)
        .with_source(ImageSequenceSource::new(inputs).with_loops(loops));
    if let Some(path) = report {
        builder = builder.with_report_output(path);
    }
    builder.build()?.run().await
}
