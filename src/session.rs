//! # Vector Session Management
//!
//! High-level orchestration: pull luma frames from a source, render each one
//! into a vector frame and broadcast it to every configured stream. Provides a
//! builder-pattern API for assembling the pieces.
//!
//! ## Architecture
//!
//! 1. **FrameSource Trait**: abstract interface for frame sources
//! 2. **VectorSession**: drives source → processor → streams until the source ends
//! 3. **VectorSessionBuilder**: fluent API for session configuration
//! 4. **Sources**: decoded image files ([`ImageSequenceSource`]) or in-memory
//!    frames ([`FrameListSource`])
//!
//! Frames are pulled one at a time. A stream that blocks (e.g. a hand-off whose
//! consumer is behind) holds the loop, so no frame is rendered before the
//! previous one has been delivered.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::BeamConfig;
use crate::core::buffer_pool::SamplePool;
use crate::core::frame::GrayFrame;
use crate::core::handoff::FramePublisher;
use crate::error::BeamError;
use crate::processing::{
    FileStream, FrameProcessor, HandoffStream, ReportStream, Size, Stream, StreamMultiplexer,
    VectorProcessor,
};

/// Abstract interface for frame sources.
#[async_trait]
pub trait FrameSource: Send {
    /// The next frame, or `None` once the source is exhausted.
    async fn next_frame(&mut self) -> Result<Option<GrayFrame>>;

    /// Native resolution of the source. Valid after `initialize`.
    fn input_size(&self) -> Size;

    async fn initialize(&mut self) -> Result<()>;

    async fn shutdown(&mut self) -> Result<()>;
}

/// Decodes a list of image files in order, optionally looping over them.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    /// Passes over `paths`; 0 repeats forever
    loops: u32,
    pass: u32,
    position: usize,
    size: Size,
    frame_index: u64,
    frame_interval_ns: Option<u64>,
}

impl ImageSequenceSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            loops: 1,
            pass: 0,
            position: 0,
            size: Size { w: 0, h: 0 },
            frame_index: 0,
            frame_interval_ns: None,
        }
    }

    pub fn with_loops(mut self, loops: u32) -> Self {
        self.loops = loops;
        self
    }

    /// Stamp frames with presentation times at `fps`.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.frame_interval_ns = (fps > 0).then(|| 1_000_000_000 / u64::from(fps));
        self
    }

    async fn decode(path: &Path) -> Result<GrayFrame> {
        let display = path.display().to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| BeamError::io_at("image_read", &display, e))?;
        let image = image::load_from_memory(&bytes).map_err(|e| BeamError::decode(&display, e))?;
        Ok(GrayFrame::from_image(&image).map_err(|e| e.with_context(display))?)
    }
}

#[async_trait]
impl FrameSource for ImageSequenceSource {
    async fn next_frame(&mut self) -> Result<Option<GrayFrame>> {
        if self.position >= self.paths.len() {
            self.pass += 1;
            if self.paths.is_empty() || (self.loops != 0 && self.pass >= self.loops) {
                return Ok(None);
            }
            self.position = 0;
        }

        let mut frame = Self::decode(&self.paths[self.position]).await?;
        self.position += 1;
        if let Some(interval) = self.frame_interval_ns {
            frame = frame.with_pts(self.frame_index * interval);
        }
        self.frame_index += 1;
        Ok(Some(frame))
    }

    fn input_size(&self) -> Size {
        self.size
    }

    async fn initialize(&mut self) -> Result<()> {
        let first = self.paths.first().ok_or_else(|| {
            BeamError::config("inputs", "[]", "at least one input image is required")
        })?;
        let frame = Self::decode(first).await?;
        self.size = Size {
            w: frame.width,
            h: frame.height,
        };
        log::info!(
            "image sequence: {} files, {}x{}, loops {}",
            self.paths.len(),
            frame.width,
            frame.height,
            self.loops
        );
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Frames already in memory, delivered once each.
pub struct FrameListSource {
    frames: VecDeque<GrayFrame>,
    size: Size,
}

impl FrameListSource {
    pub fn new(frames: Vec<GrayFrame>) -> Self {
        let size = frames.first().map_or(Size { w: 0, h: 0 }, |f| Size {
            w: f.width,
            h: f.height,
        });
        Self {
            frames: frames.into(),
            size,
        }
    }
}

#[async_trait]
impl FrameSource for FrameListSource {
    async fn next_frame(&mut self) -> Result<Option<GrayFrame>> {
        Ok(self.frames.pop_front())
    }

    fn input_size(&self) -> Size {
        self.size
    }

    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Totals for one session run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames rendered and delivered
    pub frames: u64,
    /// Frames dropped because their buffer could not be built
    pub dropped_frames: u64,
    pub truncated_frames: u64,
    pub blank_frames: u64,
    pub samples_written: u64,
}

/// High-level vector session that orchestrates everything.
pub struct VectorSession {
    processor: Box<dyn FrameProcessor>,
    multiplexer: StreamMultiplexer,
    source: Box<dyn FrameSource>,
    pool: Option<Arc<SamplePool>>,
    max_frames: Option<u64>,
}

impl VectorSession {
    /// Create a new vector session using the builder pattern.
    pub fn builder() -> VectorSessionBuilder {
        VectorSessionBuilder::new()
    }

    /// Run until the source is exhausted or `max_frames` frames were delivered.
    pub async fn run(mut self) -> Result<SessionSummary> {
        self.source.initialize().await?;
        let input_size = self.source.input_size();
        let output_size = self.processor.initialize(input_size).await?;
        self.multiplexer.initialize().await?;

        log::info!(
            "vector session started: input {}x{}, output {}x{}, {} streams",
            input_size.w,
            input_size.h,
            output_size.w,
            output_size.h,
            self.multiplexer.stream_count()
        );

        let mut summary = SessionSummary::default();
        while self.max_frames.is_none_or(|max| summary.frames < max) {
            let Some(frame) = self.source.next_frame().await? else {
                break;
            };
            let Some(vector) = self.processor.process_frame(frame).await? else {
                summary.dropped_frames += 1;
                continue;
            };

            summary.frames += 1;
            summary.samples_written += vector.samples.len() as u64;
            summary.truncated_frames += u64::from(vector.report.is_truncated());
            summary.blank_frames += u64::from(vector.report.is_blank());

            let vector = Arc::new(vector);
            self.multiplexer.send_frame(Arc::clone(&vector)).await?;

            // storage goes back to the pool unless a consumer still holds the frame
            if let (Some(pool), Ok(done)) = (&self.pool, Arc::try_unwrap(vector)) {
                pool.recycle(done.samples);
            }
        }

        self.multiplexer.shutdown().await?;
        self.source.shutdown().await?;

        log::info!(
            "vector session finished: {} frames, {} dropped, {} truncated, {} blank",
            summary.frames,
            summary.dropped_frames,
            summary.truncated_frames,
            summary.blank_frames
        );
        Ok(summary)
    }
}

/// Builder for creating vector sessions with fluent API.
#[derive(Default)]
pub struct VectorSessionBuilder {
    processor: Option<Box<dyn FrameProcessor>>,
    pool: Option<Arc<SamplePool>>,
    streams: Vec<Box<dyn Stream>>,
    source: Option<Box<dyn FrameSource>>,
    max_frames: Option<u64>,
    output: Option<Size>,
}

impl VectorSessionBuilder {
    /// Create a new session builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the generator, geometry and output file described by `config`.
    pub fn with_config(mut self, config: &BeamConfig) -> Self {
        let processor = VectorProcessor::from_config(config);
        self.pool = Some(Arc::clone(processor.pool()));
        self.output = Some(processor.output_size());
        self.processor = Some(Box::new(processor));
        self.with_file_output(config.output.clone())
    }

    /// Use a custom processor. Pass the processor's pool to recycle frame storage.
    pub fn with_processor<P: FrameProcessor + 'static>(
        mut self,
        processor: P,
        output: Size,
        pool: Option<Arc<SamplePool>>,
    ) -> Self {
        self.processor = Some(Box::new(processor));
        self.output = Some(output);
        self.pool = pool;
        self
    }

    fn output_size(&self) -> Size {
        self.output.unwrap_or(Size { w: 0, h: 0 })
    }

    /// Add packed sample output.
    pub fn with_file_output(mut self, path: String) -> Self {
        let size = self.output_size();
        self.streams.push(Box::new(FileStream::new(path, size.w, size.h)));
        self
    }

    /// Add JSON-lines frame report output.
    pub fn with_report_output(mut self, path: String) -> Self {
        let size = self.output_size();
        self.streams.push(Box::new(ReportStream::new(path, size.w, size.h)));
        self
    }

    /// Add an in-process hand-off to a consumer thread.
    pub fn with_handoff(mut self, publisher: FramePublisher) -> Self {
        let size = self.output_size();
        self.streams.push(Box::new(HandoffStream::new(publisher, size.w, size.h)));
        self
    }

    pub fn with_stream(mut self, stream: Box<dyn Stream>) -> Self {
        self.streams.push(stream);
        self
    }

    /// Set the frame source for the session.
    pub fn with_source<S: FrameSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// Build the vector session with the configured components.
    pub fn build(self) -> Result<VectorSession> {
        if self.streams.is_empty() {
            return Err(anyhow::anyhow!("At least one stream must be configured"));
        }
        let processor = self
            .processor
            .ok_or_else(|| anyhow::anyhow!("No processor specified"))?;
        let source = self
            .source
            .ok_or_else(|| anyhow::anyhow!("No frame source specified"))?;

        let mut multiplexer = StreamMultiplexer::new();
        for stream in self.streams {
            multiplexer.add_stream(stream);
        }

        Ok(VectorSession {
            processor,
            multiplexer,
            source,
            pool: self.pool,
            max_frames: self.max_frames,
        })
    }
}
