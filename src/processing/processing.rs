//! # Frame Processing Pipeline
//!
//! Async plumbing around the synchronous path core: a processor that turns luma
//! frames into exactly-full vector frames, and stream outputs that consume them.
//!
//! ## Architecture
//!
//! 1. **FrameProcessor Trait**: luma frame in, vector frame (or nothing) out
//! 2. **VectorProcessor**: pooled sample buffers + one [`PathGenerator`]
//! 3. **Stream Trait**: abstract output destination
//! 4. **StreamMultiplexer**: concurrent broadcasting to multiple streams
//!
//! Completed frames travel as `Arc<VectorFrame>`, so every stream sees the same
//! immutable snapshot and no stream can observe a partially written buffer.
//!
//! ## Streams
//!
//! - [`FileStream`]: appends packed `[x, y, intensity, 0]` records to a file
//! - [`ReportStream`]: one JSON line of [`FrameReport`](crate::path::FrameReport) per frame
//! - [`HandoffStream`]: publishes into a [`FramePublisher`] for a transmission thread

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::config::BeamConfig;
use crate::core::buffer_pool::SamplePool;
use crate::core::frame::{GrayFrame, VectorFrame};
use crate::core::handoff::FramePublisher;
use crate::error::{BeamError, BeamResult, classify};
use crate::path::PathGenerator;

/// Size representation for frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn area(&self) -> usize {
        self.w as usize * self.h as usize
    }
}

/// Stream configuration specifying output format and parameters.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub width: u32,
    pub height: u32,
    pub format: StreamFormat,
}

/// Supported stream outputs.
#[derive(Debug, Clone)]
pub enum StreamFormat {
    /// Raw sample records
    File { path: String },
    /// JSON lines of per-frame reports
    Report { path: String },
    /// In-process hand-off to a consumer thread
    Handoff,
}

/// Abstract frame processing interface.
#[async_trait]
pub trait FrameProcessor: Send {
    /// Initialize the processor with the input size and return the output size.
    async fn initialize(&mut self, input_size: Size) -> Result<Size>;

    /// Process a single frame.
    ///
    /// # Returns
    /// The completed vector frame, or `None` when the frame had to be dropped
    async fn process_frame(&mut self, frame: GrayFrame) -> Result<Option<VectorFrame>>;
}

/// Abstract stream output interface.
#[async_trait]
pub trait Stream: Send + Sync {
    /// Send a frame to this stream.
    async fn send_frame(&mut self, frame: Arc<VectorFrame>) -> Result<()>;
    /// Shut down this stream.
    async fn shutdown(&mut self) -> Result<()>;
    /// Get this stream's configuration.
    fn config(&self) -> &StreamConfig;
    /// Initialize this stream.
    async fn initialize(&mut self) -> Result<()>;
}

/// Runs one [`PathGenerator`] per frame into buffers drawn from a [`SamplePool`].
pub struct VectorProcessor {
    generator: Box<dyn PathGenerator>,
    pool: Arc<SamplePool>,
    output: Size,
    frames: u64,
}

impl VectorProcessor {
    pub fn new(generator: Box<dyn PathGenerator>, output: Size, pool: Arc<SamplePool>) -> Self {
        Self {
            generator,
            pool,
            output,
            frames: 0,
        }
    }

    /// Generator, device size and a fresh pool from a validated config.
    pub fn from_config(config: &BeamConfig) -> Self {
        Self::new(
            config.build_generator(),
            Size {
                w: config.output_width,
                h: config.output_height,
            },
            Arc::new(SamplePool::new(4)),
        )
    }

    pub fn pool(&self) -> &Arc<SamplePool> {
        &self.pool
    }

    pub fn output_size(&self) -> Size {
        self.output
    }

    /// Render one frame synchronously.
    ///
    /// Either returns an exactly-full frame or an error; a partially built
    /// buffer never leaves this function.
    pub fn render(&mut self, frame: &GrayFrame) -> BeamResult<VectorFrame> {
        let mut buffer = self.pool.acquire(self.output.area())?;
        let report = match self.generator.generate(frame, &mut buffer) {
            Ok(report) if buffer.is_full() => report,
            Ok(_) => {
                let e = BeamError::capacity(buffer.capacity(), buffer.len());
                self.pool.recycle(buffer.into_storage());
                return Err(e);
            }
            Err(e) => {
                self.pool.recycle(buffer.into_storage());
                return Err(e);
            }
        };
        let samples = buffer.finish()?;
        self.frames += 1;

        Ok(VectorFrame {
            samples,
            width: self.output.w,
            height: self.output.h,
            pts_ns: frame.pts_ns,
            report,
        })
    }
}

#[async_trait]
impl FrameProcessor for VectorProcessor {
    async fn initialize(&mut self, input_size: Size) -> Result<Size> {
        if input_size.area() == 0 {
            return Err(BeamError::validation(
                "input_size",
                "must be non-zero",
                format!("{}x{}", input_size.w, input_size.h),
            )
            .into());
        }
        log::info!(
            "{} generator: {}x{} source -> {} samples per frame",
            self.generator.kind().as_str(),
            input_size.w,
            input_size.h,
            self.output.area()
        );
        Ok(self.output)
    }

    async fn process_frame(&mut self, frame: GrayFrame) -> Result<Option<VectorFrame>> {
        match self.render(&frame) {
            Ok(vector) => Ok(Some(vector)),
            Err(e) if classify::is_frame_fatal(&e) => {
                log::error!("dropping frame {}: {}", self.frames, e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Multiplexer for broadcasting frames to multiple streams concurrently.
#[derive(Default)]
pub struct StreamMultiplexer {
    pub streams: Vec<Box<dyn Stream>>,
}

impl StreamMultiplexer {
    /// Create a new stream multiplexer.
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
        }
    }

    pub fn add_stream(&mut self, stream: Box<dyn Stream>) {
        self.streams.push(stream);
    }

    /// Initialize all streams in the multiplexer.
    pub async fn initialize(&mut self) -> Result<()> {
        for stream in &mut self.streams {
            stream.initialize().await?;
        }
        Ok(())
    }

    /// Send a frame to all streams concurrently.
    pub async fn send_frame(&mut self, frame: Arc<VectorFrame>) -> Result<()> {
        let futures: Vec<_> = self
            .streams
            .iter_mut()
            .map(|stream| stream.send_frame(Arc::clone(&frame)))
            .collect();

        for result in join_all(futures).await {
            result?;
        }
        Ok(())
    }

    /// Shut down all streams in the multiplexer.
    pub async fn shutdown(&mut self) -> Result<()> {
        for stream in &mut self.streams {
            stream.shutdown().await?;
        }
        Ok(())
    }

    /// Get the number of streams in the multiplexer.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }
}

fn not_initialized(operation: &str) -> anyhow::Error {
    BeamError::state("uninitialized", operation, "stream used before initialize()").into()
}

/// File stream writing packed sample records, frame after frame.
pub struct FileStream {
    pub config: StreamConfig,
    pub path: String,
    pub frame_count: u64,
    pub bytes_written: u64,
    writer: Option<BufWriter<File>>,
}

impl FileStream {
    /// Create a new file stream. The file is created on `initialize`.
    pub fn new(path: String, width: u32, height: u32) -> Self {
        Self {
            config: StreamConfig {
                width,
                height,
                format: StreamFormat::File { path: path.clone() },
            },
            path,
            frame_count: 0,
            bytes_written: 0,
            writer: None,
        }
    }
}

#[async_trait]
impl Stream for FileStream {
    async fn send_frame(&mut self, frame: Arc<VectorFrame>) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| not_initialized("file_write"))?;
        let bytes = frame.to_bytes();
        writer
            .write_all(&bytes)
            .await
            .map_err(|e| BeamError::io_at("file_write", &self.path, e))?;
        self.frame_count += 1;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .await
                .map_err(|e| BeamError::io_at("file_flush", &self.path, e))?;
        }
        log::info!(
            "file stream '{}' saved {} frames ({} bytes)",
            self.path,
            self.frame_count,
            self.bytes_written
        );
        Ok(())
    }

    fn config(&self) -> &StreamConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        let file = File::create(&self.path)
            .await
            .map_err(|e| BeamError::io_at("file_create", &self.path, e))?;
        self.writer = Some(BufWriter::new(file));
        log::info!("initialized file stream to '{}'", self.path);
        Ok(())
    }
}

/// JSON-lines writer for per-frame reports.
pub struct ReportStream {
    pub config: StreamConfig,
    pub path: String,
    pub frame_count: u64,
    writer: Option<BufWriter<File>>,
}

impl ReportStream {
    pub fn new(path: String, width: u32, height: u32) -> Self {
        Self {
            config: StreamConfig {
                width,
                height,
                format: StreamFormat::Report { path: path.clone() },
            },
            path,
            frame_count: 0,
            writer: None,
        }
    }
}

#[async_trait]
impl Stream for ReportStream {
    async fn send_frame(&mut self, frame: Arc<VectorFrame>) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| not_initialized("report_write"))?;

        let mut line = frame.report.to_json();
        line["frame"] = self.frame_count.into();
        line["pts_ns"] = frame.pts_ns.into();
        line["lit_samples"] = frame.lit_samples().into();
        let mut bytes = serde_json::to_vec(&line).map_err(BeamError::from)?;
        bytes.push(b'\n');

        writer
            .write_all(&bytes)
            .await
            .map_err(|e| BeamError::io_at("report_write", &self.path, e))?;
        self.frame_count += 1;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .await
                .map_err(|e| BeamError::io_at("report_flush", &self.path, e))?;
        }
        Ok(())
    }

    fn config(&self) -> &StreamConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<()> {
        if self.writer.is_none() {
            let file = File::create(&self.path)
                .await
                .map_err(|e| BeamError::io_at("report_create", &self.path, e))?;
            self.writer = Some(BufWriter::new(file));
        }
        Ok(())
    }
}

/// Hands completed frames to a consumer thread through a [`FramePublisher`].
///
/// Publishing blocks while the consumer is behind, which throttles the session.
pub struct HandoffStream {
    pub config: StreamConfig,
    publisher: FramePublisher,
}

impl HandoffStream {
    pub fn new(publisher: FramePublisher, width: u32, height: u32) -> Self {
        Self {
            config: StreamConfig {
                width,
                height,
                format: StreamFormat::Handoff,
            },
            publisher,
        }
    }
}

#[async_trait]
impl Stream for HandoffStream {
    async fn send_frame(&mut self, frame: Arc<VectorFrame>) -> Result<()> {
        let publisher = self.publisher.clone();
        tokio::task::spawn_blocking(move || publisher.publish(frame)).await??;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    fn config(&self) -> &StreamConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }
}
