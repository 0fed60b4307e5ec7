//! # Processing Module
//!
//! This module contains the async frame processing pipeline: the vector
//! processor and the stream outputs it feeds.

pub mod processing;

// Re-export commonly used types for convenience
pub use processing::{
    FileStream, FrameProcessor, HandoffStream, ReportStream, Size, Stream, StreamConfig,
    StreamFormat, StreamMultiplexer, VectorProcessor,
};
