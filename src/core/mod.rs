//! # Core Infrastructure Module
//!
//! Output sample representation, the fixed-capacity sample buffer, frame types,
//! buffer pooling and the completed-frame hand-off.

pub mod buffer_pool;
pub mod frame;
pub mod handoff;
pub mod sample;

pub use buffer_pool::SamplePool;
pub use frame::{GrayFrame, VectorFrame};
pub use handoff::{FramePublisher, FrameSubscriber, handoff};
pub use sample::{RECORD_SIZE, Sample, SampleBuffer};
