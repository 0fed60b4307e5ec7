// SPDX-License-Identifier: MIT
//! # beam-trace: Contour Extraction for Vector Output
//!
//! This crate turns a grayscale frame into an ordered list of point chains
//! ("contours") that the `beamscan` contour path generator budgets into a beam
//! path. It is deliberately kept outside the path generation core: tracing is
//! destructive to its input and the core only ever hands it a private working
//! copy.
//!
//! ## Key Components
//!
//! - [`types`]: `Point` and `Contour`, the shapes shared with the path core
//! - [`tracer`]: the `ContourExtractor` seam and its implementations
//!
//! ## Pipeline
//!
//! 1. **Optional Canny pass**: turns a luma frame into a one-pixel edge map,
//!    overwriting the working copy in place
//! 2. **Border following**: Suzuki-Abe tracing via `imageproc`, every non-zero
//!    pixel is foreground
//!
//! ## Usage Example
//!
//! ```rust
//! use beam_trace::tracer::{BorderTracer, ContourExtractor, EdgeCfg};
//!
//! let mut working = image::GrayImage::new(16, 16);
//! for y in 4..12 {
//!     for x in 4..12 {
//!         working.put_pixel(x, y, image::Luma([255]));
//!     }
//! }
//!
//! let mut tracer = BorderTracer::new(None::<EdgeCfg>);
//! let contours = tracer.extract(&mut working);
//! assert!(!contours.is_empty());
//! ```

pub mod tracer;
pub mod types;

pub use tracer::{BorderTracer, ContourExtractor, EdgeCfg, EdgeMode, FixedContours};
pub use types::{Contour, Point};
