//! # Frame Types
//!
//! [`GrayFrame`] is the input side: one byte of brightness per pixel, stride
//! aware, with the pixel data behind an `Arc` so frames move between the source,
//! the processor and tests without copying. [`VectorFrame`] is the output side:
//! a completed, exactly-full sample sequence plus the report describing how it
//! was produced.

use std::sync::Arc;

use image::{DynamicImage, GrayImage};

use crate::core::sample::{RECORD_SIZE, Sample, pack_samples};
use crate::error::{BeamError, BeamResult};
use crate::path::FrameReport;

/// Single-plane 8-bit luma frame.
#[derive(Clone, Debug)]
pub struct GrayFrame {
    /// Raw luma bytes. Length must be at least `stride * (height - 1) + width`.
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    /// Bytes per row (may exceed `width`)
    pub stride: usize,
    /// Optional presentation timestamp in nanoseconds, carried through to the output
    pub pts_ns: Option<u64>,
}

impl GrayFrame {
    /// Wrap tightly packed luma bytes.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> BeamResult<Self> {
        Self::with_stride(data, width, height, width as usize)
    }

    pub fn with_stride(data: Vec<u8>, width: u32, height: u32, stride: usize) -> BeamResult<Self> {
        if width == 0 || height == 0 {
            return Err(BeamError::validation(
                "frame_size",
                "width and height must be non-zero",
                format!("{}x{}", width, height),
            ));
        }
        if stride < width as usize {
            return Err(BeamError::validation(
                "stride",
                "stride must be at least the frame width",
                stride.to_string(),
            ));
        }
        let needed = stride * (height as usize - 1) + width as usize;
        if data.len() < needed {
            return Err(BeamError::validation(
                "frame_data",
                format!("expected at least {} bytes", needed),
                data.len().to_string(),
            ));
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            stride,
            pts_ns: None,
        })
    }

    pub fn with_pts(mut self, pts_ns: u64) -> Self {
        self.pts_ns = Some(pts_ns);
        self
    }

    /// Convert any decoded image to luma. Empty images are rejected.
    pub fn from_image(image: &DynamicImage) -> BeamResult<Self> {
        Self::from_luma(image.to_luma8())
    }

    pub fn from_luma(image: GrayImage) -> BeamResult<Self> {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height)
    }

    /// Brightness at (x, y). Out-of-range coordinates read as black.
    #[inline]
    pub fn brightness(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return 0;
        }
        self.data[y as usize * self.stride + x as usize]
    }

    /// Private, tightly packed copy of the frame for destructive consumers.
    pub fn working_copy(&self) -> GrayImage {
        let w = self.width as usize;
        let mut raw = Vec::with_capacity(w * self.height as usize);
        for row in self.data.chunks(self.stride).take(self.height as usize) {
            raw.extend_from_slice(&row[..w]);
        }
        // raw has exactly width * height bytes, so from_raw cannot fail
        GrayImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

/// Completed output of one frame: exactly `width * height` samples in path order.
#[derive(Clone, Debug)]
pub struct VectorFrame {
    pub samples: Vec<Sample>,
    /// Device buffer width (samples per row of the output image)
    pub width: u32,
    pub height: u32,
    pub pts_ns: Option<u64>,
    pub report: FrameReport,
}

impl VectorFrame {
    pub fn capacity(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Serialized records, `[x, y, intensity, 0]` per sample.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.samples.len() * RECORD_SIZE);
        pack_samples(&self.samples, &mut out);
        out
    }

    pub fn lit_samples(&self) -> usize {
        self.samples.iter().filter(|s| s.is_on()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strided_brightness() {
        // 3x2 frame, stride 4 (one padding byte per row)
        let data = vec![1, 2, 3, 99, 4, 5, 6, 99];
        let frame = GrayFrame::with_stride(data, 3, 2, 4).unwrap();
        assert_eq!(frame.brightness(0, 0), 1);
        assert_eq!(frame.brightness(2, 1), 6);
        assert_eq!(frame.brightness(3, 0), 0);
        assert_eq!(frame.brightness(-1, 0), 0);
    }

    #[test]
    fn test_working_copy_drops_padding() {
        let data = vec![1, 2, 3, 99, 4, 5, 6];
        let frame = GrayFrame::with_stride(data, 3, 2, 4).unwrap();
        let copy = frame.working_copy();
        assert_eq!(copy.into_raw(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_rejects_short_data() {
        assert!(GrayFrame::new(vec![0; 5], 3, 2).is_err());
        assert!(GrayFrame::new(vec![], 0, 2).is_err());
        assert!(GrayFrame::with_stride(vec![0; 6], 3, 2, 2).is_err());
    }

    #[test]
    fn test_from_image_converts_to_luma() {
        let rgb = image::RgbImage::from_pixel(4, 3, image::Rgb([255, 255, 255]));
        let frame = GrayFrame::from_image(&DynamicImage::ImageRgb8(rgb)).unwrap();
        assert_eq!((frame.width, frame.height, frame.stride), (4, 3, 4));
        assert_eq!(frame.brightness(3, 2), 255);
    }

    #[test]
    fn test_from_luma_rejects_empty_image() {
        let err = GrayFrame::from_luma(GrayImage::new(5, 0)).unwrap_err();
        assert_eq!(err.category(), "validation");
        assert!(GrayFrame::from_luma(GrayImage::new(0, 5)).is_err());
    }
}
