//! Common test utilities and helpers for the beamscan tests
//!
//! Frame builders, image fixtures and assertions shared by the integration
//! test binaries.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use beamscan::{GrayFrame, Sample};

/// Test frame generators
pub mod test_frames {
    use super::*;

    /// Frame whose pixel values come from `f(x, y)`.
    pub fn gray_frame(w: u32, h: u32, f: impl Fn(u32, u32) -> u8) -> GrayFrame {
        let data = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        GrayFrame::new(data, w, h).expect("valid test frame")
    }

    pub fn black(w: u32, h: u32) -> GrayFrame {
        gray_frame(w, h, |_, _| 0)
    }

    /// Black frame with a filled rectangle of `value` over `[x0, x1) x [y0, y1)`.
    pub fn rect(w: u32, h: u32, (x0, y0, x1, y1): (u32, u32, u32, u32), value: u8) -> GrayFrame {
        gray_frame(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                value
            } else {
                0
            }
        })
    }

    /// Deterministic pseudo-random texture (xorshift over the pixel index).
    pub fn noise(w: u32, h: u32, seed: u32) -> GrayFrame {
        gray_frame(w, h, |x, y| {
            let mut v = (y * w + x).wrapping_mul(2_654_435_761) ^ seed;
            v ^= v << 13;
            v ^= v >> 17;
            v ^= v << 5;
            (v >> 24) as u8
        })
    }

    /// Save a luma frame as PNG under `dir`.
    pub fn write_png(dir: &Path, name: &str, frame: &GrayFrame) -> PathBuf {
        let path = dir.join(name);
        let img = image::GrayImage::from_raw(frame.width, frame.height, frame.data.to_vec())
            .expect("tightly packed frame");
        img.save(&path).expect("write png fixture");
        path
    }
}

/// Custom assertions for sample output
pub mod assertions {
    use super::*;

    pub fn assert_exact_capacity(samples: &[Sample], capacity: usize) {
        assert_eq!(
            samples.len(),
            capacity,
            "expected exactly {} samples, got {}",
            capacity,
            samples.len()
        );
    }

    pub fn assert_all_parked(samples: &[Sample], park: (u8, u8)) {
        for (i, s) in samples.iter().enumerate() {
            assert_eq!(
                *s,
                Sample::off(park.0, park.1),
                "sample {} is not a parked beam-off sample",
                i
            );
        }
    }

    /// Records are `[x, y, z, 0]` and intensity is only ever full on or off.
    pub fn assert_well_formed_records(bytes: &[u8]) {
        assert_eq!(bytes.len() % 4, 0, "partial record");
        for record in bytes.chunks_exact(4) {
            assert_eq!(record[3], 0, "padding byte must be zero");
            assert!(record[2] == 0x00 || record[2] == 0xFF, "unexpected intensity");
        }
    }
}
