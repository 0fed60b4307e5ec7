//! # Coordinate Mapper
//!
//! Maps source-raster points into the device's 8-bit coordinate space.
//!
//! Each axis is scaled linearly, `device = source * range / extent`. The
//! vertical axis is inverted: source row 0 (top of the image) lands on the
//! device's maximum Y, matching the bottom-up convention of scanning displays.
//!
//! ## Dithering
//!
//! With dithering enabled the mapping is first done at double the native
//! resolution (9 bits per axis). That fine value is folded back to 8 bits by
//! halving, adding one when the fine value is odd *and* the sample's temporal
//! parity bit is set. A point emitted repeatedly alternates parity, so its beam
//! spends half of its dwell time on each neighbouring device coordinate and the
//! perceived position lands between them.

use beam_trace::Point;

/// Largest native device coordinate.
pub const NATIVE_MAX: u16 = u8::MAX as u16;
/// Largest coordinate at double resolution.
pub const FINE_MAX: u16 = NATIVE_MAX * 2 + 1;

/// Fold a double-resolution value to native resolution.
#[inline]
pub fn fold(fine: u16, parity: bool) -> u8 {
    let carry = u16::from(fine & 1 == 1 && parity);
    ((fine >> 1) + carry).min(NATIVE_MAX) as u8
}

/// Scale `value` from `0..=extent` onto `0..=range`, clamping out-of-range input.
#[inline]
fn scale_axis(value: i32, extent: u32, range: u16) -> u16 {
    let extent = i64::from(extent.max(1));
    let v = i64::from(value).clamp(0, extent);
    (v * i64::from(range) / extent) as u16
}

/// Source-to-device mapping for one frame geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinateMapper {
    source_width: u32,
    source_height: u32,
    dither: bool,
}

impl CoordinateMapper {
    pub fn new(source_width: u32, source_height: u32, dither: bool) -> Self {
        Self {
            source_width,
            source_height,
            dither,
        }
    }

    pub fn dither(&self) -> bool {
        self.dither
    }

    /// Map at double resolution, Y inverted.
    pub fn map_fine(&self, point: Point) -> (u16, u16) {
        let x = scale_axis(point.x, self.source_width, FINE_MAX);
        let y = FINE_MAX - scale_axis(point.y, self.source_height, FINE_MAX);
        (x, y)
    }

    /// Map to device coordinates. `parity` only matters when dithering.
    pub fn map(&self, point: Point, parity: bool) -> (u8, u8) {
        if self.dither {
            let (fx, fy) = self.map_fine(point);
            (fold(fx, parity), fold(fy, parity))
        } else {
            let x = scale_axis(point.x, self.source_width, NATIVE_MAX);
            let y = NATIVE_MAX - scale_axis(point.y, self.source_height, NATIVE_MAX);
            (x as u8, y as u8)
        }
    }

    /// Both temporal variants of a point, indexed by parity. Identical when
    /// dithering is off.
    pub fn variants(&self, point: Point) -> [(u8, u8); 2] {
        [self.map(point, false), self.map(point, true)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_mapping_inverts_y() {
        let m = CoordinateMapper::new(100, 100, false);
        assert_eq!(m.map(Point::new(0, 0), false), (0, 255));
        assert_eq!(m.map(Point::new(100, 100), false), (255, 0));
        assert_eq!(m.map(Point::new(50, 50), true), (127, 128));
    }

    #[test]
    fn test_out_of_range_points_clamp() {
        let m = CoordinateMapper::new(10, 10, false);
        assert_eq!(m.map(Point::new(-5, 20), false), (0, 0));
        assert_eq!(m.map(Point::new(40, -1), false), (255, 255));
    }

    #[test]
    fn test_fold_carries_only_odd_with_parity() {
        assert_eq!(fold(10, false), 5);
        assert_eq!(fold(10, true), 5);
        assert_eq!(fold(11, false), 5);
        assert_eq!(fold(11, true), 6);
        // carry never exceeds the native maximum
        assert_eq!(fold(FINE_MAX, true), 255);
    }

    #[test]
    fn test_dither_variants_straddle_fine_position() {
        let m = CoordinateMapper::new(511, 511, true);
        // fine x = 3, fine y = 511 - 0 = 511
        let [even, odd] = m.variants(Point::new(3, 0));
        assert_eq!(even, (1, 255));
        assert_eq!(odd, (2, 255));

        // even fine coordinates do not move
        let [even, odd] = m.variants(Point::new(4, 511));
        assert_eq!(even, odd);
        assert_eq!(even, (2, 0));
    }

    #[test]
    fn test_plain_variants_identical() {
        let m = CoordinateMapper::new(64, 48, false);
        let [a, b] = m.variants(Point::new(13, 7));
        assert_eq!(a, b);
    }
}
