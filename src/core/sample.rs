//! # Output Samples and the Fixed-Capacity Sample Buffer
//!
//! A [`Sample`] is one beam position: two 8-bit device coordinates and an 8-bit
//! beam intensity. On the wire every sample occupies a 4-byte record:
//!
//! ```text
//! byte 0   byte 1   byte 2      byte 3
//! ┌────────┬────────┬───────────┬─────────┐
//! │   x    │   y    │ intensity │ padding │
//! └────────┴────────┴───────────┴─────────┘
//! ```
//!
//! The 32-bit pattern view of a record is little-endian, so `x` is the least
//! significant byte.
//!
//! A [`SampleBuffer`] is the append target of both path generators. Its
//! capacity is fixed when it is created and every append is bounds-checked and
//! reports how many samples actually landed, so an emission site can never
//! write past the end. [`SampleBuffer::finish`] only hands the samples out when
//! the buffer is exactly full.

use crate::error::{BeamError, BeamResult};

/// Size in bytes of one packed sample record.
pub const RECORD_SIZE: usize = 4;

/// One beam position in device space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sample {
    pub x: u8,
    pub y: u8,
    /// Beam intensity; the generators only ever emit full on or full off.
    pub z: u8,
}

impl Sample {
    pub const BEAM_ON: u8 = 0xFF;
    pub const BEAM_OFF: u8 = 0x00;

    pub const fn on(x: u8, y: u8) -> Self {
        Self {
            x,
            y,
            z: Self::BEAM_ON,
        }
    }

    pub const fn off(x: u8, y: u8) -> Self {
        Self {
            x,
            y,
            z: Self::BEAM_OFF,
        }
    }

    pub const fn is_on(self) -> bool {
        self.z != Self::BEAM_OFF
    }

    /// Pack into a record; the padding byte is always zero.
    pub const fn pack(self) -> [u8; RECORD_SIZE] {
        [self.x, self.y, self.z, 0]
    }

    pub const fn unpack(record: [u8; RECORD_SIZE]) -> Self {
        Self {
            x: record[0],
            y: record[1],
            z: record[2],
        }
    }

    pub const fn pack_u32(self) -> u32 {
        u32::from_le_bytes(self.pack())
    }

    pub const fn unpack_u32(pattern: u32) -> Self {
        Self::unpack(pattern.to_le_bytes())
    }
}

/// Serialize samples into consecutive records, in path order.
pub fn pack_samples(samples: &[Sample], out: &mut Vec<u8>) {
    out.reserve(samples.len() * RECORD_SIZE);
    for s in samples {
        out.extend_from_slice(&s.pack());
    }
}

/// Parse consecutive records. Trailing bytes that do not form a whole record are rejected.
pub fn unpack_samples(bytes: &[u8]) -> BeamResult<Vec<Sample>> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(BeamError::validation(
            "record_stream",
            "length must be a multiple of 4",
            bytes.len().to_string(),
        ));
    }
    Ok(bytes
        .chunks_exact(RECORD_SIZE)
        .map(|c| Sample::unpack([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Fixed-capacity, append-only sample sequence.
#[derive(Debug)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    capacity: usize,
}

impl SampleBuffer {
    /// Allocate a fresh buffer. Allocation failure is reported, never aborts.
    pub fn try_with_capacity(capacity: usize) -> BeamResult<Self> {
        Self::from_storage(Vec::new(), capacity)
    }

    /// Reuse `storage` as the backing memory for a buffer of `capacity` samples.
    ///
    /// Existing contents are discarded; the storage grows if it is too small.
    pub fn from_storage(mut storage: Vec<Sample>, capacity: usize) -> BeamResult<Self> {
        storage.clear();
        if storage.capacity() < capacity {
            storage.try_reserve_exact(capacity).map_err(|e| {
                BeamError::resource("sample_buffer", e.to_string())
                    .with_metadata("capacity", capacity.to_string())
            })?;
        }
        Ok(Self {
            samples: storage,
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.samples.len()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Append one sample. Returns 1 if it fit, 0 otherwise.
    pub fn push(&mut self, sample: Sample) -> usize {
        self.push_repeat(sample, 1)
    }

    /// Append `count` copies of `sample`, clipped to the remaining capacity.
    /// Returns the number written.
    pub fn push_repeat(&mut self, sample: Sample, count: usize) -> usize {
        let n = count.min(self.remaining());
        self.samples.extend(std::iter::repeat_n(sample, n));
        n
    }

    /// Append up to `count` samples produced by `f`, clipped to the remaining
    /// capacity. `f` receives the absolute buffer index of the sample it
    /// produces. Returns the number written.
    pub fn push_with<F>(&mut self, count: usize, mut f: F) -> usize
    where
        F: FnMut(usize) -> Sample,
    {
        let n = count.min(self.remaining());
        let start = self.samples.len();
        self.samples.extend((start..start + n).map(&mut f));
        n
    }

    /// Fill all remaining capacity with `sample`. Returns the number written.
    pub fn fill_remaining(&mut self, sample: Sample) -> usize {
        let n = self.remaining();
        self.push_repeat(sample, n)
    }

    /// Hand out the samples. Fails unless the buffer is exactly full.
    pub fn finish(self) -> BeamResult<Vec<Sample>> {
        if !self.is_full() {
            return Err(BeamError::capacity(self.capacity, self.samples.len()));
        }
        Ok(self.samples)
    }

    /// Give the backing memory back without the capacity check.
    pub fn into_storage(self) -> Vec<Sample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let s = Sample::on(0x12, 0x34);
        assert_eq!(s.pack(), [0x12, 0x34, 0xFF, 0x00]);
        assert_eq!(s.pack_u32(), 0x00FF_3412);
        assert_eq!(Sample::unpack_u32(0x00FF_3412), s);
        // padding is ignored on the way in
        assert_eq!(Sample::unpack([1, 2, 0, 0xAA]), Sample::off(1, 2));
    }

    #[test]
    fn test_unpack_rejects_partial_record() {
        assert!(unpack_samples(&[1, 2, 3]).is_err());
        let mut bytes = Vec::new();
        pack_samples(&[Sample::on(1, 2), Sample::off(3, 4)], &mut bytes);
        assert_eq!(bytes.len(), 8);
        assert_eq!(
            unpack_samples(&bytes).unwrap(),
            vec![Sample::on(1, 2), Sample::off(3, 4)]
        );
    }

    #[test]
    fn test_push_clips_to_capacity() {
        let mut buf = SampleBuffer::try_with_capacity(5).unwrap();
        assert_eq!(buf.push_repeat(Sample::on(1, 1), 3), 3);
        assert_eq!(buf.push_repeat(Sample::on(2, 2), 3), 2);
        assert_eq!(buf.push(Sample::on(3, 3)), 0);
        assert!(buf.is_full());
        assert_eq!(buf.samples()[4], Sample::on(2, 2));
    }

    #[test]
    fn test_push_with_passes_absolute_index() {
        let mut buf = SampleBuffer::try_with_capacity(6).unwrap();
        buf.push(Sample::off(0, 0));
        let written = buf.push_with(10, |i| Sample::on(i as u8, 0));
        assert_eq!(written, 5);
        let xs: Vec<u8> = buf.samples().iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_finish_requires_full_buffer() {
        let mut buf = SampleBuffer::try_with_capacity(4).unwrap();
        buf.push(Sample::on(9, 9));
        let err = SampleBuffer::from_storage(buf.into_storage(), 4)
            .unwrap()
            .finish()
            .unwrap_err();
        assert_eq!(err.category(), "capacity");

        let mut buf = SampleBuffer::try_with_capacity(4).unwrap();
        buf.push(Sample::on(9, 9));
        assert_eq!(buf.fill_remaining(Sample::off(0, 0)), 3);
        assert_eq!(buf.finish().unwrap().len(), 4);
    }

    #[test]
    fn test_reused_storage_is_cleared() {
        let mut buf = SampleBuffer::try_with_capacity(3).unwrap();
        buf.fill_remaining(Sample::on(7, 7));
        let reused = SampleBuffer::from_storage(buf.into_storage(), 3).unwrap();
        assert!(reused.is_empty());
        assert_eq!(reused.remaining(), 3);
    }

    #[test]
    fn test_absurd_capacity_reports_resource_error() {
        let err = SampleBuffer::try_with_capacity(usize::MAX / 2).unwrap_err();
        assert_eq!(err.category(), "resource");
    }
}
