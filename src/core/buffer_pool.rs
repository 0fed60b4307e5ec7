//! # Sample Buffer Pool
//!
//! Reuses sample storage across frames so steady-state operation does not
//! allocate a fresh output buffer per frame.
//!
//! ## Overview
//!
//! - **Problem**: every frame needs a buffer of `width * height` samples, which
//!   for an 800x600 device is 480 000 records
//! - **Solution**: finished frames give their storage back and the next frame
//!   reuses it
//! - **Correctness**: pooling is an optimisation only. A reused buffer is
//!   cleared when acquired and generators always fill it to capacity, so stale
//!   samples are never visible to a consumer
//!
//! ```text
//! ┌─────────────┐ acquire ┌──────────────┐ finish ┌─────────────┐
//! │ SamplePool  │────────▶│  Generator   │───────▶│ VectorFrame │
//! │             │◀────────┴──────────────┴────────│  consumer   │
//! └─────────────┘            recycle              └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use beamscan::core::buffer_pool::SamplePool;
//!
//! let pool = SamplePool::new(4);
//! let buffer = pool.acquire(800 * 600)?;
//! assert_eq!(buffer.capacity(), 800 * 600);
//!
//! pool.recycle(buffer.into_storage());
//! assert_eq!(pool.stats(), (1, 4));
//! # Ok::<(), beamscan::error::BeamError>(())
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::sample::{Sample, SampleBuffer};
use crate::error::BeamResult;

/// Bounded pool of sample storage.
///
/// Thread-safe so that storage can be recycled from a consumer thread while the
/// generator thread acquires the next buffer.
#[derive(Debug)]
pub struct SamplePool {
    /// Idle storage, most recently returned last
    buffers: Mutex<VecDeque<Vec<Sample>>>,
    /// Maximum number of idle buffers kept
    max_buffers: usize,
}

impl SamplePool {
    pub fn new(max_buffers: usize) -> Self {
        Self {
            buffers: Mutex::new(VecDeque::with_capacity(max_buffers)),
            max_buffers,
        }
    }

    fn idle(&self) -> MutexGuard<'_, VecDeque<Vec<Sample>>> {
        // Stored vectors are cleared on reuse, so a poisoned lock holds nothing unsafe.
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get an empty buffer of exactly `capacity` samples.
    ///
    /// Reuses idle storage when available. Fails with a resource error if fresh
    /// memory cannot be reserved; no partially sized buffer is ever returned.
    pub fn acquire(&self, capacity: usize) -> BeamResult<SampleBuffer> {
        let storage = self.idle().pop_front().unwrap_or_default();
        SampleBuffer::from_storage(storage, capacity)
    }

    /// Return storage for reuse. Dropped if the pool is already full.
    pub fn recycle(&self, storage: Vec<Sample>) {
        if storage.capacity() == 0 {
            return;
        }
        let mut buffers = self.idle();
        if buffers.len() < self.max_buffers {
            buffers.push_back(storage);
        }
    }

    /// `(idle_buffers, max_buffers)`
    pub fn stats(&self) -> (usize, usize) {
        (self.idle().len(), self.max_buffers)
    }

    /// Drop all idle storage, e.g. after the output resolution changed.
    pub fn clear(&self) {
        self.idle().clear();
    }
}
