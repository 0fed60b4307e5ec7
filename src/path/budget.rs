//! # Budget Allocator
//!
//! Maps variable "ink demand" onto a fixed number of output samples.
//!
//! One frame computes a single scale factor, `capacity / total_demand`, and then
//! turns each demand unit into a whole number of samples in emission order. The
//! fractional part of every decision is carried into the next one:
//!
//! ```text
//! raw   = demand * scale + carry
//! count = floor(raw)
//! carry = raw - count
//! ```
//!
//! The carry is exactly the gap between the ideal cumulative allocation and the
//! samples handed out so far, so it stays in `[0, 1)` after every call and the
//! frame total lands within one sample of capacity. The result depends on call
//! order, which therefore has to be the emission order.

/// Scale factor for a frame, or `None` for an empty frame (nothing to draw).
pub fn allocate(total_demand: f64, capacity: usize) -> Option<f64> {
    if total_demand.is_finite() && total_demand > 0.0 {
        Some(capacity as f64 / total_demand)
    } else {
        None
    }
}

/// Carry-corrected sample count for one demand unit. Updates `carry`.
#[inline]
pub fn rounded_count(demand: f64, scale: f64, carry: &mut f64) -> usize {
    let raw = (demand * scale + *carry).max(0.0);
    let count = raw.floor();
    *carry = raw - count;
    count as usize
}

/// Proportional share without remainder redistribution:
/// `floor(demand * capacity / total)`, computed exactly in integers.
#[inline]
pub fn truncated_share(demand: u64, capacity: usize, total: u64) -> usize {
    if total == 0 {
        return 0;
    }
    (u128::from(demand) * capacity as u128 / u128::from(total)) as usize
}

/// Per-frame allocation state: scale, carry and running totals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BudgetAllocator {
    scale: f64,
    carry: f64,
    ideal: f64,
    allocated: u64,
}

impl BudgetAllocator {
    /// Start a frame. `None` when `total_demand` is zero (blank frame).
    pub fn new(total_demand: f64, capacity: usize) -> Option<Self> {
        allocate(total_demand, capacity).map(Self::with_scale)
    }

    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            carry: 0.0,
            ideal: 0.0,
            allocated: 0,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn carry(&self) -> f64 {
        self.carry
    }

    /// Samples handed out so far.
    pub fn allocated(&self) -> u64 {
        self.allocated
    }

    /// Ideal (fractional) minus actual cumulative allocation.
    pub fn drift(&self) -> f64 {
        self.ideal - self.allocated as f64
    }

    pub fn rounded_count(&mut self, demand: f64) -> usize {
        let count = rounded_count(demand, self.scale, &mut self.carry);
        self.ideal += demand.max(0.0) * self.scale;
        self.allocated += count as u64;
        count
    }
}
