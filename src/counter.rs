//! # Counter
//!
//! A nonstationary bit history: the number of zeros (n0) and ones (n1)
//! observed in one context, packed into a u64 with n0 in the low and n1
//! in the high 32 bits. When an increment would push a count past its
//! limit both counts are halved, which keeps their ratio while letting
//! old evidence decay relative to new.

use crate::{
    constant::PRECISION,
    hash_table::Slot,
};

/// Total count a seeded counter starts with.
const SEED_TOTAL: u32 = 127;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Counter(u64);
impl Counter {
    /// Create a counter holding the given counts.
    pub const fn new(n0: u32, n1: u32) -> Counter {
        Counter(((n1 as u64) << 32) | n0 as u64)
    }

    /// Create a counter whose estimate lies within 16 of probability p.
    pub fn seeded(p: u16) -> Counter {
        debug_assert!(u32::from(p) < 1 << PRECISION);
        let n1 = u32::from(p) >> 5;
        Counter::new(SEED_TOTAL - n1, n1)
    }

    pub fn n0(self) -> u32 {
        self.0 as u32
    }

    pub fn n1(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Probability that the next bit is 1.
    pub fn p(self) -> u16 {
        estimate(self.n0(), self.n1())
    }

    /// Record an observed bit, halving only when a count needs a 33rd bit.
    pub fn update(&mut self, bit: u8) {
        self.update_limited(bit, u32::MAX);
    }

    /// Record an observed bit, halving both counts whenever either
    /// exceeds limit.
    pub fn update_limited(&mut self, bit: u8, limit: u32) {
        debug_assert!(bit == 0 || bit == 1);
        let mut n0 = u64::from(self.n0());
        let mut n1 = u64::from(self.n1());
        if bit == 1 { n1 += 1; } else { n0 += 1; }

        if n0.max(n1) > u64::from(limit) {
            n0 >>= 1;
            n1 >>= 1;
        }
        *self = Counter::new(n0 as u32, n1 as u32);
    }
}
impl Slot for Counter {
    /// More total evidence means a slot is kept longer.
    fn priority(&self) -> u64 {
        u64::from(self.n0()) + u64::from(self.n1())
    }
}

/// Krichevsky-Trofimov estimate of P(1) from raw counts, in (0, 4096).
pub fn estimate(n0: u32, n1: u32) -> u16 {
    let n0 = 2 * u64::from(n0) + 1;
    let n1 = 2 * u64::from(n1) + 1;
    ((n1 << PRECISION) / (n0 + n1)).max(1) as u16
}
