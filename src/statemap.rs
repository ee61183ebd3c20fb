//! # State Map
//!
//! Maps a small context (a match length, a bit history, ...) to an
//! adaptive probability. Each entry has a 22-bit probability (initially
//! p = 0.5) and a 10-bit count (initially n = 0) packed into 32 bits.
//! After bit y is known, n is incremented up to LIMIT and the probability
//! is adjusted by p := p + (y - p)/(n + 1.5).

use crate::logistic::RECIPROCALS;

#[allow(overflowing_literals)]
const PR_MSK: i32 = 0xFFFFFC00; // High 22 bit mask
const LIMIT: u32 = 127; // Controls rate of adaptation (higher = slower) (0..1024)

#[derive(Clone)]
pub struct StateMap {
    cxt:      usize,    // Context of last prediction
    cxt_map:  Vec<u32>, // Maps a context to a prediction and a count
}
impl StateMap {
    /// Create a new StateMap with n contexts.
    pub fn new(n: usize) -> StateMap {
        assert!(n > 0);
        StateMap {
            cxt:      0,
            cxt_map:  vec![1 << 31; n],
        }
    }

    /// Maps a context to a 12 bit prediction.
    pub fn p(&mut self, cxt: usize) -> i32 {
        assert!(cxt < self.cxt_map.len());
        self.cxt = cxt;
        (self.cxt_map[self.cxt] >> 20) as i32
    }

    /// Update the entry used by the last prediction.
    pub fn update(&mut self, bit: u8) {
        let entry = &mut self.cxt_map[self.cxt];
        let count = *entry & 1023;      // Low 10 bits
        let pr    = (*entry >> 10) as i32; // High 22 bits

        if count < LIMIT { *entry += 1; }

        let pr_err = ((i32::from(bit) << 22) - pr) >> 3;
        let rec_v  = i32::from(RECIPROCALS[count as usize]);
        *entry = entry.wrapping_add((pr_err.wrapping_mul(rec_v) & PR_MSK) as u32);
    }
}
