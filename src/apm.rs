use crate::{
    constant::PROB_SCALE,
    counter::Counter,
    logistic::{squash, stretch},
};

// Adaptive Probability Map -------------------------------------------------------------------------------------- Adaptive Probability Map

/// Refines a probability given a context. Every context owns one counter
/// per input probability, seeded so that an untrained map returns (nearly)
/// its input. Only the cell selected by the last refine() is updated.
pub struct Apm {
    cells:     Vec<Counter>, // PROB_SCALE counters per context
    num_cxts:  usize,        // Number of possible contexts i.e 256 for order-0
    cell:      usize,        // Cell selected by the last refinement
    limit:     u32,          // Halving limit of cell counters
}
impl Apm {
    pub fn new(n: usize, limit: u32) -> Apm {
        assert!(n > 0);
        let identity = (0..PROB_SCALE as u16).map(Counter::seeded).collect::<Vec<Counter>>();
        Apm {
            cells:     identity.repeat(n),
            num_cxts:  n,
            cell:      0,
            limit,
        }
    }

    pub fn refine(&mut self, pr: u16, cxt: u32) -> u16 {
        assert!(u32::from(pr) < PROB_SCALE);
        assert!((cxt as usize) < self.num_cxts);
        self.cell = cxt as usize * PROB_SCALE as usize + pr as usize;
        self.cells[self.cell].p()
    }

    pub fn update(&mut self, bit: u8) {
        self.cells[self.cell].update_limited(bit, self.limit);
    }
}

/// Refines a probability by interpolating between 33 bins spread evenly
/// over the stretched domain. Both bins used by the last prediction move
/// towards the coded bit by 1/2^rate of their distance.
pub struct InterpolatedApm {
    bin:       usize,    // Lower bin used by the last prediction
    num_cxts:  usize,    // Number of possible contexts
    rate:      i32,      // Update shift (higher = slower)
    bin_map:   Vec<u16>, // 33 bins per context, squashed values * 16
}
impl InterpolatedApm {
    pub fn new(n: usize, rate: i32) -> InterpolatedApm {
        assert!(n > 0 && rate > 0 && rate < 16);
        let bins = (0..33).map(|i| (squash((i - 16) * 128) * 16) as u16).collect::<Vec<u16>>();
        InterpolatedApm {
            bin:       0,
            num_cxts:  n,
            rate,
            bin_map:   bins.repeat(n),
        }
    }

    pub fn p(&mut self, pr: u16, cxt: u32) -> u16 {
        assert!(u32::from(pr) < PROB_SCALE);
        assert!((cxt as usize) < self.num_cxts);

        let pr  = stretch(i32::from(pr)); // -2047 to 2047
        let i_w = pr & 127;               // Interpolation weight (33 points)

        // Compute set of bins from context, and singular bin from prediction
        self.bin = ((pr + 2048) >> 7) as usize + cxt as usize * 33;

        let l = i32::from(self.bin_map[self.bin]);     // Lower bin
        let u = i32::from(self.bin_map[self.bin + 1]); // Upper bin
        (((l * (128 - i_w)) + (u * i_w)) >> 11) as u16
    }

    pub fn update(&mut self, bit: u8) {
        let bit = i32::from(bit);

        // Target of the update, just above 65535 for a 1 so bins can reach it
        let g = (bit << 16) + (bit << self.rate) - bit - bit;

        let l = i32::from(self.bin_map[self.bin]);
        let u = i32::from(self.bin_map[self.bin + 1]);
        self.bin_map[self.bin]     = (l + ((g - l) >> self.rate)) as u16;
        self.bin_map[self.bin + 1] = (u + ((g - u) >> self.rate)) as u16;
    }
}
// ----------------------------------------------------------------------------------------------------------------------------------------
