//! # Mixer
//!
//! Combines stretched predictions with a weighted sum in the logistic
//! domain. Each context set selects one row of weights; when more than
//! one set is selected the per-row predictions are mixed again by a
//! second layer with a single row. Weights are trained online from the
//! coding error of the bit that was just predicted.

use crate::{
    config::{AdaptiveRate, MixerConfig},
    logistic::{ilog2, squash, stretch},
};

/// Vector width used by dot product and training. Every width produces
/// bit-identical results; X1 is the reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lanes {
    X1,
    X4,
    X8,
    X16,
}
impl Lanes {
    pub fn width(self) -> usize {
        match self {
            Lanes::X1  => 1,
            Lanes::X4  => 4,
            Lanes::X8  => 8,
            Lanes::X16 => 16,
        }
    }
}

fn dot_product<const L: usize>(inputs: &[i32], weights: &[i32]) -> i64 {
    let mut acc = [0i64; L];
    for (x, w) in inputs.chunks_exact(L).zip(weights.chunks_exact(L)) {
        for k in 0..L {
            acc[k] += i64::from(x[k]) * i64::from(w[k]);
        }
    }
    acc.iter().sum::<i64>() >> 16
}

fn train<const L: usize>(inputs: &[i32], weights: &mut [i32], err: i32) {
    for (x, w) in inputs.chunks_exact(L).zip(weights.chunks_exact_mut(L)) {
        for k in 0..L {
            w[k] = w[k].saturating_add((x[k] * err + 0x8000) >> 16);
        }
    }
}

fn dot_product_lanes(lanes: Lanes, inputs: &[i32], weights: &[i32]) -> i64 {
    match lanes {
        Lanes::X1  => dot_product::<1>(inputs, weights),
        Lanes::X4  => dot_product::<4>(inputs, weights),
        Lanes::X8  => dot_product::<8>(inputs, weights),
        Lanes::X16 => dot_product::<16>(inputs, weights),
    }
}

fn train_lanes(lanes: Lanes, inputs: &[i32], weights: &mut [i32], err: i32) {
    match lanes {
        Lanes::X1  => train::<1>(inputs, weights, err),
        Lanes::X4  => train::<4>(inputs, weights, err),
        Lanes::X8  => train::<8>(inputs, weights, err),
        Lanes::X16 => train::<16>(inputs, weights, err),
    }
}

/// Rolling record of the last 16 log2 error magnitudes of one row.
#[derive(Clone, Copy, Debug, Default)]
struct ErrorInfo {
    data:       [u32; 2], // 16 nibbles, newest in the low bits of data[0]
    sum:        u32,      // Sum of squares of the recorded nibbles
    mask:       u32,      // Bit set when a sample was no worse than its predecessor
    collected:  u32,      // Samples since the last reset
}

#[derive(Clone, Copy, Debug)]
struct RowRate {
    rate:  i32,
    info:  ErrorInfo,
}

impl AdaptiveRate {
    /// Record a coding error and reset or decay the learning rate.
    fn adjust(&self, row: &mut RowRate, default_rate: i32, err: i32) {
        let info = &mut row.info;
        let log_err = ilog2(err.unsigned_abs()).min(15);

        let oldest = info.data[1] >> 28;
        info.sum -= oldest * oldest;
        info.data[1] = (info.data[1] << 4) | (info.data[0] >> 28);
        info.data[0] = (info.data[0] << 4) | log_err;
        info.sum += log_err * log_err;
        if info.collected < self.window { info.collected += 1; }
        info.mask = (info.mask << 1) | u32::from(log_err <= (info.data[0] >> 4) & 0xF);

        let count = info.mask.count_ones();
        let rate  = row.rate as u32;
        if info.collected >= self.min_samples
        && (info.sum > self.reset_sum + rate / 1024
            || count < self.reset_count
            || info.mask & 0xFF == 0) {
            row.rate = default_rate;
            row.info = ErrorInfo::default();
        }
        else if info.collected == self.window
        && (self.stable_sum_min..=self.stable_sum_max).contains(&info.sum)
        && count > self.stable_count.saturating_sub(rate / 65536)
        && info.mask & 0xFF == 0xFF {
            row.rate = (row.rate - (row.rate >> self.decay_shift)).max(self.min_rate);
            row.info = ErrorInfo::default();
        }
    }
}

pub struct Mixer {
    max_in:    usize,              // Maximum number of inputs
    width:     usize,              // max_in rounded up to the lane width
    rows:      usize,              // Weight rows over all context sets
    set_sizes: Vec<usize>,         // Rows of each context set
    inputs:    Vec<i32>,           // Current inputs
    weights:   Vec<i32>,           // rows * width weights
    rates:     Vec<RowRate>,       // Learning rate of each row
    selected:  Vec<usize>,         // Row chosen by each context set
    base:      usize,              // First row of the next context set
    pr:        Vec<i32>,           // Prediction of each selected row
    cfg:       MixerConfig,
    next:      Option<Box<Mixer>>, // Second layer, present when sets > 1
    mixed:     bool,               // The second layer produced the last prediction
}
impl Mixer {
    /// Create a mixer of n inputs. Each entry of set_sizes declares a
    /// context set with that many rows; second_layer configures the mixer
    /// combining the sets when there is more than one.
    pub fn new(n: usize, set_sizes: &[usize], cfg: MixerConfig, second_layer: MixerConfig) -> Mixer {
        assert!(!set_sizes.is_empty() && set_sizes.iter().all(|&s| s > 0));
        let mut mxr = Mixer::layer(n, set_sizes, cfg);
        if set_sizes.len() > 1 {
            mxr.next = Some(Box::new(Mixer::layer(set_sizes.len(), &[1], second_layer)));
        }
        mxr
    }

    fn layer(n: usize, set_sizes: &[usize], cfg: MixerConfig) -> Mixer {
        assert!(n > 0);
        let rows: usize = set_sizes.iter().sum();
        let sets = set_sizes.len();
        let lanes = cfg.lanes.width();
        let width = (n + lanes - 1) / lanes * lanes;
        let init = cfg.init_weight.unwrap_or((1 << 16) / n as i32);

        // Padding columns stay zero so they never contribute.
        let mut weights = vec![0; rows * width];
        for row in weights.chunks_exact_mut(width) {
            row[..n].iter_mut().for_each(|w| *w = init);
        }

        Mixer {
            max_in:    n,
            width,
            rows,
            set_sizes: set_sizes.to_vec(),
            inputs:    Vec::with_capacity(width),
            weights,
            rates:     vec![RowRate { rate: cfg.rate, info: ErrorInfo::default() }; rows],
            selected:  Vec::with_capacity(sets),
            base:      0,
            pr:        Vec::with_capacity(sets),
            cfg,
            next:      None,
            mixed:     false,
        }
    }

    /// Add a stretched prediction (-2047..=2047) as the next input.
    pub fn add(&mut self, st: i32) {
        assert!(self.inputs.len() < self.max_in);
        debug_assert!((-2047..=2047).contains(&st));
        self.inputs.push(st);
    }

    /// Select row cxt of the next context set, which has `size` rows.
    pub fn set(&mut self, cxt: u32, size: usize) {
        assert!(self.selected.len() < self.set_sizes.len());
        assert_eq!(size, self.set_sizes[self.selected.len()], "context set size differs from the declared size");
        assert!((cxt as usize) < size && self.base + size <= self.rows);
        self.selected.push(self.base + cxt as usize);
        self.base += size;
    }

    /// Mix the current inputs into a 12 bit prediction.
    pub fn p(&mut self) -> i32 {
        assert!(!self.selected.is_empty(), "no mixer context selected");
        self.inputs.resize(self.width, 0);

        self.pr.clear();
        for i in 0..self.selected.len() {
            let row = self.selected[i];
            let w = &self.weights[row * self.width..(row + 1) * self.width];
            let dot = dot_product_lanes(self.cfg.lanes, &self.inputs, w);
            let dp = (dot * i64::from(self.cfg.scale)) >> 8;
            self.pr.push(squash(dp.clamp(-2047, 2047) as i32));
        }

        match self.next.as_mut() {
            Some(next) if self.pr.len() > 1 => {
                self.mixed = true;
                for &pr in self.pr.iter() {
                    next.add(stretch(pr));
                }
                next.set(0, 1);
                next.p()
            }
            _ => {
                self.mixed = false;
                self.pr[0]
            }
        }
    }

    /// Train the rows used by the last prediction, then clear the inputs
    /// and context selection for the next bit.
    pub fn update(&mut self, bit: u8) {
        debug_assert!(bit == 0 || bit == 1);
        for (i, &row) in self.selected.iter().enumerate() {
            let err = (i32::from(bit) << 12) - self.pr[i];
            let rate = &mut self.rates[row];
            if let Some(adaptive) = &self.cfg.adaptive {
                adaptive.adjust(rate, self.cfg.rate, err);
            }
            let err = ((i64::from(err) * i64::from(rate.rate)) >> 16) as i32;
            let w = &mut self.weights[row * self.width..(row + 1) * self.width];
            train_lanes(self.cfg.lanes, &self.inputs, w, err);
        }

        if self.mixed {
            if let Some(next) = self.next.as_mut() {
                next.update(bit);
            }
        }
        self.inputs.clear();
        self.selected.clear();
        self.base = 0;
        self.mixed = false;
    }

    /// Current learning rate of a row, 16.16 fixed point.
    pub fn rate(&self, row: usize) -> i32 {
        self.rates[row].rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(rng: &fastrand::Rng, n: usize) -> Vec<i32> {
        (0..n).map(|_| rng.i32(-2047..=2047)).collect()
    }

    #[test]
    fn lane_widths_agree() {
        let rng = fastrand::Rng::with_seed(7);
        for n in [16, 32, 48] {
            let x = inputs(&rng, n);
            let mut w = inputs(&rng, n).iter().map(|v| v * 64).collect::<Vec<i32>>();
            let reference = dot_product::<1>(&x, &w);
            assert_eq!(reference, dot_product::<4>(&x, &w));
            assert_eq!(reference, dot_product::<8>(&x, &w));
            assert_eq!(reference, dot_product::<16>(&x, &w));

            let mut w4 = w.clone();
            let mut w16 = w.clone();
            train::<1>(&x, &mut w, -12_345);
            train::<4>(&x, &mut w4, -12_345);
            train::<16>(&x, &mut w16, -12_345);
            assert_eq!(w, w4);
            assert_eq!(w, w16);
        }
    }

    #[test]
    fn mixers_of_different_widths_predict_identically() {
        let rng = fastrand::Rng::with_seed(11);
        let mut mixers = [Lanes::X1, Lanes::X4, Lanes::X8, Lanes::X16]
            .iter()
            .map(|&lanes| {
                let cfg = MixerConfig { lanes, ..MixerConfig::default() };
                let fin = MixerConfig { lanes, ..MixerConfig::final_layer() };
                Mixer::new(5, &[3, 4], cfg, fin)
            })
            .collect::<Vec<Mixer>>();

        for _ in 0..2000 {
            let x = inputs(&rng, 5);
            let (c1, c2) = (rng.u32(0..3), rng.u32(0..4));
            let bit = rng.u8(0..2);
            let mut prs = Vec::new();
            for m in mixers.iter_mut() {
                x.iter().for_each(|&v| m.add(v));
                m.set(c1, 3);
                m.set(c2, 4);
                prs.push(m.p());
                m.update(bit);
            }
            assert!(prs.windows(2).all(|p| p[0] == p[1]));
        }
    }

    #[test]
    fn erratic_errors_reset_rate() {
        let cfg = MixerConfig {
            adaptive: Some(AdaptiveRate::default()),
            ..MixerConfig::default()
        };
        let mut row = RowRate { rate: cfg.rate / 2, info: ErrorInfo::default() };
        let adaptive = cfg.adaptive.unwrap();
        // Maximal errors every time: the error energy exceeds the reset sum.
        for _ in 0..adaptive.min_samples {
            adaptive.adjust(&mut row, cfg.rate, 4095);
        }
        assert_eq!(row.rate, cfg.rate);
    }

    #[test]
    fn steady_small_errors_decay_rate() {
        let adaptive = AdaptiveRate::default();
        let default_rate = 7 << 16;
        let mut row = RowRate { rate: default_rate, info: ErrorInfo::default() };
        // log2(6) = 2, 16 * 2 * 2 = 64 is inside the stable energy band.
        for _ in 0..adaptive.window {
            adaptive.adjust(&mut row, default_rate, 6);
        }
        assert_eq!(row.rate, default_rate - (default_rate >> adaptive.decay_shift));
    }

    #[test]
    #[should_panic(expected = "context set size differs")]
    fn set_size_must_match_declaration() {
        let mut mxr = Mixer::new(2, &[3, 5], MixerConfig::default(), MixerConfig::final_layer());
        mxr.add(0);
        mxr.set(0, 3);
        // Fits in the rows left over, but is not the second set's size.
        mxr.set(0, 4);
    }
}
