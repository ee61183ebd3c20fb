use crate::{
    error::{Error, Result},
    mixer::Lanes,
};

/// Longest context order a context model accepts.
pub const MAX_ORDER: u8 = 8;

/// Thresholds of the mixer's adaptive learning rate. The defaults are
/// empirically tuned; change them only against measured compression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdaptiveRate {
    pub min_samples:     u32, // Samples needed before a reset is considered
    pub window:          u32, // Samples needed before a decay is considered
    pub reset_sum:       u32, // Reset when the error energy exceeds this (plus rate/1024)
    pub reset_count:     u32, // Reset when fewer improving samples are seen
    pub stable_sum_min:  u32, // Decay only when the error energy is in
    pub stable_sum_max:  u32, // stable_sum_min..=stable_sum_max
    pub stable_count:    u32, // Decay needs more than this (minus rate/65536) improving samples
    pub decay_shift:     u32, // Decay removes rate >> decay_shift
    pub min_rate:        i32, // Rate never decays below this
}
impl Default for AdaptiveRate {
    fn default() -> AdaptiveRate {
        AdaptiveRate {
            min_samples:     64,
            window:          4096,
            reset_sum:       1500,
            reset_count:     9,
            stable_sum_min:  56,
            stable_sum_max:  144,
            stable_count:    28,
            decay_shift:     4,
            min_rate:        1 << 16,
        }
    }
}

/// Settings of one mixer layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MixerConfig {
    pub rate:         i32,                  // Learning rate, 16.16 fixed point
    pub scale:        i32,                  // Output scale, 8.8 fixed point
    pub init_weight:  Option<i32>,          // Initial weight, None = 1/inputs
    pub lanes:        Lanes,                // Vector width of dot product and training
    pub adaptive:     Option<AdaptiveRate>, // Per row learning rate control
}
impl Default for MixerConfig {
    fn default() -> MixerConfig {
        MixerConfig {
            rate:         7 << 16,
            scale:        256,
            init_weight:  Some(0),
            lanes:        Lanes::X8,
            adaptive:     Some(AdaptiveRate::default()),
        }
    }
}
impl MixerConfig {
    /// Defaults of a second layer mixer, which starts out averaging its inputs.
    pub fn final_layer() -> MixerConfig {
        MixerConfig {
            rate:         3 << 16,
            init_weight:  None,
            adaptive:     None,
            ..MixerConfig::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.rate <= 0 || self.rate > 16 << 16 {
            return Err(Error::InvalidLearningRate(self.rate));
        }
        if let Some(adaptive) = &self.adaptive {
            if adaptive.min_rate <= 0 || adaptive.min_rate > self.rate {
                return Err(Error::InvalidLearningRate(adaptive.min_rate));
            }
            if adaptive.decay_shift >= 31 {
                return Err(Error::InvalidDecayShift(adaptive.decay_shift));
            }
            if adaptive.window < adaptive.min_samples {
                return Err(Error::InvalidRateWindow {
                    window:       adaptive.window,
                    min_samples:  adaptive.min_samples,
                });
            }
        }
        Ok(())
    }
}

/// User defined configuration settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub mem:            u32,         // Memory option, tables get 1 << (20 + mem) bytes
    pub orders:         Vec<u8>,     // Context orders of the context model
    pub counter_limit:  u32,         // Halving limit of context model counters
    pub mixer:          MixerConfig, // First mixer layer
    pub final_mixer:    MixerConfig, // Second mixer layer
    pub apm_limit:      u32,         // Halving limit of APM cells
    pub apm_rate:       i32,         // Update shift of the interpolated APM
    pub match_min_len:  usize,       // Bytes hashed to find match candidates
    pub quiet:          bool,        // Suppresses progress output
}
impl Default for Config {
    fn default() -> Config {
        Config {
            mem:            3,
            orders:         vec![1, 2, 3, 4, 6],
            counter_limit:  255,
            mixer:          MixerConfig::default(),
            final_mixer:    MixerConfig::final_layer(),
            apm_limit:      1023,
            apm_rate:       7,
            match_min_len:  6,
            quiet:          false,
        }
    }
}
impl Config {
    /// Choose memory option (0..9).
    pub fn memory(&mut self, mem: u32) -> &mut Self {
        self.mem = mem;
        &mut *self
    }

    /// Choose the context orders of the context model.
    pub fn orders(&mut self, orders: &[u8]) -> &mut Self {
        self.orders = orders.to_vec();
        &mut *self
    }

    /// Choose the vector width of every mixer layer.
    pub fn lanes(&mut self, lanes: Lanes) -> &mut Self {
        self.mixer.lanes = lanes;
        self.final_mixer.lanes = lanes;
        &mut *self
    }

    /// Enable or disable adaptive learning rates in the first mixer layer.
    pub fn adaptive_rate(&mut self, enable: bool) -> &mut Self {
        self.mixer.adaptive = if enable { Some(AdaptiveRate::default()) } else { None };
        &mut *self
    }

    /// Supress progress output.
    pub fn quiet(&mut self) -> &mut Self {
        self.quiet = true;
        &mut *self
    }

    /// Bytes available to each hash table.
    pub fn table_bytes(&self) -> usize {
        1 << (20 + self.mem)
    }

    /// Check every setting, returning the first invalid one.
    pub fn validate(&self) -> Result<()> {
        if self.mem > 9 {
            return Err(Error::InvalidMemoryOption(self.mem));
        }
        if self.orders.is_empty() {
            return Err(Error::NoOrders);
        }
        if let Some(&order) = self.orders.iter().find(|&&o| o == 0 || o > MAX_ORDER) {
            return Err(Error::InvalidOrder(order));
        }
        for limit in [self.counter_limit, self.apm_limit] {
            if limit < 2 {
                return Err(Error::InvalidCounterLimit(limit));
            }
        }
        if !(1..16).contains(&self.apm_rate) {
            return Err(Error::InvalidLearningRate(self.apm_rate));
        }
        if self.match_min_len == 0 || self.match_min_len > 32 {
            return Err(Error::InvalidMatchLength(self.match_min_len));
        }
        self.mixer.validate()?;
        self.final_mixer.validate()
    }
}
