/// Bits of probability resolution. Probabilities are P(1) * 2^PRECISION.
pub const PRECISION: u32 = 12;

/// Number of distinct probabilities (4096).
pub const PROB_SCALE: u32 = 1 << PRECISION;

/// Smallest probability the coder accepts.
pub const PROB_MIN: u16 = 1;

/// Largest probability the coder accepts.
pub const PROB_MAX: u16 = (PROB_SCALE - 1) as u16;

/// Byte returned by the decoder's input once the source is exhausted.
pub const EOF_PAD: u8 = 0xFF;

