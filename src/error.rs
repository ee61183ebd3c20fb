//! Error types.

use thiserror::Error;

/// Errors surfaced by configuration and by the coder's byte boundary.
/// Numeric preconditions inside the engine are assertions, not errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte sink or source failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Memory option outside 0..=9.
    #[error("{0} is outside the valid range of memory options (0..9)")]
    InvalidMemoryOption(u32),

    /// Context order of 0 or above the longest supported order.
    #[error("context order {0} is not in 1..=8")]
    InvalidOrder(u8),

    /// A context model needs at least one order.
    #[error("no context orders configured")]
    NoOrders,

    /// Mixer learning rate or APM rate out of range.
    #[error("invalid learning rate {0}")]
    InvalidLearningRate(i32),

    /// Counter halving limit too small to hold any evidence.
    #[error("invalid counter limit {0}")]
    InvalidCounterLimit(u32),

    /// Match model minimum length out of range.
    #[error("invalid minimum match length {0}")]
    InvalidMatchLength(usize),

    /// Adaptive learning rate decay shift of 31 or more.
    #[error("invalid learning rate decay shift {0}")]
    InvalidDecayShift(u32),

    /// Adaptive learning rate window shorter than the samples needed
    /// before a reset.
    #[error("learning rate window {window} is shorter than {min_samples} samples")]
    InvalidRateWindow { window: u32, min_samples: u32 },
}

/// A specialized Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
