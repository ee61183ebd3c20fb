//! Context mixing compression engine: adaptive bit counters stored in a
//! hashed table, a logistic mixer, adaptive probability maps and a binary
//! range coder, driven one bit at a time by pluggable models.

pub mod apm;
pub mod block;
pub mod buffered_io;
pub mod config;
pub mod constant;
pub mod context;
pub mod context_model;
pub mod counter;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod hash_table;
pub mod logistic;
pub mod match_model;
pub mod mixer;
pub mod predictor;
pub mod progress;
pub mod statemap;

pub use crate::{
    apm::{Apm, InterpolatedApm},
    block::{BlockDecoder, BlockEncoder},
    config::{AdaptiveRate, Config, MixerConfig},
    context::BitContext,
    counter::{estimate, Counter},
    decoder::Decoder,
    encoder::Encoder,
    error::{Error, Result},
    hash_table::{HashTable, RecentPositions, Slot},
    mixer::{Lanes, Mixer},
    predictor::{MixerShape, Model, Predictor},
};

/// Compress data as a single block with the default model.
pub fn compress(data: &[u8], cfg: &Config) -> Result<Vec<u8>> {
    let mut enc = BlockEncoder::new(cfg)?;
    let out = enc.compress_block(data)?;
    enc.progress().print_stats();
    Ok(out)
}

/// Decompress len bytes of a block made by compress with the same Config.
pub fn decompress(data: &[u8], len: usize, cfg: &Config) -> Result<Vec<u8>> {
    let mut dec = BlockDecoder::new(cfg)?;
    let out = dec.decompress_block(data, len)?;
    dec.progress().print_stats();
    Ok(out)
}
