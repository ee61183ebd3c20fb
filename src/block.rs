use crate::{
    config::Config,
    context_model::ContextModel,
    decoder::Decoder,
    encoder::Encoder,
    error::Result,
    match_model::MatchModel,
    predictor::{Model, Predictor},
    progress::{Mode, Progress},
};

/// Model used when none is supplied.
pub type DefaultModel = (ContextModel, MatchModel);

fn default_model(cfg: &Config) -> Result<DefaultModel> {
    Ok((ContextModel::new(cfg)?, MatchModel::new(cfg)?))
}


/// Compresses byte blocks, most significant bit first. Model statistics
/// carry over from one block to the next, so blocks must be decompressed
/// in the order they were compressed, by a BlockDecoder with the same
/// Config.
pub struct BlockEncoder<M = DefaultModel> {
    pred:  Predictor<M>,
    prg:   Progress,
}
impl BlockEncoder {
    pub fn new(cfg: &Config) -> Result<BlockEncoder> {
        BlockEncoder::with_model(default_model(cfg)?, cfg)
    }
}
impl<M: Model> BlockEncoder<M> {
    pub fn with_model(model: M, cfg: &Config) -> Result<BlockEncoder<M>> {
        Ok(BlockEncoder {
            pred:  Predictor::new(model, cfg)?,
            prg:   Progress::new(cfg, Mode::Compress),
        })
    }

    /// Compress one block. The block's length is not stored.
    pub fn compress_block(&mut self, block: &[u8]) -> Result<Vec<u8>> {
        let mut enc = Encoder::new(Vec::with_capacity(block.len() / 2));
        for byte in block.iter() {
            for i in (0..=7).rev() {
                let bit = (*byte >> i) & 1;
                enc.encode_bit(self.pred.p(), bit)?;
                self.pred.update(bit);
            }
        }
        enc.flush()?;

        let blk_out = enc.into_inner();
        self.prg.update(block.len(), blk_out.len(), self.pred.model().evictions());
        Ok(blk_out)
    }

    pub fn progress(&self) -> &Progress {
        &self.prg
    }
}

/// Decompresses blocks produced by a BlockEncoder.
pub struct BlockDecoder<M = DefaultModel> {
    pred:  Predictor<M>,
    prg:   Progress,
}
impl BlockDecoder {
    pub fn new(cfg: &Config) -> Result<BlockDecoder> {
        BlockDecoder::with_model(default_model(cfg)?, cfg)
    }
}
impl<M: Model> BlockDecoder<M> {
    pub fn with_model(model: M, cfg: &Config) -> Result<BlockDecoder<M>> {
        Ok(BlockDecoder {
            pred:  Predictor::new(model, cfg)?,
            prg:   Progress::new(cfg, Mode::Decompress),
        })
    }

    /// Decompress one block of len bytes.
    pub fn decompress_block(&mut self, block: &[u8], len: usize) -> Result<Vec<u8>> {
        let mut dec = Decoder::new(block);
        dec.prefetch()?;

        let mut blk_out = Vec::with_capacity(len);
        for _ in 0..len {
            let mut byte = 0u8;
            for _ in 0..8 {
                let bit = dec.decode_bit(self.pred.p())?;
                self.pred.update(bit);
                byte = (byte << 1) | bit;
            }
            blk_out.push(byte);
        }

        self.prg.update(block.len(), blk_out.len(), self.pred.model().evictions());
        Ok(blk_out)
    }

    pub fn progress(&self) -> &Progress {
        &self.prg
    }
}
