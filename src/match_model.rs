use crate::{
    config::Config,
    context::BitContext,
    error::Result,
    hash_table::{finalize, HashTable, RecentPositions},
    logistic::{ilog2, stretch},
    mixer::Mixer,
    predictor::{MixerShape, Model},
    statemap::StateMap,
};

// Match Model ---------------------------------------------------------------------------------------------------------------- Match Model
const MAX_LEN: usize = 62;

/// Length buckets used as a mixer context (no match, then log2 lengths).
const LEN_BUCKETS: usize = 7;

/// Finds the most recent earlier occurrence of the last few bytes and
/// predicts that the byte which followed it comes next.
pub struct MatchModel {
    buf:       Vec<u8>,                     // History of whole bytes
    buf_end:   usize,                       // Buffer length - 1
    buf_pos:   usize,                       // Bytes written to the history
    min_len:   usize,                       // Bytes hashed to find candidates
    mch_ptr:   usize,                       // Position of the predicted byte
    mch_len:   usize,                       // Length of the current match, 0 if none
    expected:  Option<u8>,                  // Bit predicted by the current match
    ht:        HashTable<RecentPositions>,  // Positions following each hashed context
    sm:        StateMap,                    // Maps (length, expected bit) to a prediction
}
impl MatchModel {
    pub fn new(cfg: &Config) -> Result<MatchModel> {
        cfg.validate()?;
        let n = cfg.table_bytes();
        Ok(MatchModel {
            buf:       vec![0; n / 2],
            buf_end:   (n / 2) - 1,
            buf_pos:   0,
            min_len:   cfg.match_min_len,
            mch_ptr:   0,
            mch_len:   0,
            expected:  None,
            ht:        HashTable::new(n / 4, RecentPositions::default()),
            sm:        StateMap::new(2 * (MAX_LEN + 1)),
        })
    }

    /// Length of the current match, 0 if none.
    pub fn length(&self) -> usize {
        self.mch_len
    }

    // Hash of the last min_len bytes.
    fn hash(&self) -> u64 {
        let mut h = 0u64;
        for i in 1..=self.min_len {
            let byte = self.buf[self.buf_pos.wrapping_sub(i) & self.buf_end];
            h = finalize(h.wrapping_add(u64::from(byte) + 1));
        }
        h
    }

    // Number of bytes, up to MAX_LEN, preceding candidate that equal
    // those preceding the current position.
    fn match_len(&self, candidate: usize) -> usize {
        let window = self.buf.len();
        if candidate >= self.buf_pos || self.buf_pos - candidate >= window {
            return 0;
        }
        let mut len = 0;
        while len < MAX_LEN
        && len < candidate
        && self.buf[(candidate - len - 1) & self.buf_end]
        == self.buf[(self.buf_pos - len - 1) & self.buf_end] {
            len += 1;
        }
        len
    }

    fn find_match(&mut self, hash: u64) {
        let candidates = match self.ht.lookup(hash) {
            Some(positions) => *positions,
            None => return,
        };
        let best = candidates.iter()
            .map(|pos| (self.match_len(pos as usize), pos as usize))
            .max_by_key(|&(len, _)| len);

        if let Some((len, ptr)) = best {
            if len >= self.min_len {
                self.mch_len = len;
                self.mch_ptr = ptr;
            }
        }
    }

    fn update_byte(&mut self, byte: u8) {
        self.buf[self.buf_pos & self.buf_end] = byte;
        self.buf_pos += 1;

        if self.mch_len > 0 {
            self.mch_ptr += 1;
            if self.mch_len < MAX_LEN { self.mch_len += 1; }
        }
        if self.buf_pos < self.min_len {
            return;
        }

        let hash = self.hash();
        if self.mch_len == 0 {
            self.find_match(hash);
        }
        self.ht.touch(hash).add(self.buf_pos as u32);
    }
}
impl Model for MatchModel {
    fn shape(&self) -> MixerShape {
        MixerShape {
            inputs:  2,
            sets:    vec![LEN_BUCKETS],
        }
    }

    fn predict(&mut self, cx: &BitContext, mxr: &mut Mixer) {
        self.expected = None;
        if self.mch_len > 0 {
            let byte = u32::from(self.buf[self.mch_ptr & self.buf_end]);
            self.expected = Some(((byte >> (7 - cx.bits)) & 1) as u8);
        }

        match self.expected {
            Some(bit) => {
                let cxt = self.mch_len * 2 + bit as usize;
                mxr.add(stretch(self.sm.p(cxt)));
                let conf = (self.mch_len.min(32) * 32) as i32;
                mxr.add(if bit == 1 { conf } else { -conf });
                mxr.set(1 + ilog2(self.mch_len as u32).min(5), LEN_BUCKETS);
            }
            None => {
                mxr.add(stretch(self.sm.p(0)));
                mxr.add(0);
                mxr.set(0, LEN_BUCKETS);
            }
        }
    }

    fn update(&mut self, cx: &BitContext, bit: u8) {
        self.sm.update(bit);
        if self.expected.map_or(false, |e| e != bit) {
            self.mch_len = 0;
        }

        if cx.bits == 7 {
            let byte = ((cx.c0 << 1) | u32::from(bit)) as u8;
            self.update_byte(byte);
        }
    }

    fn evictions(&self) -> u64 {
        self.ht.evictions()
    }
}
// ----------------------------------------------------------------------------------------------------------------------------------------
