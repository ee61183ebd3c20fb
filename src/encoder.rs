use crate::{
    buffered_io::ByteSink,
    constant::{PROB_MIN, PROB_SCALE},
    error::Result,
};


// Encoder ------------------------------------------------------------------------------------------------------------------------ Encoder

/// Split point of [low, high] for a 12 bit probability of a 1, computed
/// without overflowing 32 bits.
#[inline]
pub(crate) fn split(low: u32, high: u32, p: u16) -> u32 {
    debug_assert!(u32::from(p) < PROB_SCALE);
    let p = u32::from(p.max(PROB_MIN));
    let range = high - low;
    low + (range >> 12) * p + (((range & 0x0FFF) * p) >> 12)
}

/// Binary range encoder. Each bit narrows [low, high] in proportion to
/// its probability; leading bytes shared by both bounds are written out.
pub struct Encoder<W> {
    high:  u32, // Right endpoint of range
    low:   u32, // Left endpoint of range
    sink:  W,   // Receives coded bytes
}
impl<W: ByteSink> Encoder<W> {
    pub fn new(sink: W) -> Encoder<W> {
        Encoder {
            high: 0xFFFFFFFF,
            low:  0,
            sink,
        }
    }

    /// Encode bit under p, the probability (0..4095) that it is a 1.
    /// A probability of 0 is treated as 1.
    pub fn encode_bit(&mut self, p: u16, bit: u8) -> Result<()> {
        debug_assert!(bit == 0 || bit == 1);
        let mid = split(self.low, self.high, p);

        if bit == 1 {
            self.high = mid;
        }
        else {
            self.low = mid + 1;
        }

        while ((self.high ^ self.low) & 0xFF000000) == 0 {
            self.sink.write_byte((self.high >> 24) as u8)?;
            self.high = (self.high << 8) + 255;
            self.low <<= 8;
        }
        Ok(())
    }

    /// Write the leading byte of low, which identifies the final range,
    /// and flush the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.write_byte((self.low >> 24) as u8)?;
        self.sink.flush_buffer()?;
        Ok(())
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
// ----------------------------------------------------------------------------------------------------------------------------------------
