use crate::{
    buffered_io::ByteSource,
    constant::EOF_PAD,
    encoder::split,
    error::Result,
};


/// Binary range decoder, the mirror image of the Encoder. It must be fed
/// the same sequence of probabilities the encoder used.
pub struct Decoder<R> {
    high:    u32,
    low:     u32,
    x:       u32, // 4 byte sliding window of compressed data
    source:  R,
}
impl<R: ByteSource> Decoder<R> {
    pub fn new(source: R) -> Decoder<R> {
        Decoder {
            high: 0xFFFFFFFF,
            low:  0,
            x:    0,
            source,
        }
    }

    // Reading past the end of the data yields EOF_PAD; the length of the
    // decoded stream is known to the caller, not to the coder.
    fn next_byte(&mut self) -> Result<u32> {
        Ok(u32::from(self.source.read_byte()?.unwrap_or(EOF_PAD)))
    }

    /// Initialize decoder with first 4 bytes of compressed data.
    pub fn prefetch(&mut self) -> Result<()> {
        for _ in 0..4 {
            self.x = (self.x << 8) + self.next_byte()?;
        }
        Ok(())
    }

    /// Decode the bit that was encoded under p.
    pub fn decode_bit(&mut self, p: u16) -> Result<u8> {
        let mid = split(self.low, self.high, p);

        let mut bit = 0;
        if self.x <= mid {
            bit = 1;
            self.high = mid;
        }
        else {
            self.low = mid + 1;
        }

        while ((self.high ^ self.low) & 0xFF000000) == 0 {
            self.high = (self.high << 8) + 255;
            self.low <<= 8;
            self.x = (self.x << 8) + self.next_byte()?;
        }
        Ok(bit)
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}
