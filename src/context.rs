/// Position of the coder within the stream, passed explicitly to every
/// model instead of being shared global state. It only changes when a
/// bit is completed, after every component has been updated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitContext {
    pub c0:    u32, // Bits of the current byte with a leading 1 (1..=255)
    pub bits:  u32, // Number of bits of the current byte seen (0..=7)
    pub c4:    u32, // Last 4 whole bytes, most recent in the low byte
    pub pos:   u64, // Whole bytes seen
    pub y:     u8,  // Last bit
}
impl BitContext {
    pub fn new() -> BitContext {
        BitContext {
            c0:    1,
            bits:  0,
            c4:    0,
            pos:   0,
            y:     0,
        }
    }

    /// Previous whole byte.
    pub fn c1(&self) -> u8 {
        self.c4 as u8
    }

    /// True when the next bit starts a new byte.
    pub fn at_byte_boundary(&self) -> bool {
        self.bits == 0
    }

    pub fn update(&mut self, bit: u8) {
        debug_assert!(bit == 0 || bit == 1);
        self.y = bit;
        self.c0 = (self.c0 << 1) | u32::from(bit);
        self.bits += 1;

        if self.c0 >= 256 { // Byte boundary
            self.c4 = (self.c4 << 8) | (self.c0 & 0xFF);
            self.c0 = 1;
            self.bits = 0;
            self.pos += 1;
        }
    }
}
impl Default for BitContext {
    fn default() -> Self {
        Self::new()
    }
}
