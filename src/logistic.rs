// Logistic Functions
//
// All tables are built at compile time, so both sides of a stream see the
// same values on every platform.

/// Interpolation points of squash(), spaced 128 apart over -2047..=2047.
const SQUASH_POINTS: [i32; 33] = [
    1,2,3,6,10,16,27,45,73,120,194,310,488,747,1101,
    1546,2048,2549,2994,3348,3607,3785,3901,3975,4022,
    4050,4068,4079,4085,4089,4092,4093,4094];

/// Maps a 12 bit probability to the stretched domain.
static STRETCH_TABLE: [i16; 4096] = build_stretch_table();

/// RECIPROCALS[n] = 16384/(2n + 3), the adaptation rate of a count-n entry.
pub static RECIPROCALS: [u16; 1024] = build_reciprocals();

const fn squash_const(d: i32) -> i32 {
    if d > 2047  { return 4095; }
    if d < -2047 { return 0;    }
    let i_w = d & 127;
    let i = ((d >> 7) + 16) as usize;
    (SQUASH_POINTS[i] * (128 - i_w) + SQUASH_POINTS[i + 1] * i_w + 64) >> 7
}

// Inverting squash() by filling every probability between consecutive
// outputs guarantees stretch(squash(x)) == x wherever squash is injective.
const fn build_stretch_table() -> [i16; 4096] {
    let mut table = [0i16; 4096];
    let mut pi = 0;
    let mut x = -2047;
    while x <= 2047 {
        let i = squash_const(x);
        let mut j = pi;
        while j <= i {
            table[j as usize] = x as i16;
            j += 1;
        }
        pi = i + 1;
        x += 1;
    }
    table[4095] = 2047;
    table
}

const fn build_reciprocals() -> [u16; 1024] {
    let mut table = [0u16; 1024];
    let mut i = 0;
    while i < 1024 {
        table[i] = (16_384 / (i + i + 3)) as u16;
        i += 1;
    }
    table
}

/// Returns p = 1/(1 + exp(-d)) (Inverse of stretch)
/// d = (-2047..2047), p = (0..4095)
#[inline]
pub fn squash(d: i32) -> i32 {
    squash_const(d)
}

/// Returns p = ln(d/(1-d)) (Inverse of squash)
/// d = (0..4095), p = (-2047..2047)
#[inline]
pub fn stretch(d: i32) -> i32 {
    debug_assert!((0..4096).contains(&d));
    STRETCH_TABLE[d as usize] as i32
}

/// Floor of log2(x), with ilog2(0) = 0.
#[inline]
pub fn ilog2(x: u32) -> u32 {
    if x == 0 { 0 } else { 31 - x.leading_zeros() }
}
