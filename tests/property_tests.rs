use ctxmix::{estimate, Counter, Decoder, Encoder};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_coder_roundtrip(
        steps in prop::collection::vec((0..2u8, 0..4096u16), 0..2000),
    ) {
        let mut enc = Encoder::new(Vec::<u8>::new());
        for &(bit, p) in steps.iter() {
            enc.encode_bit(p, bit).unwrap();
        }
        enc.flush().unwrap();
        let stream = enc.into_inner();

        let mut dec = Decoder::new(&stream[..]);
        dec.prefetch().unwrap();
        for &(bit, p) in steps.iter() {
            prop_assert_eq!(dec.decode_bit(p).unwrap(), bit);
        }
    }

    #[test]
    fn test_estimate_bounds(n0 in any::<u32>(), n1 in any::<u32>()) {
        let p = estimate(n0, n1);
        prop_assert!(p > 0 && p < 4096);
    }

    #[test]
    fn test_limited_counter_stays_bounded(
        bits in prop::collection::vec(0..2u8, 1..500),
        limit in 2..300u32,
    ) {
        let mut ctr = Counter::default();
        for &bit in bits.iter() {
            ctr.update_limited(bit, limit);
            prop_assert!(ctr.n0() <= limit && ctr.n1() <= limit);
        }
    }
}

proptest! {
    // Every case builds a full predictor.
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_block_roundtrip(data in prop::collection::vec(any::<u8>(), 0..300)) {
        let mut cfg = ctxmix::Config::default();
        cfg.memory(0).quiet();
        let stream = ctxmix::compress(&data, &cfg).unwrap();
        prop_assert_eq!(ctxmix::decompress(&stream, data.len(), &cfg).unwrap(), data);
    }
}
