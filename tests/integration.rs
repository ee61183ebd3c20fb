#[cfg(test)]
mod tests {
    use ctxmix::{
        compress, decompress,
        BlockDecoder, BlockEncoder, Config, Counter, Decoder, Encoder, Lanes,
    };
    use std::io::{BufReader, BufWriter, Cursor};

    fn cfg() -> Config {
        let mut cfg = Config::default();
        cfg.memory(0).quiet();
        cfg
    }

    fn encode(bits: &[u8], probs: &[u16]) -> Vec<u8> {
        let mut enc = Encoder::new(Vec::<u8>::new());
        for (&bit, &p) in bits.iter().zip(probs.iter()) {
            enc.encode_bit(p, bit).unwrap();
        }
        enc.flush().unwrap();
        enc.into_inner()
    }

    fn decode(data: &[u8], probs: &[u16]) -> Vec<u8> {
        let mut dec = Decoder::new(data);
        dec.prefetch().unwrap();
        probs.iter().map(|&p| dec.decode_bit(p).unwrap()).collect()
    }

    fn text(len: usize) -> Vec<u8> {
        let words = ["the ", "quick ", "brown ", "fox ", "jumps ", "over ", "lazy ", "dog. "];
        let rng = fastrand::Rng::with_seed(42);
        let mut data = Vec::with_capacity(len);
        while data.len() < len {
            data.extend_from_slice(words[rng.usize(0..words.len())].as_bytes());
        }
        data.truncate(len);
        data
    }

    #[test]
    fn constant_probability_four_bits() {
        let bits = [1, 0, 1, 1];
        let probs = [2048; 4];
        let out = encode(&bits, &probs);
        assert_eq!(decode(&out, &probs), bits);
    }

    #[test]
    fn adaptive_counter_pattern() {
        let pattern: u64 = 0xDEAD_BEEF_0F0F_A5A5;
        let bits = (0..64).rev().map(|i| ((pattern >> i) & 1) as u8).collect::<Vec<u8>>();

        let mut enc = Encoder::new(Vec::<u8>::new());
        let mut enc_ctr = Counter::default();
        for &bit in bits.iter() {
            enc.encode_bit(enc_ctr.p(), bit).unwrap();
            enc_ctr.update(bit);
        }
        let pending = enc.sink().len();
        enc.flush().unwrap();
        let out = enc.into_inner();
        assert_eq!(out.len(), pending + 1);

        let mut dec = Decoder::new(&out[..]);
        dec.prefetch().unwrap();
        let mut dec_ctr = Counter::default();
        let mut decoded = Vec::new();
        for _ in 0..64 {
            let bit = dec.decode_bit(dec_ctr.p()).unwrap();
            dec_ctr.update(bit);
            decoded.push(bit);
        }
        assert_eq!(decoded, bits);

        // 64 updates never reach the halving threshold, so the counts are
        // the plain number of zeros and ones.
        let ones = pattern.count_ones();
        assert_eq!(enc_ctr, dec_ctr);
        assert_eq!((dec_ctr.n0(), dec_ctr.n1()), (64 - ones, ones));
    }

    #[test]
    fn empty_and_single_bit_streams() {
        let out = encode(&[], &[]);
        assert_eq!(out.len(), 1);
        assert!(decode(&out, &[]).is_empty());

        for bit in [0, 1] {
            for p in [1, 2048, 4095] {
                let out = encode(&[bit], &[p]);
                assert_eq!(decode(&out, &[p]), [bit]);
            }
        }
    }

    #[test]
    fn uniform_streams_under_skewed_probabilities() {
        let n = 5000;
        for bit in [0, 1] {
            let bits = vec![bit; n];
            for p in [1, 4095] {
                let probs = vec![p; n];
                let out = encode(&bits, &probs);
                assert_eq!(decode(&out, &probs), bits);
            }
        }
    }

    #[test]
    fn random_bits_and_probabilities() {
        let rng = fastrand::Rng::with_seed(3);
        let bits = (0..8000).map(|_| rng.u8(0..2)).collect::<Vec<u8>>();
        let probs = (0..8000).map(|_| rng.u16(0..4096)).collect::<Vec<u16>>();
        let out = encode(&bits, &probs);
        assert_eq!(decode(&out, &probs), bits);
    }

    #[test]
    fn buffered_reader_and_writer_round_trip() {
        let rng = fastrand::Rng::with_seed(4);
        let bits = (0..4000).map(|_| u8::from(rng.u8(0..4) == 0)).collect::<Vec<u8>>();

        let mut enc = Encoder::new(BufWriter::new(Vec::<u8>::new()));
        let mut ctr = Counter::default();
        for &bit in bits.iter() {
            enc.encode_bit(ctr.p(), bit).unwrap();
            ctr.update_limited(bit, 255);
        }
        enc.flush().unwrap();
        let stream = enc.into_inner().into_inner().unwrap();
        assert_eq!(stream, encode(&bits, &adaptive_probs(&bits)));

        let mut dec = Decoder::new(BufReader::new(Cursor::new(stream)));
        dec.prefetch().unwrap();
        let mut ctr = Counter::default();
        for &bit in bits.iter() {
            let decoded = dec.decode_bit(ctr.p()).unwrap();
            assert_eq!(decoded, bit);
            ctr.update_limited(decoded, 255);
        }
    }

    // Probabilities a limited counter gives before each bit.
    fn adaptive_probs(bits: &[u8]) -> Vec<u16> {
        let mut ctr = Counter::default();
        bits.iter()
            .map(|&bit| {
                let p = ctr.p();
                ctr.update_limited(bit, 255);
                p
            })
            .collect()
    }

    #[test]
    fn truncated_stream_decodes_with_padding() {
        // A confident prediction that turns out right needs no output byte
        // beyond the flushed one; the decoder must read past the end.
        let bits = vec![1; 16];
        let probs = vec![4095; 16];
        let out = encode(&bits, &probs);
        assert!(out.len() < 4);
        assert_eq!(decode(&out, &probs), bits);
    }

    #[test]
    fn block_round_trip() {
        let data = text(20_000);
        let cfg = cfg();
        let out = compress(&data, &cfg).unwrap();
        assert!(out.len() < data.len() / 2);
        assert_eq!(decompress(&out, data.len(), &cfg).unwrap(), data);
    }

    #[test]
    fn random_data_round_trip() {
        let rng = fastrand::Rng::with_seed(9);
        let data = (0..10_000).map(|_| rng.u8(..)).collect::<Vec<u8>>();
        let cfg = cfg();
        let mut enc = BlockEncoder::new(&cfg).unwrap();
        let out = enc.compress_block(&data).unwrap();
        assert_eq!(enc.progress().out_size(), out.len() as u64);
        // Far more contexts than the smallest tables hold
        assert!(enc.progress().evictions() > 0);
        assert_eq!(decompress(&out, data.len(), &cfg).unwrap(), data);
    }

    #[test]
    fn uniform_blocks_round_trip() {
        let cfg = cfg();
        for byte in [0x00, 0xFF] {
            let data = vec![byte; 4096];
            let out = compress(&data, &cfg).unwrap();
            assert!(out.len() < 256);
            assert_eq!(decompress(&out, data.len(), &cfg).unwrap(), data);
        }
    }

    #[test]
    fn consecutive_blocks_share_statistics() {
        let cfg = cfg();
        let data = text(30_000);
        let blocks = data.chunks(7_000).collect::<Vec<&[u8]>>();

        let mut enc = BlockEncoder::new(&cfg).unwrap();
        let compressed = blocks.iter()
            .map(|blk| enc.compress_block(blk).unwrap())
            .collect::<Vec<Vec<u8>>>();
        assert_eq!(enc.progress().blocks(), blocks.len() as u64);
        assert_eq!(enc.progress().in_size(), data.len() as u64);
        let total = compressed.iter().map(|c| c.len() as u64).sum::<u64>();
        assert_eq!(enc.progress().out_size(), total);

        // Later blocks benefit from what earlier ones taught the model.
        assert!(compressed[3].len() < compressed[0].len());

        let mut dec = BlockDecoder::new(&cfg).unwrap();
        let mut out = Vec::new();
        for (blk, orig) in compressed.iter().zip(blocks.iter()) {
            out.extend(dec.decompress_block(blk, orig.len()).unwrap());
        }
        assert_eq!(out, data);
    }

    #[test]
    fn empty_block() {
        let cfg = cfg();
        let out = compress(&[], &cfg).unwrap();
        assert!(decompress(&out, 0, &cfg).unwrap().is_empty());
    }

    #[test]
    fn lane_widths_produce_identical_streams() {
        let data = text(6_000);
        let outputs = [Lanes::X1, Lanes::X4, Lanes::X8, Lanes::X16]
            .iter()
            .map(|&lanes| {
                let mut cfg = cfg();
                cfg.lanes(lanes);
                compress(&data, &cfg).unwrap()
            })
            .collect::<Vec<Vec<u8>>>();
        assert!(outputs.windows(2).all(|o| o[0] == o[1]));
    }

    #[test]
    fn fixed_learning_rate_round_trip() {
        let mut cfg = cfg();
        cfg.adaptive_rate(false).orders(&[1, 2, 8]);
        let data = text(8_000);
        let out = compress(&data, &cfg).unwrap();
        assert_eq!(decompress(&out, data.len(), &cfg).unwrap(), data);
    }
}
