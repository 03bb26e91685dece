//! Property tests for BitBuffer and the bit reader/writer.

use bitcodec_core::{BitBuffer, BitReader, BitWriter, StreamConfig};
use proptest::prelude::*;

fn bit_vec() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 0..200)
}

// =============================================================================
// BITBUFFER PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn test_push_bit_grows_by_one(bits in bit_vec(), extra in any::<bool>()) {
        let mut buf: BitBuffer = bits.iter().copied().collect();
        let before = buf.len();
        buf.push_bit(extra);
        prop_assert_eq!(buf.len(), before + 1);
        prop_assert_eq!(buf.get_from_end(1).unwrap(), extra);
    }

    #[test]
    fn test_slice_and_reappend_reproduces(bits in bit_vec(), a in 0usize..200, b in 0usize..200) {
        let buf: BitBuffer = bits.iter().copied().collect();
        let lo = a.min(b).min(buf.len());
        let hi = a.max(b).min(buf.len());

        let mut rebuilt = buf.slice(0..lo).unwrap();
        rebuilt.extend_from(&buf.slice(lo..hi).unwrap());
        rebuilt.extend_from(&buf.slice(hi..buf.len()).unwrap());
        prop_assert_eq!(rebuilt, buf);
    }

    #[test]
    fn test_xor_with_self_is_all_zero(bits in bit_vec()) {
        let buf: BitBuffer = bits.iter().copied().collect();
        let zero = &buf ^ &buf;
        prop_assert_eq!(zero.len(), buf.len());
        prop_assert_eq!(zero.count_ones(), 0);
    }

    #[test]
    fn test_xor_matches_bitwise_definition(a in bit_vec(), b in bit_vec()) {
        let x: BitBuffer = a.iter().copied().collect();
        let y: BitBuffer = b.iter().copied().collect();
        let z = &x ^ &y;

        let (long, short) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };
        let offset = long.len() - short.len();
        let expected: Vec<bool> = long
            .iter()
            .enumerate()
            .map(|(i, &bit)| if i >= offset { bit ^ short[i - offset] } else { bit })
            .collect();
        prop_assert_eq!(z.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_unused_tail_bits_stay_zero(bits in bit_vec(), pops in 0usize..16) {
        let mut buf: BitBuffer = bits.iter().copied().collect();
        for _ in 0..pops {
            buf.pop();
        }
        if buf.partial_bits() != 0 {
            let last = *buf.as_bytes().last().unwrap();
            let unused = 8 - buf.partial_bits();
            prop_assert_eq!(last & ((1u8 << unused) - 1), 0);
        }
        let reparsed: BitBuffer = buf.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, buf);
    }

    #[test]
    fn test_biguint_roundtrip_keeps_value(bits in bit_vec()) {
        let buf: BitBuffer = bits.iter().copied().collect();
        let value = buf.to_biguint();
        let back = BitBuffer::from_biguint_with_len(&value, buf.len()).unwrap();
        prop_assert_eq!(back, buf);
    }
}

// =============================================================================
// STREAM PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn test_writer_then_reader_reproduces_bits(
        pieces in prop::collection::vec((any::<u8>(), 1u8..=8), 0..100),
        threshold in 0usize..8,
    ) {
        let config = StreamConfig::default().with_write_threshold(threshold);
        let mut writer = BitWriter::new(Vec::new(), &config);
        let mut expected = BitBuffer::new();
        for &(value, count) in &pieces {
            writer.write_bits(value, count).unwrap();
            expected.push_bits(value, count).unwrap();
        }
        let bytes = writer.into_inner().unwrap();
        prop_assert_eq!(bytes.len(), expected.byte_len());

        let mut reader = BitReader::from_slice(&bytes);
        if !expected.is_empty() {
            let read = reader.read_bits(expected.len()).unwrap();
            prop_assert_eq!(read, expected);
        }
    }
}
