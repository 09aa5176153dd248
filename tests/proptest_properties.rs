use oxibps::bps::varint;
use oxibps::engine::{self, DecodeOptions};
use oxibps::suffix::SuffixArray;
use oxibps::suffix::search::common_prefix;
use proptest::prelude::*;

/// Small alphabets produce long repeats, which is where the interesting
/// suffix-array and LPF cases live.
fn repetitive(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..4, 0..max_len)
}

proptest! {
    #[test]
    fn prop_suffix_array_is_sorted_permutation(input in repetitive(512)) {
        let sa = SuffixArray::new(&input).into_vec();
        prop_assert_eq!(sa.len(), input.len() + 1);
        prop_assert_eq!(sa[0], input.len());

        let mut seen = vec![false; sa.len()];
        for &p in &sa {
            prop_assert!(!seen[p], "position {} listed twice", p);
            seen[p] = true;
        }
        for w in sa.windows(2) {
            prop_assert!(input[w[0]..] < input[w[1]..], "{} !< {}", w[0], w[1]);
        }
    }

    #[test]
    fn prop_find_returns_longest_match(
        input in repetitive(256),
        query in repetitive(32),
    ) {
        let index = SuffixArray::new(&input);
        let found = index.find(&query);
        let best = (0..input.len())
            .map(|i| common_prefix(&input[i..], &query))
            .max()
            .unwrap_or(0);
        prop_assert_eq!(found.length, best);
        if found.length > 0 {
            let at = found.offset;
            prop_assert_eq!(&input[at..at + found.length], &query[..found.length]);
        }
    }

    #[test]
    fn prop_lpf_entries_are_valid_and_maximal(input in repetitive(256)) {
        let lpf = SuffixArray::new(&input).lpf();
        prop_assert_eq!(lpf.len(), input.len());
        for pos in 0..input.len() {
            let (length, offset) = lpf.previous(pos);
            let best = (0..pos)
                .map(|j| common_prefix(&input[j..], &input[pos..]))
                .max()
                .unwrap_or(0);
            prop_assert_eq!(length, best, "LPF length at {}", pos);
            if length == 0 {
                prop_assert_eq!(offset, 0);
            } else {
                prop_assert!(offset < pos);
                prop_assert_eq!(&input[offset..offset + length], &input[pos..pos + length]);
            }
        }
    }

    #[test]
    fn prop_varint_roundtrip(value in 0u64..(1u64 << 32)) {
        let mut out = Vec::new();
        varint::push_u64(&mut out, value);
        prop_assert_eq!(out.len(), varint::sizeof_u64(value));
        prop_assert_eq!(out.last().map(|b| b & 0x80), Some(0x80));
        let (decoded, used) = varint::read_u64(&out).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(used, out.len());
    }

    #[test]
    fn prop_offset_sign_roundtrip(delta in -(1i64 << 40)..(1i64 << 40)) {
        prop_assert_eq!(varint::decode_offset(varint::encode_offset(delta)), delta);
    }

    #[test]
    fn prop_encode_decode_roundtrip(
        source in proptest::collection::vec(any::<u8>(), 0..2048),
        target in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let patch = engine::encode(&source, &target);
        let decoded = engine::decode(&source, &patch).unwrap();
        prop_assert_eq!(decoded, target);
    }

    #[test]
    fn prop_repetitive_roundtrip(source in repetitive(1024), target in repetitive(1024)) {
        let patch = engine::encode(&source, &target);
        prop_assert_eq!(engine::decode(&source, &patch).unwrap(), target.clone());
        let unchecked = DecodeOptions { verify_checksums: false, ..Default::default() };
        prop_assert_eq!(engine::decode_with_options(&source, &patch, &unchecked).unwrap(), target);
    }

    #[test]
    fn prop_encoding_is_deterministic(source in repetitive(512), target in repetitive(512)) {
        prop_assert_eq!(engine::encode(&source, &target), engine::encode(&source, &target));
    }

    #[test]
    fn prop_identical_data_is_one_operation(
        source in proptest::collection::vec(any::<u8>(), 4..4096),
    ) {
        let patch = engine::encode(&source, &source);
        // magic + three one-or-two byte sizes + one operation + footer
        prop_assert!(patch.len() <= 4 + 3 * 2 + 1 + 2 + 12, "patch={}", patch.len());
    }
}
