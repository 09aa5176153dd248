// Longest-prefix lookup over a suffix array.
//
// Binary search narrowing a window of ranks `[l, r)`. Every probed suffix
// is compared against the query up to the first mismatch; the longest
// prefix seen so far is remembered, so the result is useful even when the
// full query does not occur in the indexed buffer.

/// Result of a longest-match search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Match {
    /// Number of leading query bytes matched.
    pub length: usize,
    /// Offset in the indexed buffer where the match starts.
    pub offset: usize,
    /// The whole query was matched.
    pub exact: bool,
}

/// Find the longest prefix of `query` occurring anywhere in `input`.
///
/// `sa` must be the suffix array of `input` (`input.len() + 1` entries).
/// Among equally long candidates the first one probed wins.
pub fn find_longest_match(sa: &[usize], input: &[u8], query: &[u8]) -> Match {
    let mut best = Match {
        exact: query.is_empty(),
        ..Match::default()
    };
    if query.is_empty() || input.is_empty() {
        return best;
    }

    let (mut l, mut r) = (0usize, sa.len());
    while r - l > 1 {
        let m = l + (r - l) / 2;
        let s = sa[m];
        let suffix = &input[s..];
        let k = common_prefix(query, suffix);

        if k > best.length {
            best = Match {
                length: k,
                offset: s,
                exact: k == query.len(),
            };
            if best.exact {
                return best;
            }
        }

        // A suffix that is a proper prefix of the query sorts before it.
        if k == suffix.len() || query[k] > suffix[k] {
            l = m;
        } else {
            r = m;
        }
    }

    best
}

/// Length of the common prefix of two byte slices.
#[inline]
pub fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suffix::sais::suffix_array;

    fn brute_force(input: &[u8], query: &[u8]) -> usize {
        (0..input.len())
            .map(|s| common_prefix(query, &input[s..]))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn exact_match() {
        let input = b"the quick brown fox";
        let sa = suffix_array(input);
        let m = find_longest_match(&sa, input, b"brown");
        assert!(m.exact);
        assert_eq!(m.length, 5);
        assert_eq!(m.offset, 10);
    }

    #[test]
    fn partial_prefix_match() {
        let input = b"abcdefgh";
        let sa = suffix_array(input);
        let m = find_longest_match(&sa, input, b"cdeXYZ");
        assert!(!m.exact);
        assert_eq!(m.length, 3);
        assert_eq!(m.offset, 2);
    }

    #[test]
    fn query_longer_than_input() {
        let input = b"AAAA";
        let sa = suffix_array(input);
        let m = find_longest_match(&sa, input, b"AAAAAAAA");
        assert_eq!(m.length, 4);
        assert_eq!(m.offset, 0);
        assert!(!m.exact);
    }

    #[test]
    fn no_match_and_empty_inputs() {
        let input = b"aaaa";
        let sa = suffix_array(input);
        assert_eq!(find_longest_match(&sa, input, b"zzz").length, 0);

        let sa = suffix_array(b"");
        assert_eq!(find_longest_match(&sa, b"", b"abc"), Match::default());

        let m = find_longest_match(&suffix_array(b"abc"), b"abc", b"");
        assert!(m.exact);
        assert_eq!(m.length, 0);
    }

    #[test]
    fn agrees_with_brute_force() {
        let input = b"mississippi river banks and mississauga";
        let sa = suffix_array(input);
        let queries: &[&[u8]] = &[
            b"ssi", b"ssippi", b"issa", b"river", b"rivet", b"zzz", b"a", b"banks and m",
            b"mississ", b"iss",
        ];
        for &q in queries {
            let m = find_longest_match(&sa, input, q);
            assert_eq!(m.length, brute_force(input, q), "query {q:?}");
            assert_eq!(&input[m.offset..m.offset + m.length], &q[..m.length]);
        }
    }
}
