// Suffix array construction via induced sorting (SA-IS).
//
// Linear time and space. The returned array has `len + 1` entries: the
// empty suffix at offset `len` always sorts first, followed by every real
// suffix in ascending byte-wise lexicographic order.
//
// Outline:
//   1. Classify each position as S-type or L-type
//   2. Bucket LMS positions approximately (tail fill)
//   3. Induce L then S order to sort LMS substrings
//   4. Name LMS substrings; recurse on the names if any repeat
//   5. Place LMS suffixes accurately and induce the final order

/// Marks an unfilled suffix array slot.
const EMPTY: usize = usize::MAX;

/// Build the suffix array of a byte buffer.
pub fn suffix_array(input: &[u8]) -> Vec<usize> {
    induced_sort(input, 256)
}

/// Build the suffix array of `data`, whose symbols are all `< characters`.
///
/// Generic over the symbol type so the reduced (named) LMS string can be
/// sorted by the same routine.
pub fn induced_sort<T>(data: &[T], characters: usize) -> Vec<usize>
where
    T: Copy + Into<usize>,
{
    let size = data.len();
    if size == 0 {
        return vec![0];
    }
    if size == 1 {
        return vec![1, 0];
    }

    let sorter = Sorter::new(data, characters);

    // Approximate LMS placement: LMS suffixes land at their bucket tails in
    // text order, which is enough to sort the LMS substrings.
    let mut suffixes = vec![EMPTY; size + 1];
    let mut tails = sorter.bucket_tails();
    for n in 0..size {
        if !sorter.is_lms(n) {
            continue;
        }
        let c = data[n].into();
        suffixes[tails[c]] = n;
        tails[c] -= 1;
    }
    suffixes[0] = size;

    sorter.induce_l(&mut suffixes);
    sorter.induce_s(&mut suffixes);

    // Name LMS substrings in their (now sorted) order.
    let mut names = vec![EMPTY; size + 1];
    let mut current_name = 0usize;
    let mut last_offset = suffixes[0];
    names[last_offset] = current_name;
    for &offset in &suffixes[1..] {
        if offset == EMPTY || !sorter.is_lms(offset) {
            continue;
        }
        if !sorter.lms_substrings_equal(last_offset, offset) {
            current_name += 1;
        }
        last_offset = offset;
        names[offset] = current_name;
    }

    let mut summary_offsets = Vec::new();
    let mut summary_data = Vec::new();
    for (offset, &name) in names.iter().enumerate() {
        if name == EMPTY {
            continue;
        }
        summary_offsets.push(offset);
        summary_data.push(name);
    }
    let summary_characters = current_name + 1;

    let summaries = if summary_data.len() == summary_characters {
        // Every name is unique: the summary suffix order is its inverse.
        let mut summaries = vec![EMPTY; summary_data.len() + 1];
        summaries[0] = summary_data.len();
        for (x, &y) in summary_data.iter().enumerate() {
            summaries[y + 1] = x;
        }
        summaries
    } else {
        log::trace!(
            "sais: recursing on {} LMS names ({} distinct)",
            summary_data.len(),
            summary_characters
        );
        induced_sort(&summary_data, summary_characters)
    };

    // Accurate LMS placement. summaries[0] is the summary's own empty suffix
    // and summaries[1] is the sentinel name, both covered by suffixes[0].
    suffixes.fill(EMPTY);
    let mut tails = sorter.bucket_tails();
    for &summary in summaries[2..].iter().rev() {
        let index = summary_offsets[summary];
        let c = data[index].into();
        suffixes[tails[c]] = index;
        tails[c] -= 1;
    }
    suffixes[0] = size;

    sorter.induce_l(&mut suffixes);
    sorter.induce_s(&mut suffixes);

    suffixes
}

// ---------------------------------------------------------------------------
// Scratch state for one level of induced sorting
// ---------------------------------------------------------------------------

struct Sorter<'a, T> {
    data: &'a [T],
    /// `true` = L-type (sorts after the next suffix), `false` = S-type.
    types: Vec<bool>,
    /// Symbol occurrence counts, one bucket per symbol.
    counts: Vec<usize>,
}

impl<'a, T> Sorter<'a, T>
where
    T: Copy + Into<usize>,
{
    fn new(data: &'a [T], characters: usize) -> Self {
        let size = data.len();
        let mut types = vec![false; size + 1];
        types[size] = false;
        types[size - 1] = true;
        for n in (0..size - 1).rev() {
            let curr = data[n].into();
            let next = data[n + 1].into();
            types[n] = match curr.cmp(&next) {
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Equal => types[n + 1],
            };
        }

        let mut counts = vec![0usize; characters];
        for &c in data {
            counts[c.into()] += 1;
        }

        Self {
            data,
            types,
            counts,
        }
    }

    /// Left-most S-type position. The empty suffix always qualifies.
    #[inline]
    fn is_lms(&self, n: usize) -> bool {
        n > 0 && !self.types[n] && self.types[n - 1]
    }

    /// Compare the LMS substrings starting at `lhs` and `rhs`, including the
    /// symbol at their closing LMS boundary.
    fn lms_substrings_equal(&self, lhs: usize, rhs: usize) -> bool {
        let size = self.data.len();
        if lhs == size || rhs == size {
            return false;
        }

        let mut n = 0;
        loop {
            let lhs_end = self.is_lms(lhs + n);
            let rhs_end = self.is_lms(rhs + n);
            if lhs_end != rhs_end {
                return false;
            }
            if lhs + n == size || rhs + n == size {
                return false;
            }
            if self.data[lhs + n].into() != self.data[rhs + n].into() {
                return false;
            }
            if n > 0 && lhs_end {
                return true;
            }
            n += 1;
        }
    }

    /// First free slot of each bucket. Slot 0 belongs to the empty suffix.
    fn bucket_heads(&self) -> Vec<usize> {
        let mut heads = vec![0; self.counts.len()];
        let mut offset = 1;
        for (head, &count) in heads.iter_mut().zip(&self.counts) {
            *head = offset;
            offset += count;
        }
        heads
    }

    /// Last slot of each bucket.
    fn bucket_tails(&self) -> Vec<usize> {
        let mut tails = vec![0; self.counts.len()];
        let mut offset = 1;
        for (tail, &count) in tails.iter_mut().zip(&self.counts) {
            offset += count;
            *tail = offset - 1;
        }
        tails
    }

    /// Left-to-right pass: place L-type suffixes at their bucket heads.
    fn induce_l(&self, suffixes: &mut [usize]) {
        let mut heads = self.bucket_heads();
        for n in 0..suffixes.len() {
            let s = suffixes[n];
            if s == EMPTY || s == 0 {
                continue;
            }
            let l = s - 1;
            if !self.types[l] {
                continue;
            }
            let c = self.data[l].into();
            suffixes[heads[c]] = l;
            heads[c] += 1;
        }
    }

    /// Right-to-left pass: place S-type suffixes at their bucket tails.
    fn induce_s(&self, suffixes: &mut [usize]) {
        let mut tails = self.bucket_tails();
        for n in (0..suffixes.len()).rev() {
            let s = suffixes[n];
            if s == EMPTY || s == 0 {
                continue;
            }
            let l = s - 1;
            if self.types[l] {
                continue;
            }
            let c = self.data[l].into();
            suffixes[tails[c]] = l;
            tails[c] -= 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(input: &[u8]) -> Vec<usize> {
        let mut sa: Vec<usize> = (0..=input.len()).collect();
        sa.sort_by(|&a, &b| input[a..].cmp(&input[b..]));
        sa
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(suffix_array(b""), vec![0]);
        assert_eq!(suffix_array(b"x"), vec![1, 0]);
        assert_eq!(suffix_array(b"ab"), vec![2, 0, 1]);
        assert_eq!(suffix_array(b"ba"), vec![2, 1, 0]);
    }

    #[test]
    fn banana() {
        assert_eq!(suffix_array(b"banana"), vec![6, 5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn matches_naive_sort() {
        let cases: &[&[u8]] = &[
            b"ABCABC",
            b"mississippi",
            b"AAAAAAAA",
            b"abracadabra",
            b"cabbage",
            b"zyxwvutsrqponm",
            b"aabaabaabaab",
            b"\x00\x00\x01\x00\xff\xff\x00",
            b"the quick brown fox jumps over the lazy dog the quick brown fox",
        ];
        for &case in cases {
            assert_eq!(suffix_array(case), naive(case), "input {case:?}");
        }
    }

    #[test]
    fn trailing_repeats_classify_correctly() {
        let a = b"xyzqqqq";
        let b = b"xyzqqqqqqqq";
        assert_eq!(suffix_array(a), naive(a));
        assert_eq!(suffix_array(b), naive(b));
    }

    #[test]
    fn pseudo_random_inputs_match_naive() {
        let mut s = 0x2545_F491_4F6C_DD1Du64;
        for len in [2usize, 3, 7, 16, 63, 200, 1000] {
            for alphabet in [2u64, 4, 256] {
                let data: Vec<u8> = (0..len)
                    .map(|_| {
                        s ^= s << 13;
                        s ^= s >> 7;
                        s ^= s << 17;
                        (s % alphabet) as u8
                    })
                    .collect();
                assert_eq!(suffix_array(&data), naive(&data), "len={len} alphabet={alphabet}");
            }
        }
    }

    #[test]
    fn generic_symbols() {
        let data: Vec<usize> = vec![3, 1, 2, 1, 2, 0];
        let sa = induced_sort(&data, 4);
        let mut expected: Vec<usize> = (0..=data.len()).collect();
        expected.sort_by(|&a, &b| data[a..].cmp(&data[b..]));
        assert_eq!(sa, expected);
    }
}
