// Longest previous factor (LPF) table.
//
// For every position `i`, the longest substring starting at `i` that also
// starts at some earlier position `offset < i` of the same buffer.
//
// Built in O(n) from the suffix array:
//   - `phi` links each suffix to its predecessor in rank order
//   - permuted LCP values along `phi` are computed incrementally (each step
//     can lose at most one byte of the previous extension)
//   - each rank-adjacent pair is owned by its larger position; when an owner
//     is displaced, its two partners become adjacent with the shorter of the
//     two extensions, and that pair is pushed down to the larger partner

/// Marks a position that has not received a candidate yet.
const UNSET: usize = usize::MAX;

/// Per-position longest previous factor of one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LpfTable {
    lengths: Vec<usize>,
    offsets: Vec<usize>,
}

impl LpfTable {
    /// Build the LPF table of `input` from its suffix array.
    pub fn new(input: &[u8], sa: &[usize]) -> Self {
        let size = input.len();
        debug_assert_eq!(sa.len(), size + 1);

        let phi = phi(sa);
        let mut table = Self {
            lengths: vec![UNSET; size + 1],
            offsets: vec![0; size + 1],
        };

        let mut k: usize = 0;
        for (i, &j) in phi.iter().enumerate().take(size) {
            k = lcp(input, i, j, k.saturating_sub(1));
            if i > j {
                table.relax(i, j, k);
            } else {
                table.relax(j, i, k);
            }
        }

        // The slot at `size` only ever holds the empty-suffix pairing.
        table.lengths.truncate(size);
        table.offsets.truncate(size);
        for (length, offset) in table.lengths.iter_mut().zip(table.offsets.iter_mut()) {
            if *length == UNSET || *length == 0 {
                *length = 0;
                *offset = 0;
            }
        }
        table
    }

    /// Longest previous factor at `position` as `(length, offset)`.
    /// Positions past the end report no match.
    #[inline]
    pub fn previous(&self, position: usize) -> (usize, usize) {
        match (self.lengths.get(position), self.offsets.get(position)) {
            (Some(&length), Some(&offset)) => (length, offset),
            _ => (0, 0),
        }
    }

    /// Number of positions covered.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Offer the pair `(owner, partner)` with common extension `k`, where
    /// `owner > partner`. Indices strictly decrease on every push, so the
    /// loop terminates.
    fn relax(&mut self, mut owner: usize, mut partner: usize, mut k: usize) {
        loop {
            let length = self.lengths[owner];
            let offset = self.offsets[owner];

            if length == UNSET {
                self.lengths[owner] = k;
                self.offsets[owner] = partner;
                return;
            }
            if offset == partner {
                return;
            }

            if length < k {
                // The new pair wins; the displaced pair is pushed down with
                // its own (shorter) length.
                self.lengths[owner] = k;
                self.offsets[owner] = partner;
                k = length;
            }
            (owner, partner) = if offset > partner {
                (offset, partner)
            } else {
                (partner, offset)
            };
        }
    }
}

/// Predecessor of each suffix in rank order: `phi[sa[i]] = sa[i - 1]`.
/// The least suffix (the empty one) maps to 0.
pub fn phi(sa: &[usize]) -> Vec<usize> {
    let mut phi = vec![0; sa.len()];
    if let Some(&first) = sa.first() {
        phi[first] = 0;
    }
    for pair in sa.windows(2) {
        phi[pair[1]] = pair[0];
    }
    phi
}

/// Longest common extension of the suffixes at `i` and `j`, given that the
/// first `k` bytes are already known to match.
#[inline]
pub fn lcp(input: &[u8], i: usize, j: usize, mut k: usize) -> usize {
    let size = input.len();
    while i + k < size && j + k < size && input[i + k] == input[j + k] {
        k += 1;
    }
    k
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
