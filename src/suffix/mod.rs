// Suffix-array based match finding.
//
// This module provides:
// - Linear-time suffix array construction (SA-IS)
// - Longest-prefix search against an indexed buffer (source matches)
// - Longest previous factor tables (target self-matches)

pub mod lpf;
pub mod sais;
pub mod search;

pub use lpf::LpfTable;
pub use search::Match;

/// A suffix array together with the buffer it indexes.
#[derive(Debug, Clone)]
pub struct SuffixArray<'a> {
    input: &'a [u8],
    sa: Vec<usize>,
}

impl<'a> SuffixArray<'a> {
    /// Index `input`. The array holds `input.len() + 1` entries, the first
    /// being the empty suffix.
    pub fn new(input: &'a [u8]) -> Self {
        let sa = sais::suffix_array(input);
        log::debug!("suffix array: {} entries", sa.len());
        Self { input, sa }
    }

    /// Suffix offsets in ascending lexicographic order.
    pub fn as_slice(&self) -> &[usize] {
        &self.sa
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.sa
    }

    /// Longest prefix of `query` found anywhere in the indexed buffer.
    #[inline]
    pub fn find(&self, query: &[u8]) -> Match {
        search::find_longest_match(&self.sa, self.input, query)
    }

    /// Longest previous factor table of the indexed buffer.
    pub fn lpf(&self) -> LpfTable {
        LpfTable::new(self.input, &self.sa)
    }
}
