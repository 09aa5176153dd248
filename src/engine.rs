// Delta engine: ties suffix-array match finding to BPS encoding.
//
// Provides high-level encode/decode APIs that orchestrate:
//   - Source indexing (suffix array) and target indexing (LPF table)
//   - Greedy selection of SourceRead/SourceCopy/TargetCopy/TargetRead
//   - BPS serialization with relative copy offsets and checksums
//   - BPS decoding to reconstruct target from source + patch

use std::io::Write;

use crate::bps::decoder::{self, DecodeError};
use crate::bps::encoder::{OperationCounts, PatchEncoder};
use crate::bps::operation::OpKind;
use crate::suffix::search::common_prefix;
use crate::suffix::{LpfTable, SuffixArray};

/// Shortest match worth an operation; anything shorter is stored literally.
pub const MIN_MATCH: usize = 4;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for patch creation.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Metadata stored in the patch header (BPS manifest). Empty by default.
    pub metadata: Vec<u8>,
}

/// Configuration for patch application.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Verify the source, target, and patch CRC-32 values.
    pub verify_checksums: bool,
    /// Reject patches whose header declares a larger target. `None` accepts
    /// any length the address space can hold.
    pub max_target_len: Option<u64>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            max_target_len: Some(decoder::DEFAULT_MAX_TARGET_LEN),
        }
    }
}

// ---------------------------------------------------------------------------
// Match selection
// ---------------------------------------------------------------------------

/// The operation chosen at one target position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub kind: OpKind,
    /// Target bytes covered (1 for TargetRead).
    pub length: usize,
    /// Absolute read offset for copies; the target position for SourceRead.
    pub offset: usize,
}

/// Indexes for one source/target pair.
pub struct MatchEngine<'a> {
    source: &'a [u8],
    target: &'a [u8],
    source_index: SuffixArray<'a>,
    target_lpf: LpfTable,
}

impl<'a> MatchEngine<'a> {
    /// Index the source (suffix array) and the target (LPF table).
    pub fn new(source: &'a [u8], target: &'a [u8]) -> Self {
        let (source_index, target_lpf) = build_indexes(source, target);
        Self {
            source,
            target,
            source_index,
            target_lpf,
        }
    }

    /// Pick the operation for target position `position`.
    ///
    /// Candidates shorter than [`MIN_MATCH`] are ignored. The strictly
    /// longest candidate wins; ties go to SourceRead, then SourceCopy, then
    /// TargetCopy. With no qualifying candidate a one-byte TargetRead is
    /// returned.
    pub fn select(&self, position: usize) -> Selection {
        let mut best = Selection {
            kind: OpKind::TargetRead,
            length: 1,
            offset: position,
        };
        let mut longest = MIN_MATCH - 1;

        let overlap = self.source.len().min(self.target.len());
        if position < overlap {
            let length = common_prefix(
                &self.source[position..overlap],
                &self.target[position..overlap],
            );
            if length > longest {
                longest = length;
                best = Selection {
                    kind: OpKind::SourceRead,
                    length,
                    offset: position,
                };
            }
        }

        let found = self.source_index.find(&self.target[position..]);
        if found.length > longest {
            longest = found.length;
            best = Selection {
                kind: OpKind::SourceCopy,
                length: found.length,
                offset: found.offset,
            };
        }

        let (length, offset) = self.target_lpf.previous(position);
        if length > longest {
            best = Selection {
                kind: OpKind::TargetCopy,
                length,
                offset,
            };
        }

        best
    }

    /// Run the greedy pass over the whole target, feeding `enc`.
    ///
    /// Consecutive TargetRead decisions are queued and emitted as one
    /// operation right before the next non-literal operation (or at the end).
    pub fn emit_into(&self, enc: &mut PatchEncoder) {
        let target = self.target;
        let mut pending = 0usize;
        let mut position = 0usize;

        while position < target.len() {
            let choice = self.select(position);
            if choice.kind == OpKind::TargetRead {
                pending += 1;
                position += 1;
                continue;
            }

            enc.target_read(&target[position - pending..position]);
            pending = 0;

            match choice.kind {
                OpKind::SourceRead => enc.source_read(choice.length),
                OpKind::SourceCopy => enc.source_copy(choice.offset, choice.length),
                OpKind::TargetCopy => enc.target_copy(choice.offset, choice.length),
                OpKind::TargetRead => unreachable!("literal runs are queued"),
            }
            position += choice.length;
        }
        enc.target_read(&target[position - pending..position]);

        debug_assert_eq!(enc.position(), target.len());
    }
}

#[cfg(feature = "parallel")]
fn build_indexes<'a>(source: &'a [u8], target: &[u8]) -> (SuffixArray<'a>, LpfTable) {
    rayon::join(
        || SuffixArray::new(source),
        || SuffixArray::new(target).lpf(),
    )
}

#[cfg(not(feature = "parallel"))]
fn build_indexes<'a>(source: &'a [u8], target: &[u8]) -> (SuffixArray<'a>, LpfTable) {
    (SuffixArray::new(source), SuffixArray::new(target).lpf())
}

// ---------------------------------------------------------------------------
// High-level encode
// ---------------------------------------------------------------------------

/// Create a BPS patch turning `source` into `target`.
pub fn encode(source: &[u8], target: &[u8]) -> Vec<u8> {
    encode_with_options(source, target, &EncodeOptions::default())
}

/// Create a patch with custom options.
pub fn encode_with_options(source: &[u8], target: &[u8], opts: &EncodeOptions) -> Vec<u8> {
    encode_with_stats(source, target, opts).0
}

/// Create a patch and report how many operations of each kind it holds.
pub fn encode_with_stats(
    source: &[u8],
    target: &[u8],
    opts: &EncodeOptions,
) -> (Vec<u8>, OperationCounts) {
    log::debug!(
        "engine: encoding {} byte source -> {} byte target",
        source.len(),
        target.len()
    );
    let engine = MatchEngine::new(source, target);
    let mut enc = PatchEncoder::new(source.len(), target.len(), &opts.metadata);
    engine.emit_into(&mut enc);
    let counts = *enc.counts();
    (enc.finish(source, target), counts)
}

/// Create a patch and write it to `writer`.
pub fn encode_to<W: Write>(
    writer: &mut W,
    source: &[u8],
    target: &[u8],
    opts: &EncodeOptions,
) -> Result<OperationCounts, EncodeError> {
    let (patch, counts) = encode_with_stats(source, target, opts);
    writer.write_all(&patch)?;
    Ok(counts)
}

// ---------------------------------------------------------------------------
// High-level decode
// ---------------------------------------------------------------------------

/// Apply a BPS patch, reconstructing the target.
pub fn decode(source: &[u8], patch: &[u8]) -> Result<Vec<u8>, DecodeError> {
    decode_with_options(source, patch, &DecodeOptions::default())
}

/// Apply a patch with custom options.
pub fn decode_with_options(
    source: &[u8],
    patch: &[u8],
    opts: &DecodeOptions,
) -> Result<Vec<u8>, DecodeError> {
    decoder::apply_limited(source, patch, opts.verify_checksums, opts.max_target_len)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
