// BPS encoder: operation serialization and footer emission.
//
// This module handles the format-level encoding only: turning a sequence of
// SourceRead/TargetRead/SourceCopy/TargetCopy decisions into patch bytes.
// Match selection lives in the engine module.

use super::checksum;
use super::header::PatchHeader;
use super::operation::{OpKind, Operation};

/// Per-kind operation tallies for a finished patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationCounts {
    pub source_reads: u64,
    pub target_reads: u64,
    pub source_copies: u64,
    pub target_copies: u64,
    /// Literal bytes carried by TargetRead operations.
    pub literal_bytes: u64,
}

impl OperationCounts {
    fn record(&mut self, op: &Operation) {
        match op.kind() {
            OpKind::SourceRead => self.source_reads += 1,
            OpKind::TargetRead => {
                self.target_reads += 1;
                self.literal_bytes += op.length() as u64;
            }
            OpKind::SourceCopy => self.source_copies += 1,
            OpKind::TargetCopy => self.target_copies += 1,
        }
    }

    /// Total number of operations.
    pub fn total(&self) -> u64 {
        self.source_reads + self.target_reads + self.source_copies + self.target_copies
    }
}

/// Serializes patch operations, tracking the output position and both copy
/// cursors so callers can pass absolute offsets.
pub struct PatchEncoder {
    out: Vec<u8>,
    target_len: usize,
    /// Target bytes accounted for so far.
    output_offset: usize,
    /// End of the previous SourceCopy.
    source_cursor: usize,
    /// End of the previous TargetCopy.
    target_cursor: usize,
    counts: OperationCounts,
}

impl PatchEncoder {
    /// Start a patch, writing the header.
    pub fn new(source_len: usize, target_len: usize, metadata: &[u8]) -> Self {
        let header = PatchHeader {
            source_len: source_len as u64,
            target_len: target_len as u64,
            metadata: metadata.to_vec(),
        };
        let mut out = Vec::with_capacity(32 + metadata.len());
        header.encode_into(&mut out);
        Self {
            out,
            target_len,
            output_offset: 0,
            source_cursor: 0,
            target_cursor: 0,
            counts: OperationCounts::default(),
        }
    }

    /// Target bytes accounted for so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.output_offset
    }

    pub fn counts(&self) -> &OperationCounts {
        &self.counts
    }

    /// Copy `length` bytes from the source at the current output position.
    pub fn source_read(&mut self, length: usize) {
        if length == 0 {
            return;
        }
        self.emit(Operation::SourceRead { length });
    }

    /// Store literal target bytes.
    pub fn target_read(&mut self, literal: &[u8]) {
        if literal.is_empty() {
            return;
        }
        self.emit(Operation::TargetRead {
            length: literal.len(),
        });
        self.out.extend_from_slice(literal);
    }

    /// Copy `length` bytes from absolute source `offset`.
    pub fn source_copy(&mut self, offset: usize, length: usize) {
        if length == 0 {
            return;
        }
        let delta = offset as i64 - self.source_cursor as i64;
        self.source_cursor = offset + length;
        self.emit(Operation::SourceCopy { length, delta });
    }

    /// Copy `length` bytes from absolute target `offset`, which must lie
    /// before the current output position.
    pub fn target_copy(&mut self, offset: usize, length: usize) {
        if length == 0 {
            return;
        }
        debug_assert!(offset < self.output_offset);
        let delta = offset as i64 - self.target_cursor as i64;
        self.target_cursor = offset + length;
        self.emit(Operation::TargetCopy { length, delta });
    }

    fn emit(&mut self, op: Operation) {
        log::trace!(
            "bps: {} len={} delta={:?} at {}",
            op.kind(),
            op.length(),
            op.delta(),
            self.output_offset
        );
        op.encode_into(&mut self.out);
        self.counts.record(&op);
        self.output_offset += op.length();
    }

    /// Append the checksum footer and return the finished patch.
    ///
    /// Operations that do not cover the declared target length are logged;
    /// the resulting patch will fail to apply.
    pub fn finish(mut self, source: &[u8], target: &[u8]) -> Vec<u8> {
        if self.output_offset != self.target_len {
            log::warn!(
                "bps: operations cover {} of {} declared target bytes",
                self.output_offset,
                self.target_len
            );
        }
        let source_crc = checksum::crc32(source);
        let target_crc = checksum::crc32(target);
        self.out.extend_from_slice(&source_crc.to_le_bytes());
        self.out.extend_from_slice(&target_crc.to_le_bytes());
        let patch_crc = checksum::crc32(&self.out);
        self.out.extend_from_slice(&patch_crc.to_le_bytes());

        log::debug!(
            "bps: {} operations ({} literal bytes), patch {} bytes",
            self.counts.total(),
            self.counts.literal_bytes,
            self.out.len()
        );
        self.out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
