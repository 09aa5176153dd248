// BPS decoder: operation parsing and patch application.
//
// Replays the operation stream against the source and the growing target,
// keeping independent source/target copy cursors exactly as the encoder
// does. All three footer checksums are verified unless disabled.

use super::checksum;
use super::header::{FOOTER_LEN, MIN_PATCH_LEN, PatchFooter, PatchHeader};
use super::operation::Operation;
use super::varint::VarIntError;

/// Upper bound on the output buffer reserved up front from an untrusted
/// header. Larger targets still decode; they just grow on demand.
const MAX_PREALLOC: usize = 1 << 26; // 64 MiB

/// Largest target `apply` will reconstruct. The header's declared length is
/// checked against this before any replay; use [`apply_limited`] to raise it.
pub const DEFAULT_MAX_TARGET_LEN: u64 = 1 << 30; // 1 GiB

// ---------------------------------------------------------------------------
// Decoder error
// ---------------------------------------------------------------------------

/// Which footer checksum failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    Source,
    Target,
    Patch,
}

impl std::fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Target => "target",
            Self::Patch => "patch",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("patch too small: {0} bytes")]
    TooSmall(usize),
    #[error("invalid magic (not a BPS1 patch)")]
    BadMagic,
    #[error("malformed integer: {0}")]
    VarInt(#[from] VarIntError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("source size mismatch: patch expects {expected} bytes, got {actual}")]
    SourceSizeMismatch { expected: u64, actual: u64 },
    #[error("{which} checksum mismatch: expected {expected:#010X}, got {actual:#010X}")]
    ChecksumMismatch {
        which: ChecksumKind,
        expected: u32,
        actual: u32,
    },
}

// ---------------------------------------------------------------------------
// Patch layout
// ---------------------------------------------------------------------------

/// Header, footer, and operation-stream span of a patch.
#[derive(Debug, Clone)]
pub struct PatchInfo {
    pub header: PatchHeader,
    pub footer: PatchFooter,
    /// Byte offset where the operation stream starts.
    pub ops_start: usize,
    /// Byte offset where the footer starts.
    pub ops_end: usize,
}

impl PatchInfo {
    /// Parse the framing of a patch without applying it.
    pub fn parse(patch: &[u8]) -> Result<Self, DecodeError> {
        if patch.len() < MIN_PATCH_LEN {
            return Err(DecodeError::TooSmall(patch.len()));
        }
        let ops_end = patch.len() - FOOTER_LEN;
        let (header, ops_start) = PatchHeader::parse(&patch[..ops_end])?;
        let footer = PatchFooter::parse(patch)?;
        Ok(Self {
            header,
            footer,
            ops_start,
            ops_end,
        })
    }

    /// Iterate over the operations of `patch` (the same bytes this info was
    /// parsed from).
    pub fn operations<'a>(&self, patch: &'a [u8]) -> OperationIterator<'a> {
        OperationIterator::new(
            &patch[self.ops_start..self.ops_end],
            self.header.source_len,
            self.header.target_len,
        )
    }

    /// Verify the patch checksum (CRC of everything before the last 4 bytes).
    pub fn verify_patch_crc(&self, patch: &[u8]) -> Result<(), DecodeError> {
        let actual = checksum::crc32(&patch[..patch.len() - 4]);
        check(ChecksumKind::Patch, self.footer.patch_crc, actual)
    }
}

fn check(which: ChecksumKind, expected: u32, actual: u32) -> Result<(), DecodeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(DecodeError::ChecksumMismatch {
            which,
            expected,
            actual,
        })
    }
}

// ---------------------------------------------------------------------------
// Operation iterator
// ---------------------------------------------------------------------------

/// An operation with its absolute positions resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOp<'a> {
    pub op: Operation,
    /// Target offset the operation writes to.
    pub output_offset: u64,
    /// Where the bytes come from: source offset for SourceRead/SourceCopy,
    /// target offset for TargetCopy, `None` for TargetRead.
    pub read_offset: Option<u64>,
    /// Literal bytes of a TargetRead (empty otherwise).
    pub literal: &'a [u8],
}

/// Iterate over decoded operations in a patch's operation stream.
///
/// Validates bounds as it goes; after the first error the iterator is
/// exhausted.
pub struct OperationIterator<'a> {
    stream: &'a [u8],
    pos: usize,
    source_len: u64,
    target_len: u64,
    output_offset: u64,
    source_cursor: i64,
    target_cursor: i64,
    failed: bool,
}

impl<'a> OperationIterator<'a> {
    pub fn new(stream: &'a [u8], source_len: u64, target_len: u64) -> Self {
        Self {
            stream,
            pos: 0,
            source_len,
            target_len,
            output_offset: 0,
            source_cursor: 0,
            target_cursor: 0,
            failed: false,
        }
    }

    /// Target bytes accounted for by the operations yielded so far.
    pub fn output_offset(&self) -> u64 {
        self.output_offset
    }

    fn next_op(&mut self) -> Result<ResolvedOp<'a>, DecodeError> {
        let (op, used) = Operation::parse(&self.stream[self.pos..])?;
        self.pos += used;

        let length = op.length() as u64;
        let output_offset = self.output_offset;
        let end = output_offset
            .checked_add(length)
            .filter(|&end| end <= self.target_len)
            .ok_or_else(|| {
                DecodeError::InvalidInput(format!(
                    "{} of {length} bytes at {output_offset} overruns target length {}",
                    op.kind(),
                    self.target_len
                ))
            })?;

        let mut literal: &'a [u8] = &[];
        let read_offset = match op {
            Operation::SourceRead { .. } => {
                self.check_source(output_offset, length)?;
                Some(output_offset)
            }
            Operation::TargetRead { length } => {
                let stream = self.stream;
                literal = stream
                    .get(self.pos..)
                    .and_then(|rest| rest.get(..length))
                    .ok_or_else(|| {
                        DecodeError::InvalidInput(format!(
                            "TargetRead of {length} bytes runs past the operation stream"
                        ))
                    })?;
                self.pos += length;
                None
            }
            Operation::SourceCopy { delta, .. } => {
                let from = advance(&mut self.source_cursor, delta, length)?;
                self.check_source(from, length)?;
                Some(from)
            }
            Operation::TargetCopy { delta, .. } => {
                let from = advance(&mut self.target_cursor, delta, length)?;
                if from >= output_offset {
                    return Err(DecodeError::InvalidInput(format!(
                        "TargetCopy reads offset {from} before it is written (output at {output_offset})"
                    )));
                }
                Some(from)
            }
        };

        self.output_offset = end;
        Ok(ResolvedOp {
            op,
            output_offset,
            read_offset,
            literal,
        })
    }

    fn check_source(&self, from: u64, length: u64) -> Result<(), DecodeError> {
        match from.checked_add(length) {
            Some(end) if end <= self.source_len => Ok(()),
            _ => Err(DecodeError::InvalidInput(format!(
                "source read of {length} bytes at {from} exceeds source length {}",
                self.source_len
            ))),
        }
    }
}

/// Apply a relative offset to a copy cursor, returning the read position and
/// moving the cursor past the copied bytes.
fn advance(cursor: &mut i64, delta: i64, length: u64) -> Result<u64, DecodeError> {
    let current = *cursor;
    let from = current
        .checked_add(delta)
        .filter(|&from| from >= 0)
        .ok_or_else(|| {
            DecodeError::InvalidInput(format!(
                "copy offset {delta} moves cursor {current} out of range"
            ))
        })?;
    *cursor = i64::try_from(length)
        .ok()
        .and_then(|length| from.checked_add(length))
        .ok_or_else(|| DecodeError::InvalidInput("copy cursor overflow".into()))?;
    Ok(from as u64)
}

impl<'a> Iterator for OperationIterator<'a> {
    type Item = Result<ResolvedOp<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.stream.len() {
            return None;
        }
        let result = self.next_op();
        self.failed = result.is_err();
        Some(result)
    }
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Apply `patch` to `source`, returning the reconstructed target.
///
/// With `verify_checksums`, the patch and source checksums are checked
/// before replay and the target checksum after. Targets declared larger than
/// [`DEFAULT_MAX_TARGET_LEN`] are rejected.
pub fn apply(source: &[u8], patch: &[u8], verify_checksums: bool) -> Result<Vec<u8>, DecodeError> {
    apply_limited(source, patch, verify_checksums, Some(DEFAULT_MAX_TARGET_LEN))
}

/// [`apply`] with an explicit cap on the declared target length. `None`
/// disables the cap.
pub fn apply_limited(
    source: &[u8],
    patch: &[u8],
    verify_checksums: bool,
    max_target_len: Option<u64>,
) -> Result<Vec<u8>, DecodeError> {
    let info = PatchInfo::parse(patch)?;

    if let Some(limit) = max_target_len
        && info.header.target_len > limit
    {
        return Err(DecodeError::InvalidInput(format!(
            "declared target length {} exceeds limit {limit}",
            info.header.target_len
        )));
    }

    if verify_checksums {
        info.verify_patch_crc(patch)?;
        check(
            ChecksumKind::Source,
            info.footer.source_crc,
            checksum::crc32(source),
        )?;
    }
    if source.len() as u64 != info.header.source_len {
        return Err(DecodeError::SourceSizeMismatch {
            expected: info.header.source_len,
            actual: source.len() as u64,
        });
    }

    let target_len = usize::try_from(info.header.target_len)
        .map_err(|_| DecodeError::InvalidInput("target length exceeds address space".into()))?;
    let mut output = Vec::with_capacity(target_len.min(MAX_PREALLOC));

    for resolved in info.operations(patch) {
        let resolved = resolved?;
        let length = resolved.op.length();
        match resolved.op {
            Operation::TargetRead { .. } => output.extend_from_slice(resolved.literal),
            Operation::SourceRead { .. } | Operation::SourceCopy { .. } => {
                let from = resolved.read_offset.unwrap_or_default() as usize;
                output.extend_from_slice(&source[from..from + length]);
            }
            Operation::TargetCopy { .. } => {
                // Byte at a time: the copy may overlap the bytes it produces.
                let from = resolved.read_offset.unwrap_or_default() as usize;
                for i in 0..length {
                    let byte = output[from + i];
                    output.push(byte);
                }
            }
        }
    }

    if output.len() != target_len {
        return Err(DecodeError::InvalidInput(format!(
            "operation stream ended after {} of {target_len} target bytes",
            output.len()
        )));
    }

    if verify_checksums {
        check(
            ChecksumKind::Target,
            info.footer.target_crc,
            checksum::crc32(&output),
        )?;
    }

    log::debug!(
        "bps: applied {} byte patch, {} -> {} bytes",
        patch.len(),
        source.len(),
        output.len()
    );
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
