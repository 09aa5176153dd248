// BPS patch format implementation.
//
// # Modules
//
// - `varint`   : Variable-length integers (7-bit groups, decrement on continuation)
// - `checksum` : CRC-32 for the three footer checksums
// - `operation`: SourceRead/TargetRead/SourceCopy/TargetCopy encoding
// - `header`   : Magic, size header, metadata, checksum footer
// - `encoder`  : Operation emission with relative copy offsets
// - `decoder`  : Patch parsing, inspection, and application

pub mod checksum;
pub mod decoder;
pub mod encoder;
pub mod header;
pub mod operation;
pub mod varint;

// Re-export key types for convenience.
pub use checksum::crc32;
pub use decoder::{
    ChecksumKind, DEFAULT_MAX_TARGET_LEN, DecodeError, OperationIterator, PatchInfo, ResolvedOp,
    apply, apply_limited,
};
pub use encoder::{OperationCounts, PatchEncoder};
pub use header::{BPS_MAGIC, FOOTER_LEN, PatchFooter, PatchHeader};
pub use operation::{OpKind, Operation};
