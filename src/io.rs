// File-level I/O helpers for patch creation/application.
//
// Provides `encode_file()` and `decode_file()` convenience functions. Both
// buffers are read fully into memory before the engine runs (the suffix
// array needs the whole input). Optionally computes SHA-256 digests of the
// inputs and output (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::bps::decoder::DecodeError;
use crate::bps::encoder::OperationCounts;
use crate::engine::{self, DecodeOptions, EncodeError, EncodeOptions};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Target file size in bytes.
    pub target_size: u64,
    /// Patch output size in bytes.
    pub patch_size: u64,
    /// Operations written, by kind.
    pub operations: OperationCounts,
    /// SHA-256 of the source file (if `file-io` feature is enabled).
    pub source_sha256: Option<[u8; 32]>,
    /// SHA-256 of the target file (if `file-io` feature is enabled).
    pub target_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Patch file size in bytes.
    pub patch_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Patch encoding error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Patch decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Create a patch from a source file and target file, writing to `patch_path`.
pub fn encode_file(
    source_path: &Path,
    target_path: &Path,
    patch_path: &Path,
    opts: &EncodeOptions,
) -> Result<EncodeStats, IoError> {
    let source = std::fs::read(source_path)?;
    let target = std::fs::read(target_path)?;

    let patch_file = File::create(patch_path)?;
    let mut patch_writer = BufWriter::with_capacity(BUF_SIZE, patch_file);
    let operations = engine::encode_to(&mut patch_writer, &source, &target, opts)?;
    let patch_size = patch_writer
        .into_inner()
        .map_err(|e| e.into_error())?
        .metadata()?
        .len();

    Ok(EncodeStats {
        source_size: source.len() as u64,
        target_size: target.len() as u64,
        patch_size,
        operations,
        source_sha256: sha256(&source),
        target_sha256: sha256(&target),
    })
}

// ---------------------------------------------------------------------------
// decode_file
// ---------------------------------------------------------------------------

/// Apply a patch file to a source file, writing the target to `output_path`.
///
/// Nothing is written if the patch fails to apply or verify.
pub fn decode_file(
    source_path: &Path,
    patch_path: &Path,
    output_path: &Path,
    opts: &DecodeOptions,
) -> Result<DecodeStats, IoError> {
    let source = std::fs::read(source_path)?;
    let patch = std::fs::read(patch_path)?;

    let output = engine::decode_with_options(&source, &patch, opts)?;

    let output_file = File::create(output_path)?;
    let mut output_writer = BufWriter::with_capacity(BUF_SIZE, output_file);
    output_writer.write_all(&output)?;
    output_writer.flush()?;

    Ok(DecodeStats {
        source_size: source.len() as u64,
        patch_size: patch.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    })
}

// ---------------------------------------------------------------------------
// Digests (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

/// Lowercase hex rendering of a digest.
pub fn hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
