// BPS patch header and footer.
//
// Layout:
//   "BPS1" magic (4 bytes)
//   varint source_length
//   varint target_length
//   varint metadata_length, followed by that many metadata bytes
//   ... operation stream ...
//   u32 LE CRC-32 of source
//   u32 LE CRC-32 of target
//   u32 LE CRC-32 of every preceding patch byte

use super::decoder::DecodeError;
use super::varint;

pub const BPS_MAGIC: [u8; 4] = *b"BPS1";

/// Size of the checksum footer.
pub const FOOTER_LEN: usize = 12;

/// Smallest possible patch: magic, three one-byte varints, footer.
pub const MIN_PATCH_LEN: usize = BPS_MAGIC.len() + 3 + FOOTER_LEN;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Parsed patch header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchHeader {
    pub source_len: u64,
    pub target_len: u64,
    /// Free-form metadata (usually empty).
    pub metadata: Vec<u8>,
}

impl PatchHeader {
    /// Append the encoded header (magic included) to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&BPS_MAGIC);
        varint::push_u64(out, self.source_len);
        varint::push_u64(out, self.target_len);
        varint::push_usize(out, self.metadata.len());
        out.extend_from_slice(&self.metadata);
    }

    /// Parse a header from the start of `data`.
    /// Returns the header and its encoded size.
    pub fn parse(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        if data.len() < BPS_MAGIC.len() {
            return Err(DecodeError::TooSmall(data.len()));
        }
        if data[..BPS_MAGIC.len()] != BPS_MAGIC {
            return Err(DecodeError::BadMagic);
        }
        let mut pos = BPS_MAGIC.len();

        let (source_len, used) = varint::read_u64(&data[pos..])?;
        pos += used;
        let (target_len, used) = varint::read_u64(&data[pos..])?;
        pos += used;
        let (metadata_len, used) = varint::read_usize(&data[pos..])?;
        pos += used;

        let metadata = data
            .get(pos..)
            .and_then(|rest| rest.get(..metadata_len))
            .ok_or_else(|| {
                DecodeError::InvalidInput(format!(
                    "metadata length {metadata_len} exceeds patch size"
                ))
            })?
            .to_vec();
        pos += metadata_len;

        Ok((
            Self {
                source_len,
                target_len,
                metadata,
            },
            pos,
        ))
    }
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

/// The three trailing checksums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchFooter {
    pub source_crc: u32,
    pub target_crc: u32,
    pub patch_crc: u32,
}

impl PatchFooter {
    /// Read the footer from the last [`FOOTER_LEN`] bytes of a patch.
    pub fn parse(patch: &[u8]) -> Result<Self, DecodeError> {
        if patch.len() < FOOTER_LEN {
            return Err(DecodeError::TooSmall(patch.len()));
        }
        let tail = &patch[patch.len() - FOOTER_LEN..];
        let word = |i: usize| u32::from_le_bytes([tail[i], tail[i + 1], tail[i + 2], tail[i + 3]]);
        Ok(Self {
            source_crc: word(0),
            target_crc: word(4),
            patch_crc: word(8),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
