// BPS patch operations.
//
// Each operation is one varint: `kind | ((length - 1) << 2)`.
// Copies append a sign-magnitude varint holding the offset relative to the
// end of the previous copy of the same kind. TargetRead is followed by its
// literal bytes, which are not part of this module's encoding.

use super::varint::{self, VarIntError};

/// The two-bit operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpKind {
    /// Copy bytes from the source at the current output position.
    SourceRead = 0,
    /// Literal bytes stored inline in the patch.
    TargetRead = 1,
    /// Copy bytes from anywhere in the source.
    SourceCopy = 2,
    /// Copy bytes from earlier in the target.
    TargetCopy = 3,
}

impl OpKind {
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::SourceRead,
            1 => Self::TargetRead,
            2 => Self::SourceCopy,
            _ => Self::TargetCopy,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SourceRead => "SourceRead",
            Self::TargetRead => "TargetRead",
            Self::SourceCopy => "SourceCopy",
            Self::TargetCopy => "TargetCopy",
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single patch operation. `length` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SourceRead { length: usize },
    TargetRead { length: usize },
    SourceCopy { length: usize, delta: i64 },
    TargetCopy { length: usize, delta: i64 },
}

impl Operation {
    #[inline]
    pub fn kind(&self) -> OpKind {
        match self {
            Self::SourceRead { .. } => OpKind::SourceRead,
            Self::TargetRead { .. } => OpKind::TargetRead,
            Self::SourceCopy { .. } => OpKind::SourceCopy,
            Self::TargetCopy { .. } => OpKind::TargetCopy,
        }
    }

    #[inline]
    pub fn length(&self) -> usize {
        match *self {
            Self::SourceRead { length }
            | Self::TargetRead { length }
            | Self::SourceCopy { length, .. }
            | Self::TargetCopy { length, .. } => length,
        }
    }

    /// Relative offset of a copy operation.
    pub fn delta(&self) -> Option<i64> {
        match *self {
            Self::SourceCopy { delta, .. } | Self::TargetCopy { delta, .. } => Some(delta),
            _ => None,
        }
    }

    /// Append the operation word (and copy offset) to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        debug_assert!(self.length() >= 1);
        let word = self.kind() as u64 | (((self.length() - 1) as u64) << 2);
        varint::push_u64(out, word);
        if let Some(delta) = self.delta() {
            varint::push_u64(out, varint::encode_offset(delta));
        }
    }

    /// Parse one operation from the start of `data`.
    /// Returns the operation and the number of bytes consumed; literal bytes
    /// following a TargetRead are not consumed.
    pub fn parse(data: &[u8]) -> Result<(Self, usize), VarIntError> {
        let (word, mut pos) = varint::read_u64(data)?;
        let length = usize::try_from((word >> 2) + 1).map_err(|_| VarIntError::Overflow)?;

        let op = match OpKind::from_bits(word as u8) {
            OpKind::SourceRead => Self::SourceRead { length },
            OpKind::TargetRead => Self::TargetRead { length },
            kind => {
                let (raw, used) = varint::read_u64(&data[pos..])?;
                pos += used;
                let delta = varint::decode_offset(raw);
                if kind == OpKind::SourceCopy {
                    Self::SourceCopy { length, delta }
                } else {
                    Self::TargetCopy { length, delta }
                }
            }
        };
        Ok((op, pos))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(op: Operation) -> Vec<u8> {
        let mut out = Vec::new();
        op.encode_into(&mut out);
        out
    }

    #[test]
    fn operation_words() {
        // SourceRead(6): 0 | (5 << 2) = 20
        assert_eq!(bytes(Operation::SourceRead { length: 6 }), [0x80 | 20]);
        // TargetRead(1): 1 | 0 = 1
        assert_eq!(bytes(Operation::TargetRead { length: 1 }), [0x81]);
        // SourceCopy(4, 0): 2 | (3 << 2) = 14, offset 0
        assert_eq!(
            bytes(Operation::SourceCopy {
                length: 4,
                delta: 0
            }),
            [0x80 | 14, 0x80]
        );
        // TargetCopy(4, -2): 3 | (3 << 2) = 15, offset (2 << 1) | 1 = 5
        assert_eq!(
            bytes(Operation::TargetCopy {
                length: 4,
                delta: -2
            }),
            [0x80 | 15, 0x85]
        );
    }

    #[test]
    fn parse_inverts_encode() {
        let ops = [
            Operation::SourceRead { length: 1 },
            Operation::TargetRead { length: 300 },
            Operation::SourceCopy {
                length: 70_000,
                delta: -12_345,
            },
            Operation::TargetCopy {
                length: 4,
                delta: 9,
            },
        ];
        let mut out = Vec::new();
        for op in &ops {
            op.encode_into(&mut out);
        }
        let mut pos = 0;
        for op in &ops {
            let (parsed, used) = Operation::parse(&out[pos..]).unwrap();
            assert_eq!(&parsed, op);
            pos += used;
        }
        assert_eq!(pos, out.len());
    }

    #[test]
    fn truncated_copy_offset() {
        let mut out = Vec::new();
        varint::push_u64(&mut out, OpKind::SourceCopy as u64);
        assert_eq!(Operation::parse(&out), Err(VarIntError::Underflow));
    }
}
