// CRC-32 (IEEE 802.3, reflected polynomial 0xEDB88320).
//
// Initial value all-ones, result complemented. Uses `crc32fast` when the
// `crc32` feature is enabled; otherwise a byte-wise table implementation
// with identical output.

/// Streaming CRC-32 state.
#[derive(Clone)]
pub struct Crc32 {
    #[cfg(feature = "crc32")]
    inner: crc32fast::Hasher,
    #[cfg(not(feature = "crc32"))]
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "crc32")]
            inner: crc32fast::Hasher::new(),
            #[cfg(not(feature = "crc32"))]
            state: 0xFFFF_FFFF,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        #[cfg(feature = "crc32")]
        {
            self.inner.update(data);
        }
        #[cfg(not(feature = "crc32"))]
        {
            let table = table();
            let mut crc = self.state;
            for &byte in data {
                crc = (crc >> 8) ^ table[((crc ^ u32::from(byte)) & 0xFF) as usize];
            }
            self.state = crc;
        }
    }

    pub fn finish(self) -> u32 {
        #[cfg(feature = "crc32")]
        {
            self.inner.finalize()
        }
        #[cfg(not(feature = "crc32"))]
        {
            !self.state
        }
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC-32 of a whole buffer.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(data);
    hasher.finish()
}

#[cfg(not(feature = "crc32"))]
fn table() -> &'static [u32; 256] {
    static TABLE: std::sync::OnceLock<[u32; 256]> = std::sync::OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        for (n, slot) in table.iter_mut().enumerate() {
            let mut crc = n as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0xEDB8_8320
                } else {
                    crc >> 1
                };
            }
            *slot = crc;
        }
        table
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_values() {
        assert_eq!(crc32(b""), 0);
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(
            crc32(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = b"hello incremental world";
        let mut hasher = Crc32::new();
        for chunk in data.chunks(5) {
            hasher.update(chunk);
        }
        assert_eq!(hasher.finish(), crc32(data));
    }
}
