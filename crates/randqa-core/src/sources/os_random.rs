//! Operating system CSPRNG as a bit source.

use crate::source::BitSource;

const BUFFER_SIZE: usize = 4096;

/// Buffered reader over the OS CSPRNG.
///
/// A 4 KiB buffer backs both operations. Byte-aligned `next_bytes` calls copy
/// straight out of the buffer; unaligned calls assemble bytes from `next_bit`
/// so the stream never skips or repeats bits.
#[derive(Debug)]
pub struct OsRandom {
    buf: Vec<u8>,
    byte_idx: usize,
    bit_idx: u8,
}

impl OsRandom {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            byte_idx: 0,
            bit_idx: 0,
        }
    }

    /// Make sure `buf[byte_idx]` exists. Returns false if the OS refused.
    fn ensure_byte(&mut self) -> bool {
        if self.byte_idx < self.buf.len() {
            return true;
        }
        let mut fresh = vec![0u8; BUFFER_SIZE];
        if let Err(e) = getrandom::fill(&mut fresh) {
            log::error!("OS CSPRNG failed: {e}");
            return false;
        }
        self.buf = fresh;
        self.byte_idx = 0;
        self.bit_idx = 0;
        true
    }
}

impl Default for OsRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl BitSource for OsRandom {
    fn name(&self) -> &str {
        "osrandom"
    }

    fn next_bit(&mut self) -> Option<u8> {
        if !self.ensure_byte() {
            return None;
        }
        let bit = (self.buf[self.byte_idx] >> self.bit_idx) & 1;
        self.bit_idx += 1;
        if self.bit_idx == 8 {
            self.bit_idx = 0;
            self.byte_idx += 1;
        }
        Some(bit)
    }

    fn next_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n);
        if self.bit_idx == 0 {
            while out.len() < n {
                if !self.ensure_byte() {
                    break;
                }
                let take = (n - out.len()).min(self.buf.len() - self.byte_idx);
                out.extend_from_slice(&self.buf[self.byte_idx..self.byte_idx + take]);
                self.byte_idx += take;
            }
            return out;
        }
        'bytes: for _ in 0..n {
            let mut byte = 0u8;
            for shift in 0..8 {
                match self.next_bit() {
                    Some(bit) => byte |= bit << shift,
                    None => break 'bytes,
                }
            }
            out.push(byte);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_bytes_across_refills() {
        let mut src = OsRandom::new();
        let bytes = src.next_bytes(BUFFER_SIZE + 100);
        assert_eq!(bytes.len(), BUFFER_SIZE + 100);
    }

    #[test]
    fn unaligned_reads_keep_continuity() {
        let mut src = OsRandom::new();
        let _ = src.next_bit();
        let bytes = src.next_bytes(3);
        assert_eq!(bytes.len(), 3);
        assert_eq!(src.bit_idx, 1);
        assert_eq!(src.byte_idx, 3);
    }

    #[test]
    fn not_constant() {
        let mut src = OsRandom::new();
        let a = src.next_bytes(64);
        let b = src.next_bytes(64);
        assert_ne!(a, b);
    }
}
