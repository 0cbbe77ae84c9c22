//! Finite bit source over an uploaded byte payload.

use crate::source::BitSource;

/// Replays a fixed byte payload LSB-first, then reports exhaustion.
#[derive(Debug, Clone)]
pub struct PayloadSource {
    name: String,
    data: Vec<u8>,
    /// Absolute bit position into `data`.
    pos: usize,
}

impl PayloadSource {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
            pos: 0,
        }
    }

    /// Bits not yet drawn.
    pub fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.pos
    }
}

impl BitSource for PayloadSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_bit(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos / 8)?;
        let bit = (byte >> (self.pos % 8)) & 1;
        self.pos += 1;
        Some(bit)
    }

    fn next_bytes(&mut self, n: usize) -> Vec<u8> {
        if self.pos % 8 == 0 {
            let start = self.pos / 8;
            let end = (start + n).min(self.data.len());
            self.pos = end * 8;
            return self.data[start..end].to_vec();
        }
        let whole = n.min(self.remaining_bits() / 8);
        let mut out = Vec::with_capacity(whole);
        for _ in 0..whole {
            let mut byte = 0u8;
            for shift in 0..8 {
                byte |= self.next_bit().unwrap_or(0) << shift;
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
    fn exhausts_after_payload() {
        let mut src = PayloadSource::new("upload", vec![0xAB]);
        assert_eq!(src.next_bytes(4), vec![0xAB]);
        assert_eq!(src.next_bit(), None);
        assert!(src.next_bytes(1).is_empty());
    }

    #[test]
    fn unaligned_bytes_stop_at_last_whole_byte() {
        let mut src = PayloadSource::new("upload", vec![0xFF, 0x00]);
        assert_eq!(src.next_bit(), Some(1));
        let bytes = src.next_bytes(5);
        assert_eq!(bytes, vec![0x7F]);
        assert_eq!(src.remaining_bits(), 7);
    }
}
