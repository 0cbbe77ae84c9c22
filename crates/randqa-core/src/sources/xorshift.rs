//! Marsaglia xorshift32 generator.

use crate::source::BitSource;

/// Replacement for the all-zero seed, which is a fixed point of xorshift.
const DEFAULT_SEED: u32 = 2_463_534_242;

/// Xorshift32 (shifts 13/17/5).
///
/// The bit stream is the little-endian byte sequence of successive 32-bit
/// outputs. Bits and bytes are drawn from the same buffered word, so
/// interleaved `next_bit`/`next_bytes` calls never lose alignment.
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
    word: u32,
    /// Bits of `word` already consumed (32 = need a fresh word).
    used: u32,
}

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { DEFAULT_SEED } else { seed };
        Self {
            state,
            word: 0,
            used: 32,
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl BitSource for XorShift32 {
    fn name(&self) -> &str {
        "xorshift"
    }

    fn next_bit(&mut self) -> Option<u8> {
        if self.used == 32 {
            self.word = self.next_u32();
            self.used = 0;
        }
        let bit = ((self.word >> self.used) & 1) as u8;
        self.used += 1;
        Some(bit)
    }

    fn next_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n);
        // Byte-aligned: hand out whole bytes of the current and following words.
        if self.used % 8 == 0 {
            while out.len() < n {
                if self.used == 32 {
                    self.word = self.next_u32();
                    self.used = 0;
                }
                out.push((self.word >> self.used) as u8);
                self.used += 8;
            }
            return out;
        }
        for _ in 0..n {
            let mut byte = 0u8;
            for shift in 0..8 {
                byte |= self.next_bit().unwrap_or(0) << shift;
            }
            out.push(byte);
        }
        out
    }
}
