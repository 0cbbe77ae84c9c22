//! Bit materialization.
//!
//! Converts sources, raw bytes and hex text into a [`BitSequence`], the
//! immutable unit every test operates on. Byte-packed representations are
//! always LSB-first: bit 0 of byte 0 is the first bit of the sequence.

use crate::error::RandqaError;
use crate::source::BitSource;

/// Ordered, fixed-length sequence of 0/1 values.
///
/// There are no mutating accessors; once produced, a sequence is only read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitSequence {
    bits: Vec<u8>,
}

impl BitSequence {
    /// Wrap a vector of 0/1 values. Returns `None` if any value is not 0 or 1.
    pub fn from_bits(bits: Vec<u8>) -> Option<Self> {
        if bits.iter().any(|&b| b > 1) {
            return None;
        }
        Some(Self { bits })
    }

    /// Build from an iterator of booleans.
    pub fn from_bools<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().map(u8::from).collect(),
        }
    }

    /// Unpack `bytes` LSB-first and keep the first `n_bits` (clamped to what
    /// the bytes hold).
    pub fn from_bytes_lsb_first(bytes: &[u8], n_bits: usize) -> Self {
        let n = n_bits.min(bytes.len() * 8);
        let mut bits = Vec::with_capacity(n);
        'outer: for &byte in bytes {
            for shift in 0..8 {
                if bits.len() == n {
                    break 'outer;
                }
                bits.push((byte >> shift) & 1);
            }
        }
        Self { bits }
    }

    /// `n` zero bits.
    pub fn zeros(n: usize) -> Self {
        Self { bits: vec![0; n] }
    }

    /// `n` one bits.
    pub fn ones(n: usize) -> Self {
        Self { bits: vec![1; n] }
    }

    /// `n` bits of 0,1,0,1,...
    pub fn alternating(n: usize) -> Self {
        Self {
            bits: (0..n).map(|i| (i % 2) as u8).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Raw 0/1 values.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bits
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|&b| b as usize).sum()
    }

    pub fn count_zeros(&self) -> usize {
        self.len() - self.count_ones()
    }

    /// Pack LSB-first, zero-padding the final partial byte.
    pub fn to_bytes_lsb_first(&self) -> Vec<u8> {
        pack_lsb_first(&self.bits)
    }
}

/// Pack 0/1 values into bytes, LSB-first within each byte.
///
/// A trailing partial byte is zero-padded, never dropped.
pub fn pack_lsb_first(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (shift, &bit)| acc | ((bit & 1) << shift))
        })
        .collect()
}

/// Result of pulling bits from a source or payload.
///
/// A short read (`bits.len() < requested`) is a normal, reportable outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub bits: BitSequence,
    pub requested: usize,
}

impl Acquisition {
    /// True if fewer bits were delivered than requested.
    pub fn is_short(&self) -> bool {
        self.bits.len() < self.requested
    }

    /// Number of requested bits that were not delivered.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.bits.len())
    }
}

/// Pull `n_bits` from a source, eagerly.
///
/// Whole bytes are requested through `next_bytes` and unpacked LSB-first; the
/// final `n_bits % 8` bits come from `next_bit`. Since a source is a single
/// stream this equals unpacking `ceil(n_bits / 8)` bytes and truncating, but
/// leaves the source positioned exactly `n_bits` further on.
pub fn bits_from_source(src: &mut dyn BitSource, n_bits: usize) -> Acquisition {
    let whole = n_bits / 8;
    let bytes = src.next_bytes(whole);
    let mut bits = Vec::with_capacity(n_bits);
    for &byte in &bytes {
        for shift in 0..8 {
            bits.push((byte >> shift) & 1);
        }
    }
    if bytes.len() == whole {
        for _ in 0..n_bits % 8 {
            match src.next_bit() {
                Some(bit) => bits.push(bit & 1),
                None => break,
            }
        }
    }
    let acquisition = Acquisition {
        bits: BitSequence { bits },
        requested: n_bits,
    };
    if acquisition.is_short() {
        log::warn!(
            "source '{}' delivered {} of {} requested bits",
            src.name(),
            acquisition.bits.len(),
            n_bits
        );
    }
    acquisition
}

/// Materialize an uploaded payload. `n_bits = None` takes every bit.
pub fn bits_from_bytes(bytes: &[u8], n_bits: Option<usize>) -> Acquisition {
    let requested = n_bits.unwrap_or(bytes.len() * 8);
    Acquisition {
        bits: BitSequence::from_bytes_lsb_first(bytes, requested),
        requested,
    }
}

/// Parse hex text into bytes.
///
/// Accepts an optional `0x` prefix and ignores ASCII whitespace, `:` and `-`
/// separators. An odd number of digits or any other character is an error.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, RandqaError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let mut digits = Vec::with_capacity(body.len());
    for (i, c) in body.char_indices() {
        if c.is_ascii_whitespace() || c == ':' || c == '-' {
            continue;
        }
        let d = c
            .to_digit(16)
            .ok_or_else(|| RandqaError::InvalidHex(format!("unexpected '{c}' at offset {i}")))?;
        digits.push(d as u8);
    }
    if digits.len() % 2 != 0 {
        return Err(RandqaError::InvalidHex(format!(
            "odd number of hex digits ({})",
            digits.len()
        )));
    }
    Ok(digits.chunks(2).map(|p| (p[0] << 4) | p[1]).collect())
}
