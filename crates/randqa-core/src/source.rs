//! Bit source capability and source registry.
//!
//! Every generator implements the [`BitSource`] trait. A source is one logical
//! stream of bits: `next_bit` and `next_bytes` draw from the same cursor, and
//! bytes are packed least-significant-bit first (the first bit drawn lands in
//! bit position 0).

use std::str::FromStr;

use crate::error::RandqaError;
use crate::sources::{Lcg, OsRandom, XorShift32};

/// Kind of bit source available to the analysis front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Linear congruential generator (weak reference source).
    Lcg,
    /// Marsaglia xorshift32 (fast, not cryptographic).
    Xorshift,
    /// Operating system CSPRNG.
    OsRandom,
}

impl SourceKind {
    /// Every registered source, in display order.
    pub const ALL: [SourceKind; 3] = [Self::Lcg, Self::Xorshift, Self::OsRandom];

    /// Stable identifier used on the command line and in reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Lcg => "lcg",
            Self::Xorshift => "xorshift",
            Self::OsRandom => "osrandom",
        }
    }

    /// One-line description of the source.
    pub fn description(self) -> &'static str {
        match self {
            Self::Lcg => "simple linear-congruential PRNG (weak; LSB alternates)",
            Self::Xorshift => "fast xorshift32 PRNG (not cryptographic)",
            Self::OsRandom => "OS CSPRNG (strong)",
        }
    }

    /// Whether the source output depends on the seed.
    pub fn is_seeded(self) -> bool {
        !matches!(self, Self::OsRandom)
    }

    /// Build a fresh, independently owned source. The seed is ignored for
    /// unseeded sources.
    pub fn build(self, seed: u32) -> Box<dyn BitSource> {
        match self {
            Self::Lcg => Box::new(Lcg::new(seed)),
            Self::Xorshift => Box::new(XorShift32::new(seed)),
            Self::OsRandom => Box::new(OsRandom::new()),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SourceKind {
    type Err = RandqaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lcg" => Ok(Self::Lcg),
            "xorshift" | "xorshift32" => Ok(Self::Xorshift),
            "osrandom" | "os" | "urandom" => Ok(Self::OsRandom),
            other => Err(RandqaError::UnknownSource(other.to_string())),
        }
    }
}

/// Capability contract for anything that produces a stream of bits.
pub trait BitSource: Send {
    /// Source name for reports.
    fn name(&self) -> &str;

    /// Draw the next bit (0 or 1). `None` once a finite source is exhausted.
    fn next_bit(&mut self) -> Option<u8>;

    /// Draw up to `n` whole bytes, LSB-first. Finite sources may return fewer.
    ///
    /// The default assembles bytes from [`next_bit`](Self::next_bit); a partial
    /// trailing byte from an exhausted source is dropped.
    fn next_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n);
        'bytes: for _ in 0..n {
            let mut byte = 0u8;
            for shift in 0..8 {
                match self.next_bit() {
                    Some(bit) => byte |= (bit & 1) << shift,
                    None => break 'bytes,
                }
            }
            out.push(byte);
        }
        out
    }
}
