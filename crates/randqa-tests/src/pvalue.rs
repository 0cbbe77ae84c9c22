//! SP 800-22 style p-value battery: balance, runs, block frequency and
//! approximate entropy.
//!
//! Each test is a pure function of the bit sequence and its parameters. The
//! value returned for degenerate input is a per-test convention and is NOT
//! uniform across the battery:
//!
//! | test                | degenerate input             | p   |
//! |---------------------|------------------------------|-----|
//! | balance (mono-bit)  | `n = 0`                      | 1.0 |
//! | runs                | `n < 2` or precondition fails | 0.0 |
//! | block frequency     | no complete block            | 0.0 |
//! | approximate entropy | `n <= m + 1`                 | 0.0 |

use randqa_core::BitSequence;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::erf::erfc;
use std::f64::consts::{LN_2, SQRT_2};

/// Default pattern length for the approximate entropy test.
pub const APEN_DEFAULT_M: usize = 2;

// ═══════════════════════════════════════════════════════════════════════════════
// Test identity
// ═══════════════════════════════════════════════════════════════════════════════

/// The four hypothesis tests that feed the FDR correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueTest {
    MonoBit,
    Runs,
    BlockFrequency,
    ApproxEntropy,
}

impl PValueTest {
    pub const ALL: [PValueTest; 4] = [
        Self::MonoBit,
        Self::Runs,
        Self::BlockFrequency,
        Self::ApproxEntropy,
    ];

    /// Machine-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::MonoBit => "mono_bit",
            Self::Runs => "runs",
            Self::BlockFrequency => "block_frequency",
            Self::ApproxEntropy => "approx_entropy",
        }
    }

    /// Human-readable name for reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::MonoBit => "Mono_bit",
            Self::Runs => "Runs",
            Self::BlockFrequency => "Block Frequency",
            Self::ApproxEntropy => "Approximate Entropy",
        }
    }
}

impl std::fmt::Display for PValueTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raw p-values of the four tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PValues {
    pub mono_bit: f64,
    pub runs: f64,
    pub block_frequency: f64,
    pub approx_entropy: f64,
}

impl PValues {
    /// Run the whole battery.
    pub fn compute(bits: &BitSequence, block_size: usize) -> Self {
        let p = Self {
            mono_bit: mono_bit_pvalue(bits),
            runs: runs_pvalue(bits),
            block_frequency: block_frequency_pvalue(bits, block_size),
            approx_entropy: approximate_entropy_pvalue(bits, APEN_DEFAULT_M),
        };
        log::debug!(
            "p-values n={}: mono_bit={:.6} runs={:.6} block_frequency={:.6} approx_entropy={:.6}",
            bits.len(),
            p.mono_bit,
            p.runs,
            p.block_frequency,
            p.approx_entropy
        );
        p
    }

    pub fn get(&self, test: PValueTest) -> f64 {
        match test {
            PValueTest::MonoBit => self.mono_bit,
            PValueTest::Runs => self.runs,
            PValueTest::BlockFrequency => self.block_frequency,
            PValueTest::ApproxEntropy => self.approx_entropy,
        }
    }

    /// `(test, p)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (PValueTest, f64)> + '_ {
        PValueTest::ALL.into_iter().map(|t| (t, self.get(t)))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Upper-tail probability of a chi-squared statistic: `Q(df/2, x/2)`.
fn chi2_sf(df: f64, x: f64) -> f64 {
    let Ok(dist) = ChiSquared::new(df) else {
        return 0.0;
    };
    let p = dist.sf(x.max(0.0));
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. FREQUENCY TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Balance (mono-bit) test: `S = (ones - zeros) / sqrt(n)`, `p = erfc(|S| / sqrt(2))`.
///
/// An empty sequence carries no evidence against randomness: `p = 1.0`.
pub fn mono_bit_pvalue(bits: &BitSequence) -> f64 {
    let n = bits.len();
    if n == 0 {
        return 1.0;
    }
    let ones = bits.count_ones() as i64;
    let zeros = n as i64 - ones;
    let s = (ones - zeros) as f64 / (n as f64).sqrt();
    erfc(s.abs() / SQRT_2).clamp(0.0, 1.0)
}

/// Block frequency test with block size `m`.
///
/// `N = floor(n / m)` blocks (remainder discarded),
/// `X^2 = 4m * sum((pi_i - 0.5)^2)`, `p = Q(N/2, X^2/2)`.
/// No complete block (including `m = 0`) gives `p = 0.0`.
pub fn block_frequency_pvalue(bits: &BitSequence, m: usize) -> f64 {
    if m == 0 {
        return 0.0;
    }
    let num_blocks = bits.len() / m;
    if num_blocks == 0 {
        return 0.0;
    }
    let chi2: f64 = bits
        .as_slice()
        .chunks_exact(m)
        .map(|block| {
            let ones: usize = block.iter().map(|&b| b as usize).sum();
            let pi = ones as f64 / m as f64;
            (pi - 0.5) * (pi - 0.5)
        })
        .sum::<f64>()
        * 4.0
        * m as f64;
    chi2_sf(num_blocks as f64, chi2)
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. RUNS TEST
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs test.
///
/// Requires `|pi - 0.5| < 2 / sqrt(n)`. When the precondition fails (which
/// includes all-zero and all-one input) the test signals strong rejection
/// with `p = 0.0` instead of being skipped. Sequences shorter than 2 bits also
/// give `0.0`.
pub fn runs_pvalue(bits: &BitSequence) -> f64 {
    let n = bits.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let pi = bits.count_ones() as f64 / nf;
    let tau = 2.0 / nf.sqrt();
    if pi == 0.0 || pi == 1.0 || (pi - 0.5).abs() >= tau {
        return 0.0;
    }

    let transitions = bits.as_slice().windows(2).filter(|w| w[0] != w[1]).count();
    let v = (transitions + 1) as f64;
    let spread = pi * (1.0 - pi);
    let num = (v - 2.0 * nf * spread).abs();
    let denom = 2.0 * (2.0 * nf).sqrt() * spread;
    if denom == 0.0 {
        return 0.0;
    }
    erfc(num / denom).clamp(0.0, 1.0)
}

// ═══════════════════════════════════════════════════════════════════════════════
// 3. PATTERN TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// `Phi_m = sum (c/n) ln(c/n)` over overlapping `m`-bit patterns, with the
/// sequence extended by wrap-around of its first `m - 1` bits.
fn phi(bits: &[u8], m: usize) -> f64 {
    let n = bits.len();
    let mut counts = vec![0u64; 1usize << m];
    for i in 0..n {
        let mut code = 0usize;
        for j in 0..m {
            code = (code << 1) | bits[(i + j) % n] as usize;
        }
        counts[code] += 1;
    }
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n as f64;
            p * p.ln()
        })
        .sum()
}

/// Approximate entropy test with pattern length `m` (default 2).
///
/// `ApEn = Phi_m - Phi_{m+1}`, `chi^2 = 2n * max(0, ln 2 - ApEn)`,
/// `p = Q(2^(m-1), chi^2 / 2)`. Requires `n > m + 1` and `m >= 1`;
/// otherwise `p = 0.0`.
pub fn approximate_entropy_pvalue(bits: &BitSequence, m: usize) -> f64 {
    let n = bits.len();
    if m == 0 || n <= m + 1 {
        return 0.0;
    }
    let apen = phi(bits.as_slice(), m) - phi(bits.as_slice(), m + 1);
    // Finite-sample noise can push ApEn slightly above ln 2.
    let chi2 = 2.0 * n as f64 * (LN_2 - apen).max(0.0);
    // Q(v, chi2/2) with v = 2^(m-1) is the chi-squared tail with 2v = 2^m dof.
    chi2_sf((1u64 << m) as f64, chi2)
}
