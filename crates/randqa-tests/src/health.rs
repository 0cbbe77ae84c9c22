//! SP 800-90B style health tests: Repetition Count Test (RCT) and Adaptive
//! Proportion Test (APT).
//!
//! Both return a tri-state [`HealthOutcome`]. `NotRun` is reserved for input
//! too short to structurally support the test; it is never a failure.
//! Invalid parameters are rejected up front with a [`ParamError`].

use randqa_core::{BitSequence, ParamError};
use serde::Serialize;
use statrs::distribution::{Binomial, DiscreteCDF};

/// Outcome of a health test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthOutcome {
    Pass,
    Fail,
    NotRun { reason: String },
}

impl HealthOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail)
    }

    pub fn is_not_run(&self) -> bool {
        matches!(self, Self::NotRun { .. })
    }

    /// `PASS`, `FAIL` or `NOT RUN`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::NotRun { .. } => "NOT RUN",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Repetition Count Test
// ═══════════════════════════════════════════════════════════════════════════════

/// RCT result with diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RctResult {
    pub outcome: HealthOutcome,
    pub cutoff: usize,
    /// Longest run of identical bits.
    pub max_run: usize,
    /// Informational false-alarm bound `min(1, n * 2^(1 - cutoff))`.
    /// `None` when the test did not run.
    pub approx_false_alarm: Option<f64>,
    pub n: usize,
}

/// Repetition Count Test: fail iff some run of identical bits reaches `cutoff`.
pub fn repetition_count_test(bits: &BitSequence, cutoff: usize) -> Result<RctResult, ParamError> {
    if cutoff < 2 {
        return Err(ParamError::InvalidCutoff(cutoff));
    }
    let n = bits.len();
    if n == 0 {
        return Ok(RctResult {
            outcome: HealthOutcome::NotRun {
                reason: "insufficient bits: n=0".to_string(),
            },
            cutoff,
            max_run: 0,
            approx_false_alarm: None,
            n,
        });
    }

    let data = bits.as_slice();
    let mut max_run = 1;
    let mut run = 1;
    for i in 1..n {
        if data[i] == data[i - 1] {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 1;
        }
    }

    let exponent = 1.0 - cutoff as f64;
    let approx_false_alarm = (n as f64 * exponent.exp2()).min(1.0);
    let outcome = if max_run >= cutoff {
        HealthOutcome::Fail
    } else {
        HealthOutcome::Pass
    };
    log::debug!("rct n={n} cutoff={cutoff} max_run={max_run} -> {}", outcome.label());

    Ok(RctResult {
        outcome,
        cutoff,
        max_run,
        approx_false_alarm: Some(approx_false_alarm),
        n,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Adaptive Proportion Test
// ═══════════════════════════════════════════════════════════════════════════════

/// A window whose count of ones fell outside the acceptance interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AptViolation {
    pub window_index: usize,
    pub ones: u64,
}

/// APT result with diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AptResult {
    pub outcome: HealthOutcome,
    pub window: usize,
    pub alpha: f64,
    /// Acceptance interval `[lower, upper]` on the count of ones per window.
    pub lower: u64,
    pub upper: u64,
    pub n: usize,
    pub n_windows: usize,
    pub violations: Vec<AptViolation>,
}

/// Two-sided acceptance interval for the number of ones in a window of
/// `window` fair bits.
///
/// `lower` is the smallest `k` with `P(X <= k) >= alpha/2`; `upper` is the
/// smallest `k` with `P(X > k) <= alpha/2`.
pub fn apt_bounds(window: usize, alpha: f64) -> Result<(u64, u64), ParamError> {
    if window == 0 {
        return Err(ParamError::InvalidWindow(window));
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ParamError::InvalidAlpha(alpha));
    }
    let w = window as u64;
    let dist = Binomial::new(0.5, w).map_err(|_| ParamError::InvalidWindow(window))?;
    let tail = alpha / 2.0;
    let lower = (0..=w).find(|&k| dist.cdf(k) >= tail).unwrap_or(w);
    let upper = (lower..=w).find(|&k| dist.sf(k) <= tail).unwrap_or(w);
    Ok((lower, upper))
}

/// Adaptive Proportion Test over non-overlapping windows.
///
/// Trailing bits that do not fill a window are not evaluated. Every window
/// outside the acceptance interval is recorded.
pub fn adaptive_proportion_test(
    bits: &BitSequence,
    window: usize,
    alpha: f64,
) -> Result<AptResult, ParamError> {
    let (lower, upper) = apt_bounds(window, alpha)?;
    let n = bits.len();
    if n < window {
        return Ok(AptResult {
            outcome: HealthOutcome::NotRun {
                reason: format!("insufficient bits: n={n} < window={window}"),
            },
            window,
            alpha,
            lower,
            upper,
            n,
            n_windows: 0,
            violations: Vec::new(),
        });
    }

    let violations: Vec<AptViolation> = bits
        .as_slice()
        .chunks_exact(window)
        .enumerate()
        .filter_map(|(window_index, chunk)| {
            let ones = chunk.iter().map(|&b| b as u64).sum::<u64>();
            (ones < lower || ones > upper).then_some(AptViolation { window_index, ones })
        })
        .collect();

    let n_windows = n / window;
    let outcome = if violations.is_empty() {
        HealthOutcome::Pass
    } else {
        HealthOutcome::Fail
    };
    log::debug!(
        "apt n={n} window={window} bounds=[{lower}, {upper}] windows={n_windows} violations={}",
        violations.len()
    );

    Ok(AptResult {
        outcome,
        window,
        alpha,
        lower,
        upper,
        n,
        n_windows,
        violations,
    })
}
