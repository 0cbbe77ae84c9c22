//! Run configuration for a test-suite invocation.
//!
//! Parameters can come from defaults, a TOML file, or command-line overrides.
//! Missing keys in a file fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParamError, RandqaError};

/// Default significance level.
pub const DEFAULT_ALPHA: f64 = 0.01;
/// Default Block Frequency block size `M`.
pub const DEFAULT_BLOCK_SIZE: usize = 128;
/// Default ML history length `k`.
pub const DEFAULT_ML_K: usize = 8;
/// Largest accepted ML history length `k`. The predictor's Newton solver
/// holds a `(k+1) x (k+1)` Hessian and does `O(patterns * k^2)` work per step.
pub const MAX_ML_K: usize = 64;
/// Default Repetition Count Test cutoff.
pub const DEFAULT_RCT_CUTOFF: usize = 34;
/// Default Adaptive Proportion Test window.
pub const DEFAULT_APT_WINDOW: usize = 512;
/// Default ML train/test split fraction.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.5;

/// Parameters for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Block Frequency block size `M`.
    pub block_size: usize,
    /// History length `k` for the ML next-bit predictor.
    pub ml_k: usize,
    /// Significance level for p-value tests, FDR and the APT interval.
    pub alpha: f64,
    /// Repetition Count Test cutoff.
    pub rct_cutoff: usize,
    /// Adaptive Proportion Test window size.
    pub apt_window: usize,
    /// Fraction of ML samples used for training (the rest is hold-out).
    pub train_fraction: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            ml_k: DEFAULT_ML_K,
            alpha: DEFAULT_ALPHA,
            rct_cutoff: DEFAULT_RCT_CUTOFF,
            apt_window: DEFAULT_APT_WINDOW,
            train_fraction: DEFAULT_TRAIN_FRACTION,
        }
    }
}

impl RunConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RandqaError> {
        let text = std::fs::read_to_string(path).map_err(|source| RandqaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| RandqaError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Every parameter problem, in field order. Empty means valid.
    pub fn problems(&self) -> Vec<ParamError> {
        let mut out = Vec::new();
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            out.push(ParamError::InvalidAlpha(self.alpha));
        }
        if self.rct_cutoff < 2 {
            out.push(ParamError::InvalidCutoff(self.rct_cutoff));
        }
        if self.apt_window == 0 {
            out.push(ParamError::InvalidWindow(self.apt_window));
        }
        if self.ml_k == 0 {
            out.push(ParamError::InvalidHistory(self.ml_k));
        } else if self.ml_k > MAX_ML_K {
            out.push(ParamError::HistoryTooLong {
                k: self.ml_k,
                max: MAX_ML_K,
            });
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            out.push(ParamError::InvalidTrainFraction(self.train_fraction));
        }
        out
    }

    /// First parameter problem, if any.
    pub fn validate(&self) -> Result<(), ParamError> {
        match self.problems().into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Advisory notes about sample size versus these settings.
    pub fn warnings(&self, n_bits: usize) -> Vec<String> {
        let mut notes = Vec::new();
        if n_bits < 50_000 {
            notes.push("Use >=100k bits for more stable statistical tests.".to_string());
        }
        let blocks = n_bits.checked_div(self.block_size).unwrap_or(0);
        if blocks < 20 {
            notes.push(format!(
                "Block Frequency has only {blocks} blocks; aim for >=20."
            ));
        }
        notes.push("Runs test requires the fraction of ones to be near 0.5.".to_string());
        let samples = n_bits.saturating_sub(self.ml_k);
        if samples < 5_000 {
            notes.push("ML predictor has few samples (<5k); accuracy may be noisy.".to_string());
        }
        if self.ml_k > 32 && n_bits < 500_000 {
            notes.push("k>32 usually needs hundreds of thousands of bits.".to_string());
        }
        notes
    }
}

/// Help text for each tunable, keyed by parameter name.
pub const PARAMETER_HELP: &[(&str, &str)] = &[
    (
        "source",
        "Entropy source: lcg (weak; LSB alternates), xorshift (fast, not cryptographic), \
         osrandom (OS CSPRNG).",
    ),
    (
        "bits",
        "Number of bits to sample. More bits give more stable p-values; \
         SP 800-22 style tests are usually run on >=100k bits.",
    ),
    (
        "block_size",
        "Block size M for the Block Frequency test. The stream is split into floor(n/M) \
         blocks, each checked for local bias. Typical M is 64..512.",
    ),
    (
        "ml_k",
        "History length k for the ML next-bit predictor. Larger k can reveal longer-range \
         structure but needs more samples. At most 64.",
    ),
    (
        "seed",
        "Seed for the PRNG sources (lcg, xorshift). Ignored for osrandom.",
    ),
    (
        "alpha",
        "Significance level. p > alpha passes a test; p <= alpha rejects randomness for it.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let cfg = RunConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.rct_cutoff, 34);
        assert_eq!(cfg.apt_window, 512);
    }

    #[test]
    fn every_problem_is_reported() {
        let cfg = RunConfig {
            alpha: 1.0,
            rct_cutoff: 1,
            apt_window: 0,
            ml_k: 0,
            train_fraction: 0.0,
            ..RunConfig::default()
        };
        let problems = cfg.problems();
        assert_eq!(problems.len(), 5);
        assert_eq!(cfg.validate(), Err(ParamError::InvalidAlpha(1.0)));
    }

    #[test]
    fn history_length_is_capped() {
        let at_cap = RunConfig {
            ml_k: MAX_ML_K,
            ..RunConfig::default()
        };
        assert_eq!(at_cap.validate(), Ok(()));

        let huge = RunConfig {
            ml_k: 100_000,
            ..RunConfig::default()
        };
        assert_eq!(
            huge.validate(),
            Err(ParamError::HistoryTooLong {
                k: 100_000,
                max: MAX_ML_K
            })
        );
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "block_size = 256\nalpha = 0.05").unwrap();
        let cfg = RunConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.block_size, 256);
        assert_eq!(cfg.alpha, 0.05);
        assert_eq!(cfg.ml_k, DEFAULT_ML_K);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "block_size = \"big\"").unwrap();
        assert!(matches!(
            RunConfig::from_file(file.path()),
            Err(RandqaError::Config { .. })
        ));
    }

    #[test]
    fn warnings_for_small_samples() {
        let cfg = RunConfig::default();
        let notes = cfg.warnings(1_000);
        assert!(notes.iter().any(|n| n.contains("100k")));
        assert!(notes.iter().any(|n| n.contains("7 blocks")));
        assert!(notes.iter().any(|n| n.contains("few samples")));

        let big = cfg.warnings(1_000_000);
        assert_eq!(big.len(), 1, "only the runs reminder remains: {big:?}");
    }

    #[test]
    fn zero_block_size_counts_no_blocks() {
        let cfg = RunConfig {
            block_size: 0,
            ..RunConfig::default()
        };
        assert!(cfg.warnings(100_000).iter().any(|n| n.contains("only 0 blocks")));
    }
}
