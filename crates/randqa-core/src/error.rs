//! Error types shared by every randqa crate.
//!
//! Insufficient data is never an error: tests report it through their own
//! "not run" / "not applicable" states. Only structurally invalid parameters
//! and I/O or parsing failures surface here.

use std::path::PathBuf;

/// A parameter that a test or metric cannot operate with.
///
/// Raised at the entry of the offending function and never silently clamped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("window must be > 0, got {0}")]
    InvalidWindow(usize),
    #[error("alpha must lie strictly between 0 and 1, got {0}")]
    InvalidAlpha(f64),
    #[error("RCT cutoff must be >= 2, got {0}")]
    InvalidCutoff(usize),
    #[error("history length k must be >= 1, got {0}")]
    InvalidHistory(usize),
    #[error("history length k must be <= {max}, got {k}")]
    HistoryTooLong { k: usize, max: usize },
    #[error("train fraction must lie strictly between 0 and 1, got {0}")]
    InvalidTrainFraction(f64),
}

/// Errors raised while acquiring input or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum RandqaError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("invalid hex input: {0}")]
    InvalidHex(String),
    #[error("unknown source '{0}' (expected lcg, xorshift or osrandom)")]
    UnknownSource(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
