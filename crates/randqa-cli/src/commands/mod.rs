pub mod analyze;
pub mod compare;
pub mod server;

use std::path::PathBuf;

use clap::Args;
use randqa_core::{RandqaError, RunConfig};

/// Default number of bits sampled from a generator.
pub const DEFAULT_BITS: usize = 100_000;

/// Test parameters shared by every subcommand that runs the battery.
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Block size M for the Block Frequency test [default: 128]
    #[arg(long)]
    pub block_size: Option<usize>,

    /// History length k for the ML next-bit predictor, at most 64 [default: 8]
    #[arg(long)]
    pub ml_k: Option<usize>,

    /// Significance level for p-values, FDR and the APT interval [default: 0.01]
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Repetition Count Test cutoff [default: 34]
    #[arg(long)]
    pub rct_cutoff: Option<usize>,

    /// Adaptive Proportion Test window size [default: 512]
    #[arg(long)]
    pub apt_window: Option<usize>,

    /// Fraction of ML samples used for training [default: 0.5]
    #[arg(long)]
    pub train_fraction: Option<f64>,

    /// TOML file with defaults for the parameters above (flags win)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl TuningArgs {
    /// Defaults, then the config file, then command-line flags. Validated.
    pub fn resolve(&self) -> Result<RunConfig, RandqaError> {
        let mut cfg = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(v) = self.block_size {
            cfg.block_size = v;
        }
        if let Some(v) = self.ml_k {
            cfg.ml_k = v;
        }
        if let Some(v) = self.alpha {
            cfg.alpha = v;
        }
        if let Some(v) = self.rct_cutoff {
            cfg.rct_cutoff = v;
        }
        if let Some(v) = self.apt_window {
            cfg.apt_window = v;
        }
        if let Some(v) = self.train_fraction {
            cfg.train_fraction = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Print an error and exit with status 1.
pub fn exit_with(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {err}");
    std::process::exit(1);
}
