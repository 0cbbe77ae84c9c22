//! Statistical engine for randqa.
//!
//! Four SP 800-22 style hypothesis tests (balance, runs, block frequency,
//! approximate entropy), two SP 800-90B style health tests (repetition count,
//! adaptive proportion), supporting metrics (empirical entropy, compression
//! ratio, next-bit predictability) and a Benjamini–Hochberg correction that
//! folds everything into one verdict.
//!
//! ```
//! use randqa_core::{BitSequence, RunConfig};
//! use randqa_tests::run_tests;
//!
//! let result = run_tests(&BitSequence::alternating(20_000), &RunConfig::default()).unwrap();
//! assert_eq!(result.p_values.runs, 0.0);
//! assert!(!result.overall());
//! ```

pub mod decision;
pub mod fdr;
pub mod health;
pub mod metrics;
pub mod predictor;
pub mod pvalue;
pub mod suite;

pub use decision::{DecisionInputs, Decisions, Verdict, decide, overall_pass};
pub use fdr::{FdrEntry, FdrTable, benjamini_hochberg};
pub use health::{
    AptResult, AptViolation, HealthOutcome, RctResult, adaptive_proportion_test, apt_bounds,
    repetition_count_test,
};
pub use metrics::{
    COMPRESSION_PASS_THRESHOLD, ENTROPY_PASS_THRESHOLD, compression_ratio,
    compression_ratio_bytes, shannon_entropy_bits_per_bit,
};
pub use predictor::{LogisticRegression, ML_PASS_THRESHOLD, Predictability, predictability_score};
pub use pvalue::{
    APEN_DEFAULT_M, PValueTest, PValues, approximate_entropy_pvalue, block_frequency_pvalue,
    mono_bit_pvalue, runs_pvalue,
};
pub use suite::{TestSuiteResult, run_tests};
