//! Per-test verdicts and the overall decision.

use serde::Serialize;

use crate::fdr::FdrTable;
use crate::health::HealthOutcome;
use crate::metrics::{COMPRESSION_PASS_THRESHOLD, ENTROPY_PASS_THRESHOLD};
use crate::predictor::{ML_PASS_THRESHOLD, Predictability};
use crate::pvalue::PValues;

/// Tri-state verdict for one test or metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    NotApplicable,
}

impl Verdict {
    pub fn from_pass(pass: bool) -> Self {
        if pass { Self::Pass } else { Self::Fail }
    }

    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }

    pub fn is_fail(self) -> bool {
        self == Self::Fail
    }

    /// `PASS`, `FAIL` or `N/A`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::NotApplicable => "N/A",
        }
    }
}

impl From<&HealthOutcome> for Verdict {
    fn from(outcome: &HealthOutcome) -> Self {
        match outcome {
            HealthOutcome::Pass => Self::Pass,
            HealthOutcome::Fail => Self::Fail,
            HealthOutcome::NotRun { .. } => Self::NotApplicable,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict per test and metric, plus the overall decision.
///
/// p-value tests pass on raw `p > alpha`; the overall decision uses the FDR
/// table instead. Entropy, compression and ML verdicts are advisory and do
/// not enter `overall`.
///
/// An ML verdict of `NotApplicable` (too little data to fit the predictor)
/// counts as passing; see [`Decisions::ml_passes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decisions {
    pub mono_bit: Verdict,
    pub runs: Verdict,
    pub block_frequency: Verdict,
    pub approx_entropy: Verdict,
    pub rct: Verdict,
    pub apt: Verdict,
    pub entropy: Verdict,
    pub compression: Verdict,
    pub ml: Verdict,
    pub overall: bool,
}

/// Inputs for [`decide`]. A health outcome of `None` means the test was
/// rejected for its parameters and never ran.
pub struct DecisionInputs<'a> {
    pub p_values: &'a PValues,
    pub fdr: &'a FdrTable,
    pub rct: Option<&'a HealthOutcome>,
    pub apt: Option<&'a HealthOutcome>,
    pub entropy: f64,
    pub compression_ratio: f64,
    pub ml: Option<&'a Predictability>,
    pub alpha: f64,
}

/// True iff nothing is rejected under FDR and neither health test failed.
///
/// `NotRun` does not block a pass; a health test that was never configured
/// (`None`) does.
pub fn overall_pass(
    fdr: &FdrTable,
    rct: Option<&HealthOutcome>,
    apt: Option<&HealthOutcome>,
) -> bool {
    let health_ok = |h: Option<&HealthOutcome>| h.is_some_and(|h| !h.is_fail());
    !fdr.any_rejected() && health_ok(rct) && health_ok(apt)
}

impl Decisions {
    /// ML advisory check: only a measured accuracy above the threshold fails.
    pub fn ml_passes(&self) -> bool {
        !self.ml.is_fail()
    }
}

pub fn decide(inputs: &DecisionInputs<'_>) -> Decisions {
    let p = inputs.p_values;
    let raw = |v: f64| Verdict::from_pass(v > inputs.alpha);
    let health = |h: Option<&HealthOutcome>| h.map_or(Verdict::NotApplicable, Verdict::from);
    let ml = match inputs.ml.and_then(Predictability::accuracy) {
        Some(acc) => Verdict::from_pass(acc <= ML_PASS_THRESHOLD),
        None => Verdict::NotApplicable,
    };

    Decisions {
        mono_bit: raw(p.mono_bit),
        runs: raw(p.runs),
        block_frequency: raw(p.block_frequency),
        approx_entropy: raw(p.approx_entropy),
        rct: health(inputs.rct),
        apt: health(inputs.apt),
        entropy: Verdict::from_pass(inputs.entropy >= ENTROPY_PASS_THRESHOLD),
        compression: Verdict::from_pass(inputs.compression_ratio >= COMPRESSION_PASS_THRESHOLD),
        ml,
        overall: overall_pass(inputs.fdr, inputs.rct, inputs.apt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_p() -> PValues {
        PValues {
            mono_bit: 0.5,
            runs: 0.4,
            block_frequency: 0.3,
            approx_entropy: 0.2,
        }
    }

    #[test]
    fn not_run_does_not_block_overall() {
        let p = passing_p();
        let fdr = FdrTable::new(&p, 0.01);
        let not_run = HealthOutcome::NotRun {
            reason: "insufficient bits: n=100 < window=512".into(),
        };
        assert!(overall_pass(&fdr, Some(&HealthOutcome::Pass), Some(&not_run)));
        assert!(!overall_pass(&fdr, Some(&HealthOutcome::Fail), Some(&not_run)));
        assert!(!overall_pass(&fdr, None, Some(&HealthOutcome::Pass)));
    }

    #[test]
    fn fdr_rejection_blocks_overall() {
        let p = PValues {
            runs: 0.0,
            ..passing_p()
        };
        let fdr = FdrTable::new(&p, 0.01);
        assert!(!overall_pass(&fdr, Some(&HealthOutcome::Pass), Some(&HealthOutcome::Pass)));
    }

    #[test]
    fn verdicts_follow_thresholds() {
        let p = PValues {
            mono_bit: 0.01,
            ..passing_p()
        };
        let fdr = FdrTable::new(&p, 0.01);
        let ml = Predictability::Accuracy(0.56);
        let d = decide(&DecisionInputs {
            p_values: &p,
            fdr: &fdr,
            rct: Some(&HealthOutcome::Pass),
            apt: Some(&HealthOutcome::NotRun { reason: "short".into() }),
            entropy: 0.98,
            compression_ratio: 0.949,
            ml: Some(&ml),
            alpha: 0.01,
        });
        // p == alpha is not a pass.
        assert_eq!(d.mono_bit, Verdict::Fail);
        assert_eq!(d.runs, Verdict::Pass);
        assert_eq!(d.apt, Verdict::NotApplicable);
        assert_eq!(d.entropy, Verdict::Pass);
        assert_eq!(d.compression, Verdict::Fail);
        assert_eq!(d.ml, Verdict::Fail);
        // 0.01 * 4 / 1 = 0.04 > alpha, so FDR keeps the suite passing.
        assert!(d.overall);
    }

    #[test]
    fn ml_not_applicable_is_not_a_failure() {
        let p = passing_p();
        let fdr = FdrTable::new(&p, 0.01);
        let ml = Predictability::NotApplicable {
            reason: "training labels contain a single class".into(),
            samples: 10,
        };
        let d = decide(&DecisionInputs {
            p_values: &p,
            fdr: &fdr,
            rct: Some(&HealthOutcome::Pass),
            apt: Some(&HealthOutcome::Pass),
            entropy: 1.0,
            compression_ratio: 1.0,
            ml: Some(&ml),
            alpha: 0.01,
        });
        assert_eq!(d.ml, Verdict::NotApplicable);
        assert!(d.ml_passes());
        assert!(d.overall);

        let failing = Decisions {
            ml: Verdict::Fail,
            ..d
        };
        assert!(!failing.ml_passes());
    }
}
