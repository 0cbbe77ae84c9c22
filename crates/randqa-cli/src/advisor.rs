//! Rule-based remediation advice.

use randqa_tests::{HealthOutcome, TestSuiteResult};

/// One actionable line per failed or not-run check.
///
/// A health test that did not run is reported as such, never as a failure.
/// When nothing triggers, a single positive recommendation is returned.
pub fn rule_based_advice(result: &TestSuiteResult) -> Vec<String> {
    let mut msgs = Vec::new();
    let d = &result.decisions;

    match &result.rct {
        Ok(r) => match &r.outcome {
            HealthOutcome::Fail => msgs.push(format!(
                "Repetition Count Test failed: max run={} ≥ cutoff {}. Consider de-biasing/conditioning \
                 (e.g., Von Neumann extractor) or replacing the source.",
                r.max_run, r.cutoff
            )),
            HealthOutcome::NotRun { reason } => msgs.push(format!(
                "Repetition Count Test not run ({reason}); collected n={}. Provide at least one bit \
                 (n>0) to enable this health test.",
                r.n
            )),
            HealthOutcome::Pass => {}
        },
        Err(e) => msgs.push(format!(
            "Repetition Count Test not configured ({e}); choose a cutoff of at least 2 (34 is typical)."
        )),
    }

    match &result.apt {
        Ok(r) => match &r.outcome {
            HealthOutcome::Fail => {
                let idxs: Vec<String> = r
                    .violations
                    .iter()
                    .take(3)
                    .map(|v| v.window_index.to_string())
                    .collect();
                let example = match idxs.len() {
                    0 => String::new(),
                    1 => format!(" (e.g., window index: {})", idxs[0]),
                    _ => format!(" (e.g., window indexes: {})", idxs.join(", ")),
                };
                msgs.push(format!(
                    "Adaptive Proportion Test failed: {} window(s) of size {} outside [{},{}]{example}. \
                     Review/condition the entropy source or reduce APT window to increase sensitivity \
                     with limited data.",
                    r.violations.len(),
                    r.window,
                    r.lower,
                    r.upper
                ));
            }
            HealthOutcome::NotRun { reason } => msgs.push(format!(
                "Adaptive Proportion Test not run ({reason}); collected n={}, window={}. Provide at \
                 least {} bits (prefer multiples of {}) or reduce the window size.",
                r.n, r.window, r.window, r.window
            )),
            HealthOutcome::Pass => {}
        },
        Err(e) => msgs.push(format!(
            "Adaptive Proportion Test not configured ({e}); choose a positive window (512 is typical)."
        )),
    }

    if d.mono_bit.is_fail() {
        msgs.push(
            "Mono_bit failed: overall 0/1 imbalance; apply rejection sampling or XOR with a balanced source."
                .into(),
        );
    }
    if d.runs.is_fail() {
        msgs.push(
            "Runs failed: oscillation pattern is abnormal; investigate LSB bias or linear structure; \
             consider a cryptographic DRBG."
                .into(),
        );
    }
    if d.block_frequency.is_fail() {
        msgs.push(
            "Block Frequency failed: local bias detected; strengthen entropy pool mixing or hash the \
             pool before output."
                .into(),
        );
    }
    if d.approx_entropy.is_fail() {
        msgs.push(
            "Approximate Entropy failed: repeating patterns present; consider larger state or \
             non-linear mixing."
                .into(),
        );
    }
    if d.compression.is_fail() {
        msgs.push(
            "Stream is compressible (structure present). Avoid using this stream for keys/nonces \
             without conditioning."
                .into(),
        );
    }
    // A predictor that could not be scored is not a warning.
    if !d.ml_passes() {
        msgs.push(
            "ML predictor exceeded 55% accuracy; next bit is predictable from short history. Switch \
             sources or post-process with a secure PRF."
                .into(),
        );
    }
    if let Err(e) = &result.ml {
        msgs.push(format!("ML predictor not configured ({e}); use k >= 1 and a train fraction in (0, 1)."));
    }

    if msgs.is_empty() {
        msgs.push(format!(
            "No red flags at α={}. Proceed, but deploy periodic health testing and telemetry in production.",
            result.config.alpha
        ));
    }
    msgs
}

#[cfg(test)]
mod tests {
    use super::*;
    use randqa_core::{BitSequence, RunConfig, SourceKind, bits_from_source};
    use randqa_tests::run_tests;

    #[test]
    fn clean_source_gets_positive_advice() {
        let mut src = SourceKind::OsRandom.build(0);
        let bits = bits_from_source(src.as_mut(), 100_000).bits;
        let cfg = RunConfig {
            alpha: 0.0001,
            ..RunConfig::default()
        };
        let advice = rule_based_advice(&run_tests(&bits, &cfg).unwrap());
        // OS randomness can still trip a test by chance; the advice must not
        // mention anything that did not fail.
        if advice.len() == 1 {
            assert!(advice[0].starts_with("No red flags at α=0.0001"));
        }
        assert!(!advice.iter().any(|m| m.contains("not run")));
    }

    #[test]
    fn constant_stream_triggers_health_advice() {
        let r = run_tests(&BitSequence::ones(10_000), &RunConfig::default()).unwrap();
        let advice = rule_based_advice(&r);
        assert!(advice[0].starts_with("Repetition Count Test failed: max run=10000"));
        assert!(advice[1].contains("19 window(s) of size 512 outside"));
        assert!(advice[1].contains("window indexes: 0, 1, 2"));
        assert!(advice.iter().any(|m| m.starts_with("Mono_bit failed")));
        // ML is not applicable on a constant stream.
        assert!(!advice.iter().any(|m| m.starts_with("ML predictor")));
    }

    #[test]
    fn not_run_is_not_a_failure() {
        let bits = BitSequence::from_bits(vec![0, 1, 1, 0, 1, 0, 0, 1]).unwrap();
        let advice = rule_based_advice(&run_tests(&bits, &RunConfig::default()).unwrap());
        assert!(advice.iter().any(|m| m.starts_with(
            "Adaptive Proportion Test not run (insufficient bits: n=8 < window=512)"
        )));
        assert!(!advice.iter().any(|m| m.contains("Adaptive Proportion Test failed")));
    }

    #[test]
    fn misconfigured_branch_is_called_out() {
        let cfg = RunConfig {
            rct_cutoff: 1,
            ..RunConfig::default()
        };
        let r = run_tests(&BitSequence::alternating(4_096), &cfg).unwrap();
        let advice = rule_based_advice(&r);
        assert!(advice[0].starts_with("Repetition Count Test not configured"));
    }
}
