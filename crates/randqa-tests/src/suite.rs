//! Full analysis of one bit sequence.

use randqa_core::{BitSequence, ParamError, RunConfig};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::decision::{DecisionInputs, Decisions, decide};
use crate::fdr::FdrTable;
use crate::health::{AptResult, RctResult, adaptive_proportion_test, repetition_count_test};
use crate::metrics::{compression_ratio, shannon_entropy_bits_per_bit};
use crate::predictor::{Predictability, predictability_score};
use crate::pvalue::PValues;

/// Everything computed for one sequence. Read-only once returned.
///
/// A branch rejected for its parameters keeps its [`ParamError`] in place of
/// a result and serialises as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSuiteResult {
    pub n_bits: usize,
    pub config: RunConfig,
    pub p_values: PValues,
    pub fdr: FdrTable,
    #[serde(serialize_with = "serialize_branch")]
    pub rct: Result<RctResult, ParamError>,
    #[serde(serialize_with = "serialize_branch")]
    pub apt: Result<AptResult, ParamError>,
    pub entropy: f64,
    pub compression_ratio: f64,
    #[serde(serialize_with = "serialize_branch")]
    pub ml: Result<Predictability, ParamError>,
    pub decisions: Decisions,
    /// Parameter errors of rejected branches, in branch order.
    pub errors: Vec<String>,
}

impl TestSuiteResult {
    pub fn overall(&self) -> bool {
        self.decisions.overall
    }

    pub fn ml_accuracy(&self) -> Option<f64> {
        self.ml.as_ref().ok().and_then(Predictability::accuracy)
    }
}

fn serialize_branch<T, S>(branch: &Result<T, ParamError>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match branch {
        Ok(value) => value.serialize(serializer),
        Err(e) => {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry("error", &e.to_string())?;
            map.end()
        }
    }
}

fn join<T>(handle: std::thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

/// Run the whole battery on `bits`.
///
/// The p-value tests, the two health tests, the ML predictor and the
/// entropy/compression metrics run concurrently. Only an invalid `alpha`
/// fails the call; other parameter errors disable their own branch and force
/// `overall = false`.
pub fn run_tests(bits: &BitSequence, config: &RunConfig) -> Result<TestSuiteResult, ParamError> {
    let alpha = config.alpha;
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ParamError::InvalidAlpha(alpha));
    }

    let (p_values, rct, apt, ml, (entropy, compression)) = std::thread::scope(|s| {
        let p = s.spawn(|| PValues::compute(bits, config.block_size));
        let rct = s.spawn(|| repetition_count_test(bits, config.rct_cutoff));
        let apt = s.spawn(|| adaptive_proportion_test(bits, config.apt_window, alpha));
        let ml = s.spawn(|| predictability_score(bits, config.ml_k, config.train_fraction));
        let supporting = (shannon_entropy_bits_per_bit(bits), compression_ratio(bits));
        (join(p), join(rct), join(apt), join(ml), supporting)
    });

    let errors: Vec<String> = [
        rct.as_ref().err(),
        apt.as_ref().err(),
        ml.as_ref().err(),
    ]
    .into_iter()
    .flatten()
    .map(|e| e.to_string())
    .collect();
    for e in &errors {
        log::warn!("branch skipped: {e}");
    }

    let fdr = FdrTable::new(&p_values, alpha);
    let decisions = decide(&DecisionInputs {
        p_values: &p_values,
        fdr: &fdr,
        rct: rct.as_ref().ok().map(|r| &r.outcome),
        apt: apt.as_ref().ok().map(|r| &r.outcome),
        entropy,
        compression_ratio: compression,
        ml: ml.as_ref().ok(),
        alpha,
    });
    log::info!(
        "analysed {} bits: overall {}",
        bits.len(),
        if decisions.overall { "PASS" } else { "FAIL" }
    );

    Ok(TestSuiteResult {
        n_bits: bits.len(),
        config: config.clone(),
        p_values,
        fdr,
        rct,
        apt,
        entropy,
        compression_ratio: compression,
        ml,
        decisions,
        errors,
    })
}
