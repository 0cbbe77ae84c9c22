//! End-to-end runs of the full battery.

use proptest::prelude::*;
use randqa_core::{BitSequence, RunConfig, SourceKind, bits_from_source};
use randqa_tests::{
    HealthOutcome, PValues, Verdict, adaptive_proportion_test, approximate_entropy_pvalue,
    block_frequency_pvalue, mono_bit_pvalue, run_tests, runs_pvalue,
};

fn lcg_bits(n: usize) -> BitSequence {
    let mut src = SourceKind::Lcg.build(12345);
    bits_from_source(src.as_mut(), n).bits
}

#[test]
fn fixed_seed_lcg_is_reproducible() {
    let cfg = RunConfig::default();
    let first = run_tests(&lcg_bits(100_000), &cfg).unwrap();
    let second = run_tests(&lcg_bits(100_000), &cfg).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn lcg_lsb_alternation_is_caught() {
    let r = run_tests(&lcg_bits(100_000), &RunConfig::default()).unwrap();
    assert_eq!(r.p_values.runs, 0.0);
    assert!(r.fdr.any_rejected());
    assert_eq!(r.decisions.runs, Verdict::Fail);
    assert_eq!(r.decisions.compression, Verdict::Fail);
    assert!(!r.overall());
}

#[test]
fn os_random_is_clean() {
    let mut src = SourceKind::OsRandom.build(0);
    let bits = bits_from_source(src.as_mut(), 100_000).bits;
    let r = run_tests(&bits, &RunConfig::default()).unwrap();
    assert!(r.errors.is_empty());
    assert_eq!(r.decisions.entropy, Verdict::Pass);
    assert_eq!(r.decisions.compression, Verdict::Pass);
    assert_eq!(r.decisions.ml, Verdict::Pass);
    assert!(!matches!(
        r.rct.as_ref().unwrap().outcome,
        HealthOutcome::NotRun { .. }
    ));
}

#[test]
fn alternating_sequence_properties() {
    let bits = BitSequence::alternating(10_000);
    assert!((mono_bit_pvalue(&bits) - 1.0).abs() < 1e-12);
    assert_eq!(runs_pvalue(&bits), 0.0);
    let r = run_tests(&bits, &RunConfig::default()).unwrap();
    assert!((r.entropy - 1.0).abs() < 1e-12);
}

#[test]
fn apt_on_short_input_never_fails() {
    let r = adaptive_proportion_test(&BitSequence::ones(100), 512, 0.01).unwrap();
    assert!(r.outcome.is_not_run());
    assert_eq!(r.n_windows, 0);
}

fn arb_bits() -> impl Strategy<Value = BitSequence> {
    prop::collection::vec(any::<bool>(), 0..600).prop_map(BitSequence::from_bools)
}

proptest! {
    #[test]
    fn p_values_stay_in_unit_interval(bits in arb_bits(), m in 1usize..40) {
        for p in [
            mono_bit_pvalue(&bits),
            runs_pvalue(&bits),
            block_frequency_pvalue(&bits, m),
            approximate_entropy_pvalue(&bits, 2),
        ] {
            prop_assert!((0.0..=1.0).contains(&p), "p = {p}");
        }
    }

    #[test]
    fn suite_never_errors_on_valid_config(bits in arb_bits()) {
        let cfg = RunConfig { apt_window: 64, ml_k: 4, ..RunConfig::default() };
        let r = run_tests(&bits, &cfg).unwrap();
        prop_assert!(r.errors.is_empty());
        prop_assert_eq!(r.n_bits, bits.len());
        let all: Vec<f64> = r.p_values.iter().map(|(_, p)| p).collect();
        prop_assert_eq!(all.len(), 4);
        prop_assert_eq!(r.p_values, PValues::compute(&bits, cfg.block_size));
    }
}
