use std::path::Path;

use randqa_core::{RandqaError, RunConfig, SourceKind, bits_from_source};
use randqa_tests::{TestSuiteResult, Verdict, run_tests};
use serde::Serialize;

use super::TuningArgs;

pub struct CompareCommandConfig<'a> {
    pub sources: &'a [SourceKind],
    pub bits: usize,
    pub seed: u32,
    pub tuning: &'a TuningArgs,
    pub output_path: Option<&'a Path>,
}

#[derive(Serialize)]
struct CompareEntry {
    source: &'static str,
    seed: Option<u32>,
    bits_acquired: usize,
    results: TestSuiteResult,
}

#[derive(Serialize)]
struct CompareReport<'a> {
    bits: usize,
    config: &'a RunConfig,
    sources: &'a [CompareEntry],
}

pub fn run(cfg: CompareCommandConfig<'_>) {
    if let Err(e) = execute(&cfg) {
        super::exit_with(e);
    }
}

fn analyze_all(
    cfg: &CompareCommandConfig<'_>,
    run_config: &RunConfig,
) -> Result<Vec<CompareEntry>, RandqaError> {
    let mut entries = Vec::with_capacity(cfg.sources.len());
    for &kind in cfg.sources {
        let mut src = kind.build(cfg.seed);
        let acquired = bits_from_source(src.as_mut(), cfg.bits);
        log::info!("compare: {} delivered {} bits", kind, acquired.bits.len());
        let results = run_tests(&acquired.bits, run_config)?;
        entries.push(CompareEntry {
            source: kind.name(),
            seed: kind.is_seeded().then_some(cfg.seed),
            bits_acquired: acquired.bits.len(),
            results,
        });
    }
    Ok(entries)
}

fn mark(v: Verdict) -> &'static str {
    match v {
        Verdict::Pass => "✓",
        Verdict::Fail => "✗",
        Verdict::NotApplicable => "—",
    }
}

fn print_table(entries: &[CompareEntry]) {
    println!("{}", "=".repeat(104));
    println!(
        "{:<10} {:>9} {:>9} {:>9} {:>9} {:>8} {:>8} {:>8} {:>4} {:>4} {:>8}",
        "Source", "MonoBit", "Runs", "BlockFreq", "ApEn", "Entropy", "Compr", "ML acc", "RCT", "APT",
        "Overall"
    );
    println!("{}", "-".repeat(104));
    for e in entries {
        let r = &e.results;
        let p = &r.p_values;
        let d = &r.decisions;
        let ml = r
            .ml_accuracy()
            .map(|a| format!("{a:.4}"))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:<10} {:>8.4}{} {:>8.4}{} {:>8.4}{} {:>8.4}{} {:>8.5} {:>8.5} {:>8} {:>4} {:>4} {:>8}",
            e.source,
            p.mono_bit,
            mark(d.mono_bit),
            p.runs,
            mark(d.runs),
            p.block_frequency,
            mark(d.block_frequency),
            p.approx_entropy,
            mark(d.approx_entropy),
            r.entropy,
            r.compression_ratio,
            ml,
            mark(d.rct),
            mark(d.apt),
            if d.overall { "PASS" } else { "FAIL" }
        );
    }
    println!("{}", "=".repeat(104));
}

fn execute(cfg: &CompareCommandConfig<'_>) -> Result<(), RandqaError> {
    let run_config = cfg.tuning.resolve()?;
    println!(
        "Comparing {} source(s), {} bits each (α={})...\n",
        cfg.sources.len(),
        cfg.bits,
        run_config.alpha
    );

    let entries = analyze_all(cfg, &run_config)?;
    print_table(&entries);

    if let Some(path) = cfg.output_path {
        let report = CompareReport {
            bits: cfg.bits,
            config: &run_config,
            sources: &entries,
        };
        let json = serde_json::to_string_pretty(&report).map_err(|e| RandqaError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        std::fs::write(path, json).map_err(|source| RandqaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        println!("\n📄 Comparison saved to: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_source_is_analysed_with_shared_parameters() {
        let tuning = TuningArgs::default();
        let sources = SourceKind::ALL;
        let cfg = CompareCommandConfig {
            sources: &sources,
            bits: 20_000,
            seed: 42,
            tuning: &tuning,
            output_path: None,
        };
        let entries = analyze_all(&cfg, &RunConfig::default()).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].source, "lcg");
        assert!(!entries[0].results.overall());
        assert_eq!(entries[2].seed, None);
        assert!(entries.iter().all(|e| e.bits_acquired == 20_000));
    }

    #[test]
    fn comparison_json_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compare.json");
        let tuning = TuningArgs::default();
        let sources = [SourceKind::Lcg, SourceKind::Xorshift];
        execute(&CompareCommandConfig {
            sources: &sources,
            bits: 5_000,
            seed: 1,
            tuning: &tuning,
            output_path: Some(&path),
        })
        .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["sources"][1]["source"], "xorshift");
        assert_eq!(json["config"]["block_size"], 128);
    }
}
