use std::path::Path;

use randqa_core::{
    Acquisition, RandqaError, SourceKind, bits_from_bytes, bits_from_source, parse_hex,
};
use randqa_tests::run_tests;

use super::{DEFAULT_BITS, TuningArgs};
use crate::advisor::rule_based_advice;
use crate::report::{ReportHeader, ReportPayload, render_markdown, write_reports};

pub struct AnalyzeCommandConfig<'a> {
    pub source: SourceKind,
    pub bits: Option<usize>,
    pub seed: u32,
    pub file: Option<&'a Path>,
    pub hex: Option<&'a str>,
    pub tuning: &'a TuningArgs,
    pub out_dir: &'a Path,
}

/// Where the analysed bits came from.
struct Input {
    label: String,
    seed: Option<u32>,
    acquired: Acquisition,
}

fn acquire(cfg: &AnalyzeCommandConfig<'_>) -> Result<Input, RandqaError> {
    if let Some(path) = cfg.file {
        let bytes = std::fs::read(path).map_err(|source| RandqaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(Input {
            label: format!("file:{}", path.display()),
            seed: None,
            acquired: bits_from_bytes(&bytes, cfg.bits),
        });
    }
    if let Some(text) = cfg.hex {
        let bytes = parse_hex(text)?;
        return Ok(Input {
            label: "hex".to_string(),
            seed: None,
            acquired: bits_from_bytes(&bytes, cfg.bits),
        });
    }
    let mut src = cfg.source.build(cfg.seed);
    Ok(Input {
        label: cfg.source.name().to_string(),
        seed: cfg.source.is_seeded().then_some(cfg.seed),
        acquired: bits_from_source(src.as_mut(), cfg.bits.unwrap_or(DEFAULT_BITS)),
    })
}

pub fn run(cfg: AnalyzeCommandConfig<'_>) {
    if let Err(e) = execute(&cfg) {
        super::exit_with(e);
    }
}

fn execute(cfg: &AnalyzeCommandConfig<'_>) -> Result<(), RandqaError> {
    let run_config = cfg.tuning.resolve()?;
    let input = acquire(cfg)?;
    let bits = &input.acquired.bits;

    if input.acquired.is_short() {
        eprintln!(
            "Warning: {} delivered {} of {} requested bits ({} short).",
            input.label,
            bits.len(),
            input.acquired.requested,
            input.acquired.shortfall()
        );
    }

    log::info!("analysing {} bits from {}", bits.len(), input.label);
    let warnings = run_config.warnings(bits.len());
    let result = run_tests(bits, &run_config)?;

    let header = ReportHeader {
        source: input.label.clone(),
        bits: input.acquired.requested,
        seed: input.seed,
    };
    let markdown = render_markdown(&header, &result, &warnings);
    let payload = ReportPayload {
        source: &input.label,
        bits: input.acquired.requested,
        bits_acquired: bits.len(),
        block_size: run_config.block_size,
        ml_k: run_config.ml_k,
        alpha: run_config.alpha,
        seed: input.seed,
        warnings: &warnings,
        results: &result,
    };
    let (json_path, md_path) = write_reports(cfg.out_dir, &payload, &markdown)?;

    println!("{markdown}");
    println!("## Advice\n");
    for line in rule_based_advice(&result) {
        println!("- {line}");
    }
    println!();
    println!("📄 Reports saved to: {} and {}", json_path.display(), md_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config<'a>(tuning: &'a TuningArgs, out: &'a Path) -> AnalyzeCommandConfig<'a> {
        AnalyzeCommandConfig {
            source: SourceKind::Xorshift,
            bits: Some(4_096),
            seed: 9,
            file: None,
            hex: None,
            tuning,
            out_dir: out,
        }
    }

    #[test]
    fn generator_input_keeps_seed() {
        let tuning = TuningArgs::default();
        let dir = tempfile::tempdir().unwrap();
        let input = acquire(&config(&tuning, dir.path())).unwrap();
        assert_eq!(input.label, "xorshift");
        assert_eq!(input.seed, Some(9));
        assert_eq!(input.acquired.bits.len(), 4_096);
    }

    #[test]
    fn hex_input_takes_every_bit_by_default() {
        let tuning = TuningArgs::default();
        let dir = tempfile::tempdir().unwrap();
        let cfg = AnalyzeCommandConfig {
            bits: None,
            hex: Some("0xff00"),
            ..config(&tuning, dir.path())
        };
        let input = acquire(&cfg).unwrap();
        assert_eq!(input.label, "hex");
        assert_eq!(input.seed, None);
        assert_eq!(input.acquired.bits.len(), 16);
        assert_eq!(input.acquired.bits.count_ones(), 8);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let tuning = TuningArgs::default();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.bin");
        let cfg = AnalyzeCommandConfig {
            file: Some(&missing),
            ..config(&tuning, dir.path())
        };
        assert!(matches!(acquire(&cfg), Err(RandqaError::Io { .. })));
    }

    #[test]
    fn execute_writes_both_reports() {
        let tuning = TuningArgs::default();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        execute(&config(&tuning, &out)).unwrap();
        assert!(out.join("report.json").is_file());
        assert!(out.join("report.md").is_file());
    }
}
