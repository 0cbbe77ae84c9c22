//! Markdown and JSON report rendering.

use std::path::{Path, PathBuf};

use randqa_core::RandqaError;
use randqa_tests::{
    COMPRESSION_PASS_THRESHOLD, ENTROPY_PASS_THRESHOLD, HealthOutcome, ML_PASS_THRESHOLD,
    PValueTest, Predictability, TestSuiteResult, Verdict,
};
use serde::Serialize;

/// Violations listed individually before the APT line is summarised.
const MAX_LISTED_VIOLATIONS: usize = 5;

/// What was analysed, as written at the top of every report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportHeader {
    pub source: String,
    /// Bits requested from the source (may exceed what was delivered).
    pub bits: usize,
    pub seed: Option<u32>,
}

/// The `report.json` document.
#[derive(Serialize)]
pub struct ReportPayload<'a> {
    pub source: &'a str,
    pub bits: usize,
    pub bits_acquired: usize,
    pub block_size: usize,
    pub ml_k: usize,
    pub alpha: f64,
    pub seed: Option<u32>,
    pub warnings: &'a [String],
    pub results: &'a TestSuiteResult,
}

fn decision_word(v: Verdict, fail_word: &str) -> String {
    match v {
        Verdict::Pass => "PASS".to_string(),
        Verdict::Fail => fail_word.to_string(),
        Verdict::NotApplicable => "N/A".to_string(),
    }
}

fn test_verdict(result: &TestSuiteResult, test: PValueTest) -> Verdict {
    let d = &result.decisions;
    match test {
        PValueTest::MonoBit => d.mono_bit,
        PValueTest::Runs => d.runs,
        PValueTest::BlockFrequency => d.block_frequency,
        PValueTest::ApproxEntropy => d.approx_entropy,
    }
}

fn rct_line(result: &TestSuiteResult) -> String {
    match &result.rct {
        Err(e) => format!("- Repetition Count (RCT): **N/A** (not configured: {e})"),
        Ok(r) => match &r.outcome {
            HealthOutcome::NotRun { reason } => {
                format!("- Repetition Count (RCT): **NOT RUN** ({reason})")
            }
            outcome => {
                let bound = r
                    .approx_false_alarm
                    .map(|p| format!("{p:.3e}"))
                    .unwrap_or_else(|| "n/a".to_string());
                format!(
                    "- Repetition Count (RCT): **{}** (max run {}, cutoff {}, false-alarm bound {bound})",
                    outcome.label(),
                    r.max_run,
                    r.cutoff,
                )
            }
        },
    }
}

fn apt_line(result: &TestSuiteResult) -> String {
    let r = match &result.apt {
        Err(e) => return format!("- Adaptive Proportion (APT): **N/A** (not configured: {e})"),
        Ok(r) => r,
    };
    if let HealthOutcome::NotRun { reason } = &r.outcome {
        return format!("- Adaptive Proportion (APT): **NOT RUN** ({reason})");
    }
    let mut line = format!(
        "- Adaptive Proportion (APT): **{}** (window {}, bounds [{}, {}], {} windows, {} violations)",
        r.outcome.label(),
        r.window,
        r.lower,
        r.upper,
        r.n_windows,
        r.violations.len()
    );
    for v in r.violations.iter().take(MAX_LISTED_VIOLATIONS) {
        line.push_str(&format!(
            "\n  - window {}: {} ones",
            v.window_index, v.ones
        ));
    }
    if r.violations.len() > MAX_LISTED_VIOLATIONS {
        line.push_str(&format!(
            "\n  - ... and {} more",
            r.violations.len() - MAX_LISTED_VIOLATIONS
        ));
    }
    line
}

/// Test glossary section.
pub fn glossary_md(alpha: f64) -> String {
    format!(
        "### Test glossary (α={alpha})
- **Mono_bit (Frequency):** Checks overall balance of 0/1 across the whole stream.
- **Runs:** Checks the count of runs (contiguous 0s/1s). Too many or too few implies non-random oscillation.
- **Block Frequency:** Splits data into fixed-size blocks and looks for local bias per block.
- **Approximate Entropy (m=2):** Detects repeating/local regularity using overlapping patterns; lower ApEn means more structure.
- **Shannon entropy (bits/bit):** 1.0 is ideal for Bernoulli(0.5); lower means bias or structure.
- **Compression ratio (zlib):** Random data should not compress (ratio ≈ 1.0).
- **ML next-bit accuracy:** Logistic regression predicts the next bit from the last *k* bits; accuracy > {ML_PASS_THRESHOLD} suggests short-range predictability.

**SP 800-90B health tests**
- **Repetition Count (RCT):** Fails if any run of identical bits reaches the cutoff (e.g., 34). Large runs indicate a stuck/biased source.
- **Adaptive Proportion (APT):** Non-overlapping windows of size *W*; fails if any window's ones count falls outside [L, U] from Binomial(*W*, 0.5) at α/2.

**Multiple-testing (BH-FDR)**
- q-values control the false discovery rate across the p-value tests.
  **Overall** passes only if no test is rejected at level α *and* neither health test fails.
"
    )
}

/// Bullet-point reading of the result.
pub fn interpret(result: &TestSuiteResult) -> Vec<String> {
    let mut msgs = Vec::new();
    let d = &result.decisions;
    let p = &result.p_values;

    if d.mono_bit.is_fail() {
        msgs.push(format!(
            "Mono_bit p={:.4} ≤ α: global 0/1 imbalance detected.",
            p.mono_bit
        ));
    }
    if d.runs.is_fail() {
        msgs.push(format!("Runs p={:.4} ≤ α: abnormal alternation pattern.", p.runs));
    }
    if d.block_frequency.is_fail() {
        msgs.push(format!(
            "Block Frequency p={:.4} ≤ α: local bias within blocks.",
            p.block_frequency
        ));
    }
    if d.approx_entropy.is_fail() {
        msgs.push(format!(
            "Approximate Entropy p={:.4} ≤ α: repeating short patterns.",
            p.approx_entropy
        ));
    }
    if d.rct.is_fail() {
        msgs.push("Repetition Count failed: a run of identical bits reached the cutoff.".into());
    }
    if d.apt.is_fail() {
        msgs.push("Adaptive Proportion failed: some windows are too biased.".into());
    }
    if d.entropy.is_fail() {
        msgs.push(format!(
            "Entropy {:.3} < {ENTROPY_PASS_THRESHOLD}: per-bit unpredictability is low.",
            result.entropy
        ));
    }
    if d.compression.is_fail() {
        msgs.push(format!(
            "Compression ratio {:.3} < {COMPRESSION_PASS_THRESHOLD}: stream is compressible (structure present).",
            result.compression_ratio
        ));
    }
    if let (Some(acc), true) = (result.ml_accuracy(), d.ml.is_fail()) {
        msgs.push(format!(
            "ML accuracy {acc:.3} > {ML_PASS_THRESHOLD}: next bit is predictable from short history."
        ));
    }
    if msgs.is_empty() {
        msgs.push("All checks are consistent with randomness at the chosen α.".into());
    }
    msgs
}

/// Full Markdown report.
pub fn render_markdown(header: &ReportHeader, result: &TestSuiteResult, warnings: &[String]) -> String {
    let cfg = &result.config;
    let alpha = cfg.alpha;
    let d = &result.decisions;
    let mut report = String::new();

    report.push_str("# randqa Report\n\n");
    report.push_str(&format!("- **Source:** {}\n", header.source));
    if result.n_bits < header.bits {
        report.push_str(&format!(
            "- **Sample size:** {} bits (requested {}; the source ran short)\n",
            result.n_bits, header.bits
        ));
    } else {
        report.push_str(&format!("- **Sample size:** {} bits\n", result.n_bits));
    }
    if let Some(seed) = header.seed {
        report.push_str(&format!("- **Seed:** {seed}\n"));
    }
    report.push_str(&format!("- **Block size (Block Frequency):** {}\n", cfg.block_size));
    report.push_str(&format!("- **ML window k:** {}\n", cfg.ml_k));
    report.push_str(&format!("- **Alpha:** {alpha}\n"));
    report.push_str(&format!(
        "- **Overall:** **{}**\n\n",
        if d.overall { "PASS" } else { "FAIL" }
    ));

    report.push_str("## Statistical Tests (p-values)\n\n");
    report.push_str("| Test | p-value | Decision |\n");
    report.push_str("|------|---------|----------|\n");
    for (test, p) in result.p_values.iter() {
        report.push_str(&format!(
            "| {} | `{p:.6}` | **{}** |\n",
            test.label(),
            test_verdict(result, test)
        ));
    }

    report.push_str("\n## Multiple Testing (BH-FDR)\n\n");
    report.push_str("| Test | p | q | Rejected at α |\n");
    report.push_str("|------|---|---|---------------|\n");
    for e in &result.fdr.entries {
        report.push_str(&format!(
            "| {} | `{:.6}` | `{:.6}` | {} |\n",
            e.test.label(),
            e.p_value,
            e.q_value,
            if e.rejected { "yes" } else { "no" }
        ));
    }

    report.push_str("\n## Health Tests (SP 800-90B)\n\n");
    report.push_str(&rct_line(result));
    report.push('\n');
    report.push_str(&apt_line(result));
    report.push_str("\n\n");

    report.push_str("## Supporting Metrics\n\n");
    report.push_str(&format!(
        "- Shannon entropy: `{:.5}` bits/bit: **{}**\n",
        result.entropy,
        decision_word(d.entropy, "WARN")
    ));
    report.push_str(&format!(
        "- Compression ratio (zlib): `{:.5}`: **{}**\n\n",
        result.compression_ratio,
        decision_word(d.compression, "WARN")
    ));

    report.push_str("## ML Predictability\n\n");
    match &result.ml {
        Ok(Predictability::Accuracy(acc)) => report.push_str(&format!(
            "- ML next-bit accuracy (k={}): `{acc:.5}`: **{}**\n\n",
            cfg.ml_k, d.ml
        )),
        Ok(Predictability::NotApplicable { reason, samples }) => report.push_str(&format!(
            "- ML next-bit accuracy: `N/A` ({reason}; {samples} samples)\n\n"
        )),
        Err(e) => report.push_str(&format!("- ML next-bit accuracy: `N/A` (not configured: {e})\n\n")),
    }

    if !result.errors.is_empty() {
        report.push_str("## Skipped Checks\n\n");
        for e in &result.errors {
            report.push_str(&format!("- {e}\n"));
        }
        report.push('\n');
    }

    report.push_str("## Interpretation\n\n");
    for msg in interpret(result) {
        report.push_str(&format!("- {msg}\n"));
    }

    if !warnings.is_empty() {
        report.push_str("\n## Sampling Notes\n\n");
        for w in warnings {
            report.push_str(&format!("- {w}\n"));
        }
    }

    report.push('\n');
    report.push_str(&glossary_md(alpha));
    report
}

fn write_file(path: PathBuf, contents: &str) -> Result<PathBuf, RandqaError> {
    std::fs::write(&path, contents).map_err(|source| RandqaError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Write `report.json` and `report.md` into `out_dir`, creating it if needed.
pub fn write_reports(
    out_dir: &Path,
    payload: &ReportPayload<'_>,
    markdown: &str,
) -> Result<(PathBuf, PathBuf), RandqaError> {
    std::fs::create_dir_all(out_dir).map_err(|source| RandqaError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let json = serde_json::to_string_pretty(payload).map_err(|e| RandqaError::Io {
        path: out_dir.join("report.json"),
        source: e.into(),
    })?;
    let json_path = write_file(out_dir.join("report.json"), &json)?;
    let md_path = write_file(out_dir.join("report.md"), markdown)?;
    Ok((json_path, md_path))
}
