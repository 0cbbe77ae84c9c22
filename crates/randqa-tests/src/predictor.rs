//! Short-history next-bit predictor.
//!
//! Every overlapping `(k+1)`-bit window becomes one sample: the first `k` bits
//! are the features and the last bit is the label. The first part of the
//! samples trains an L2-regularised logistic regression, the rest measures
//! hold-out accuracy. Accuracy clearly above 0.5 means the next bit is
//! predictable from its recent history.

use std::collections::HashMap;

use randqa_core::{BitSequence, MAX_ML_K, ParamError};
use serde::Serialize;

/// Advisory pass threshold: accuracy at or below this is unremarkable.
pub const ML_PASS_THRESHOLD: f64 = 0.55;
/// Inverse regularisation strength.
pub const DEFAULT_C: f64 = 1.0;
/// Newton iteration cap.
pub const MAX_ITER: usize = 500;

const TOLERANCE: f64 = 1e-8;

/// Hold-out accuracy of the predictor, or the reason it could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predictability {
    Accuracy(f64),
    NotApplicable { reason: String, samples: usize },
}

impl Predictability {
    pub fn accuracy(&self) -> Option<f64> {
        match self {
            Self::Accuracy(a) => Some(*a),
            Self::NotApplicable { .. } => None,
        }
    }

    fn not_applicable(reason: impl Into<String>, samples: usize) -> Self {
        Self::NotApplicable {
            reason: reason.into(),
            samples,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Logistic regression
// ═══════════════════════════════════════════════════════════════════════════════

/// Binary logistic regression with an L2 penalty on every weight, the bias
/// included.
///
/// Minimises `0.5 * |w|^2 + C * sum(log(1 + exp(-y_i * w . x_i)))` with
/// `y_i in {-1, +1}` and a constant 1 appended to every feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    weights: Vec<f64>,
}

/// Identical feature vectors are merged; `counts[label]` says how often each
/// label followed them. Only non-zero features are kept, the bias included.
struct Pattern {
    active: Vec<(usize, f64)>,
    counts: [f64; 2],
}

impl Pattern {
    fn new(x: &[u8], counts: [f64; 2]) -> Self {
        let mut active: Vec<(usize, f64)> = x
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b != 0)
            .map(|(i, &b)| (i, f64::from(b)))
            .collect();
        active.push((x.len(), 1.0));
        Self { active, counts }
    }

    fn margin(&self, w: &[f64]) -> f64 {
        self.active.iter().map(|&(i, v)| w[i] * v).sum()
    }
}

fn softplus(t: f64) -> f64 {
    t.max(0.0) + (-t.abs()).exp().ln_1p()
}

fn sigmoid(t: f64) -> f64 {
    if t >= 0.0 {
        1.0 / (1.0 + (-t).exp())
    } else {
        let e = t.exp();
        e / (1.0 + e)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Solve `a * x = b` for symmetric positive-definite `a` (row-major, `d x d`).
fn cholesky_solve(mut a: Vec<f64>, mut b: Vec<f64>, d: usize) -> Option<Vec<f64>> {
    for j in 0..d {
        let mut diag = a[j * d + j];
        for k in 0..j {
            diag -= a[j * d + k] * a[j * d + k];
        }
        if diag <= 0.0 || !diag.is_finite() {
            return None;
        }
        let diag = diag.sqrt();
        a[j * d + j] = diag;
        for i in j + 1..d {
            let mut v = a[i * d + j];
            for k in 0..j {
                v -= a[i * d + k] * a[j * d + k];
            }
            a[i * d + j] = v / diag;
        }
    }
    // Forward: L y = b
    for i in 0..d {
        for k in 0..i {
            b[i] -= a[i * d + k] * b[k];
        }
        b[i] /= a[i * d + i];
    }
    // Backward: L^T x = y
    for i in (0..d).rev() {
        for k in i + 1..d {
            b[i] -= a[k * d + i] * b[k];
        }
        b[i] /= a[i * d + i];
    }
    Some(b)
}

impl LogisticRegression {
    fn objective(w: &[f64], patterns: &[Pattern], c: f64) -> f64 {
        let penalty = 0.5 * dot(w, w);
        let loss: f64 = patterns
            .iter()
            .map(|p| {
                let z = p.margin(w);
                p.counts[1] * softplus(-z) + p.counts[0] * softplus(z)
            })
            .sum();
        penalty + c * loss
    }

    /// Damped Newton iterations over merged patterns.
    fn fit_patterns(patterns: &[Pattern], dim: usize, c: f64, max_iter: usize) -> Self {
        let mut w = vec![0.0; dim];
        let mut f = Self::objective(&w, patterns, c);
        let mut initial_norm = None;

        for iter in 0..max_iter {
            let mut grad = w.clone();
            let mut hess = vec![0.0; dim * dim];
            for i in 0..dim {
                hess[i * dim + i] = 1.0;
            }
            // Lower triangle only; mirrored below.
            for p in patterns {
                let s = sigmoid(p.margin(&w));
                let total = p.counts[0] + p.counts[1];
                let g = c * (total * s - p.counts[1]);
                let h = c * total * s * (1.0 - s);
                for (a, &(i, xi)) in p.active.iter().enumerate() {
                    grad[i] += g * xi;
                    for &(j, xj) in &p.active[..=a] {
                        hess[i * dim + j] += h * xi * xj;
                    }
                }
            }
            for i in 0..dim {
                for j in 0..i {
                    hess[j * dim + i] = hess[i * dim + j];
                }
            }

            let norm = dot(&grad, &grad).sqrt();
            let reference = *initial_norm.get_or_insert(norm);
            if norm <= TOLERANCE * reference.max(1.0) {
                log::trace!("logistic regression converged after {iter} iterations");
                break;
            }

            let Some(step) = cholesky_solve(hess, grad.clone(), dim) else {
                log::warn!("logistic regression: singular Hessian at iteration {iter}");
                break;
            };

            // Backtracking line search on the objective.
            let slope = dot(&grad, &step);
            let mut t = 1.0;
            let mut accepted = false;
            while t > 1e-10 {
                let candidate: Vec<f64> =
                    w.iter().zip(&step).map(|(wi, si)| wi - t * si).collect();
                let fc = Self::objective(&candidate, patterns, c);
                if fc <= f - 1e-4 * t * slope {
                    w = candidate;
                    f = fc;
                    accepted = true;
                    break;
                }
                t *= 0.5;
            }
            if !accepted {
                break;
            }
        }
        Self { weights: w }
    }

    /// Fit on `(features, label)` pairs. Feature vectors must share one length.
    pub fn fit<'a, I>(samples: I, c: f64, max_iter: usize) -> Self
    where
        I: IntoIterator<Item = (&'a [u8], u8)>,
    {
        let mut merged: HashMap<&'a [u8], [f64; 2]> = HashMap::new();
        let mut features = 0;
        for (x, y) in samples {
            features = x.len();
            merged.entry(x).or_default()[usize::from(y & 1)] += 1.0;
        }
        let mut merged: Vec<_> = merged.into_iter().collect();
        // Fixed summation order keeps repeated fits bit-identical.
        merged.sort_unstable_by(|a, b| a.0.cmp(b.0));
        let patterns: Vec<Pattern> = merged
            .into_iter()
            .map(|(x, counts)| Pattern::new(x, counts))
            .collect();
        Self::fit_patterns(&patterns, features + 1, c, max_iter)
    }

    /// `w . x + bias`.
    pub fn decision(&self, x: &[u8]) -> f64 {
        let (bias, w) = match self.weights.split_last() {
            Some(parts) => parts,
            None => return 0.0,
        };
        w.iter().zip(x).map(|(wi, &b)| wi * f64::from(b)).sum::<f64>() + bias
    }

    /// Predicted label: 1 iff the decision value is positive.
    pub fn predict(&self, x: &[u8]) -> u8 {
        u8::from(self.decision(x) > 0.0)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Predictability score
// ═══════════════════════════════════════════════════════════════════════════════

/// Hold-out accuracy of a next-bit predictor using the previous `k` bits.
///
/// `k` may not exceed [`MAX_ML_K`].
/// `train_fraction` of the `n - k` samples (in order, no shuffle) train the
/// model; the rest are scored. Input that cannot support a train/test split,
/// or whose training labels are all one class, is not applicable.
pub fn predictability_score(
    bits: &BitSequence,
    k: usize,
    train_fraction: f64,
) -> Result<Predictability, ParamError> {
    if k == 0 {
        return Err(ParamError::InvalidHistory(k));
    }
    if k > MAX_ML_K {
        return Err(ParamError::HistoryTooLong { k, max: MAX_ML_K });
    }
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(ParamError::InvalidTrainFraction(train_fraction));
    }

    let n = bits.len();
    if n <= k {
        return Ok(Predictability::not_applicable(
            format!("insufficient bits: n={n} <= k={k}"),
            0,
        ));
    }
    let m = n - k;
    if m < 2 {
        return Ok(Predictability::not_applicable(
            format!("too few samples: {m}"),
            m,
        ));
    }
    let split = (m as f64 * train_fraction).floor() as usize;
    if split == 0 || split >= m {
        return Ok(Predictability::not_applicable(
            format!("train/test split {split} of {m} leaves an empty side"),
            m,
        ));
    }

    let data = bits.as_slice();
    let sample = |i: usize| (&data[i..i + k], data[i + k]);

    let train_ones = (0..split).filter(|&i| data[i + k] == 1).count();
    if train_ones == 0 || train_ones == split {
        return Ok(Predictability::not_applicable(
            "training labels contain a single class",
            m,
        ));
    }

    let model = LogisticRegression::fit((0..split).map(sample), DEFAULT_C, MAX_ITER);
    let correct = (split..m)
        .map(sample)
        .filter(|(x, y)| model.predict(x) == *y)
        .count();
    let accuracy = correct as f64 / (m - split) as f64;
    log::debug!("ml predictor k={k} train={split} test={} accuracy={accuracy:.4}", m - split);
    Ok(Predictability::Accuracy(accuracy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use randqa_core::{SourceKind, bits_from_source};

    #[test]
    fn rejects_bad_parameters() {
        let bits = BitSequence::alternating(100);
        assert_eq!(
            predictability_score(&bits, 0, 0.5),
            Err(ParamError::InvalidHistory(0))
        );
        assert_eq!(
            predictability_score(&bits, 3, 1.0),
            Err(ParamError::InvalidTrainFraction(1.0))
        );
    }

    #[test]
    fn oversized_history_is_rejected_before_fitting() {
        let mut src = SourceKind::OsRandom.build(0);
        let bits = bits_from_source(src.as_mut(), 200_000).bits;
        assert_eq!(
            predictability_score(&bits, 100_000, 0.5),
            Err(ParamError::HistoryTooLong {
                k: 100_000,
                max: MAX_ML_K
            })
        );
    }

    #[test]
    fn largest_history_still_fits() {
        let mut src = SourceKind::Xorshift.build(3);
        let bits = bits_from_source(src.as_mut(), 20_000).bits;
        let p = predictability_score(&bits, MAX_ML_K, 0.5).unwrap();
        assert!(p.accuracy().unwrap() <= 0.6);
    }

    #[test]
    fn alternating_is_predictable() {
        let p = predictability_score(&BitSequence::alternating(10_000), 3, 0.5).unwrap();
        assert!(p.accuracy().unwrap() > 0.8);
    }

    #[test]
    fn constant_is_not_applicable() {
        let p = predictability_score(&BitSequence::zeros(10_000), 3, 0.5).unwrap();
        assert!(matches!(p, Predictability::NotApplicable { samples: 9_997, .. }));
    }

    #[test]
    fn short_single_class_training_is_not_applicable() {
        let bits = BitSequence::from_bits(vec![0, 1, 0, 1, 0]).unwrap();
        let p = predictability_score(&bits, 2, 0.5).unwrap();
        assert_eq!(p.accuracy(), None);
    }

    #[test]
    fn too_short_is_not_applicable() {
        let bits = BitSequence::alternating(3);
        assert!(predictability_score(&bits, 3, 0.5).unwrap().accuracy().is_none());
        assert!(predictability_score(&bits, 2, 0.5).unwrap().accuracy().is_none());
    }

    #[test]
    fn almost_constant_is_predictable() {
        let bits = BitSequence::from_bools((0..10_000).map(|i| i == 5_000));
        let p = predictability_score(&bits, 3, 0.5).unwrap();
        assert!(p.accuracy().unwrap() > 0.8);
    }

    #[test]
    fn random_is_not_predictable() {
        let mut src = SourceKind::OsRandom.build(0);
        let bits = bits_from_source(src.as_mut(), 20_000).bits;
        let p = predictability_score(&bits, 8, 0.5).unwrap();
        assert!(p.accuracy().unwrap() <= 0.6);
    }

    #[test]
    fn lcg_lsb_is_fully_predictable() {
        let mut src = SourceKind::Lcg.build(7);
        let bits = bits_from_source(src.as_mut(), 10_000).bits;
        let p = predictability_score(&bits, 8, 0.5).unwrap();
        assert_eq!(p.accuracy(), Some(1.0));
    }

    #[test]
    fn regression_learns_a_copy_rule() {
        let samples: Vec<([u8; 1], u8)> =
            (0..200).map(|i| ([(i % 2) as u8], (i % 2) as u8)).collect();
        let model = LogisticRegression::fit(samples.iter().map(|(x, y)| (&x[..], *y)), 1.0, 500);
        assert_eq!(model.predict(&[1]), 1);
        assert_eq!(model.predict(&[0]), 0);
        assert_eq!(model.weights().len(), 2);
    }

    #[test]
    fn cholesky_solves_small_system() {
        // [[4, 2], [2, 3]] x = [2, 1] -> x = [0.5, 0]
        let x = cholesky_solve(vec![4.0, 2.0, 2.0, 3.0], vec![2.0, 1.0], 2).unwrap();
        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!(x[1].abs() < 1e-12);
    }
}
