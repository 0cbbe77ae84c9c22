//! Benjamini–Hochberg false-discovery-rate correction.

use serde::Serialize;

use crate::pvalue::{PValueTest, PValues};

/// BH q-values, returned in input order.
///
/// Sort ascending, `q_(i) = min(1, p_(i) * m / i)`, then a running minimum
/// from the largest rank down so q is monotone in p.
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let mut q = vec![0.0; m];
    let mut running = 1.0_f64;
    for (rank, &idx) in order.iter().enumerate().rev() {
        let adjusted = (p_values[idx] * m as f64 / (rank + 1) as f64).min(1.0);
        running = running.min(adjusted);
        q[idx] = running;
    }
    q
}

/// One row of the FDR table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FdrEntry {
    pub test: PValueTest,
    pub p_value: f64,
    pub q_value: f64,
    pub rejected: bool,
}

/// Raw p, q and rejection decision per test, in canonical test order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FdrTable {
    pub alpha: f64,
    pub entries: Vec<FdrEntry>,
}

impl FdrTable {
    pub fn new(p_values: &PValues, alpha: f64) -> Self {
        let raw: Vec<f64> = p_values.iter().map(|(_, p)| p).collect();
        let q = benjamini_hochberg(&raw);
        let entries = p_values
            .iter()
            .zip(q)
            .map(|((test, p_value), q_value)| FdrEntry {
                test,
                p_value,
                q_value,
                rejected: q_value <= alpha,
            })
            .collect();
        Self { alpha, entries }
    }

    pub fn get(&self, test: PValueTest) -> Option<&FdrEntry> {
        self.entries.iter().find(|e| e.test == test)
    }

    pub fn any_rejected(&self) -> bool {
        self.entries.iter().any(|e| e.rejected)
    }

    pub fn rejected(&self) -> impl Iterator<Item = &FdrEntry> {
        self.entries.iter().filter(|e| e.rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn textbook_example() {
        let q = benjamini_hochberg(&[0.01, 0.04, 0.03, 0.20]);
        // sorted: 0.01*4/1=0.04, 0.03*4/2=0.06, 0.04*4/3=0.0533 -> 0.0533, 0.2*4/4=0.2
        let expected = [0.04, 0.04 * 4.0 / 3.0, 0.04 * 4.0 / 3.0, 0.20];
        for (got, want) in q.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{q:?}");
        }
    }

    #[test]
    fn monotone_on_small_set() {
        let p = [0.01, 0.05, 0.10];
        let q = benjamini_hochberg(&p);
        assert!(q[0] <= q[1] && q[1] <= q[2]);
        for (pi, qi) in p.iter().zip(&q) {
            assert!(qi >= pi);
        }
    }

    #[test]
    fn empty_input() {
        assert!(benjamini_hochberg(&[]).is_empty());
    }

    #[test]
    fn table_rejects_at_alpha() {
        let p = PValues {
            mono_bit: 0.0,
            runs: 0.5,
            block_frequency: 0.9,
            approx_entropy: 0.004,
        };
        let table = FdrTable::new(&p, 0.01);
        assert!(table.get(PValueTest::MonoBit).unwrap().rejected);
        // 0.004 * 4 / 2 = 0.008
        assert!(table.get(PValueTest::ApproxEntropy).unwrap().rejected);
        assert!(!table.get(PValueTest::Runs).unwrap().rejected);
        assert_eq!(table.rejected().count(), 2);
        assert!(table.any_rejected());
    }

    proptest! {
        #[test]
        fn q_values_are_monotone_and_bounded(p in prop::collection::vec(0.0f64..=1.0, 0..12)) {
            let q = benjamini_hochberg(&p);
            let mut order: Vec<usize> = (0..p.len()).collect();
            order.sort_by(|&a, &b| p[a].total_cmp(&p[b]));
            for pair in order.windows(2) {
                prop_assert!(q[pair[0]] <= q[pair[1]]);
            }
            for (pi, qi) in p.iter().zip(&q) {
                prop_assert!(*qi <= 1.0);
                prop_assert!(*qi >= *pi);
            }
        }
    }
}
