//! Multiple-comparison corrections and two-sample significance tests.
//!
//! Every function here is total: empty input yields empty or neutral
//! output, never an error.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Outcome of [`bonferroni`].
#[derive(Debug, Clone, PartialEq)]
pub struct BonferroniResult {
    /// `alpha / m` (just `alpha` when there are no tests).
    pub corrected_alpha: f64,
    pub significant: Vec<bool>,
    /// `min(1, p * m)` per test, in input order.
    pub adjusted_p_values: Vec<f64>,
}

/// Adjusted p-values and significance flags, in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrectedPValues {
    pub adjusted_p_values: Vec<f64>,
    pub significant: Vec<bool>,
}

/// Outcome of [`storey_q_values`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreyResult {
    pub q_values: Vec<f64>,
    pub significant: Vec<bool>,
    /// Estimated proportion of true null hypotheses.
    pub pi0: f64,
}

/// Indices of `p_values` in ascending p order; ties keep input order.
fn ascending_order(p_values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..p_values.len()).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));
    order
}

/// Step-up adjustment shared by Benjamini–Hochberg and Storey:
/// `min(1, p_k * scale / k)` for 1-based rank `k`, made monotone by a
/// running minimum from the largest rank down.
fn step_up(p_values: &[f64], scale: f64) -> Vec<f64> {
    let order = ascending_order(p_values);
    let mut adjusted = vec![0.0; p_values.len()];
    let mut running = 1.0_f64;
    for (rank, &idx) in order.iter().enumerate().rev() {
        let value = (p_values[idx] * scale / (rank + 1) as f64).min(1.0);
        running = running.min(value);
        adjusted[idx] = running;
    }
    adjusted
}

/// Bonferroni correction: a test is significant when `p <= alpha / m`.
pub fn bonferroni(p_values: &[f64], alpha: f64) -> BonferroniResult {
    let m = p_values.len();
    if m == 0 {
        return BonferroniResult {
            corrected_alpha: alpha,
            significant: Vec::new(),
            adjusted_p_values: Vec::new(),
        };
    }
    let corrected_alpha = alpha / m as f64;
    BonferroniResult {
        corrected_alpha,
        significant: p_values.iter().map(|&p| p <= corrected_alpha).collect(),
        adjusted_p_values: p_values.iter().map(|&p| (p * m as f64).min(1.0)).collect(),
    }
}

/// Benjamini–Hochberg FDR control; significant when the adjusted p-value
/// is below `fdr`.
pub fn benjamini_hochberg(p_values: &[f64], fdr: f64) -> CorrectedPValues {
    let adjusted = step_up(p_values, p_values.len() as f64);
    CorrectedPValues {
        significant: adjusted.iter().map(|&q| q < fdr).collect(),
        adjusted_p_values: adjusted,
    }
}

/// Holm–Bonferroni step-down procedure.
///
/// Rank `j` (0-based, ascending p) is tested against `alpha / (m - j)`;
/// after the first failure every larger p-value is non-significant.
pub fn holm_bonferroni(p_values: &[f64], alpha: f64) -> CorrectedPValues {
    let m = p_values.len();
    let order = ascending_order(p_values);
    let mut adjusted = vec![0.0; m];
    let mut significant = vec![false; m];
    let mut rejecting = true;
    let mut running = 0.0_f64;

    for (j, &idx) in order.iter().enumerate() {
        let remaining = (m - j) as f64;
        let p = p_values[idx];
        rejecting = rejecting && p <= alpha / remaining;
        significant[idx] = rejecting;
        running = running.max((p * remaining).min(1.0));
        adjusted[idx] = running;
    }

    CorrectedPValues {
        adjusted_p_values: adjusted,
        significant,
    }
}

/// Storey q-values with `pi0` estimated at threshold `lambda`.
///
/// `pi0 = min(1, #{p > lambda} / m / (1 - lambda))`; a `lambda` outside
/// `[0, 1)` leaves `pi0 = 1`, which reduces to Benjamini–Hochberg.
pub fn storey_q_values(p_values: &[f64], fdr: f64, lambda: f64) -> StoreyResult {
    let m = p_values.len();
    if m == 0 {
        return StoreyResult {
            q_values: Vec::new(),
            significant: Vec::new(),
            pi0: 1.0,
        };
    }

    let pi0 = if (0.0..1.0).contains(&lambda) {
        let above = p_values.iter().filter(|&&p| p > lambda).count() as f64;
        (above / m as f64 / (1.0 - lambda)).min(1.0)
    } else {
        1.0
    };

    let q_values = step_up(p_values, m as f64 * pi0);
    StoreyResult {
        significant: q_values.iter().map(|&q| q < fdr).collect(),
        q_values,
        pi0,
    }
}

/// Multiple-comparison correction applied to experiment test outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    None,
    Bonferroni,
    #[default]
    BenjaminiHochberg,
    HolmBonferroni,
    Storey,
}

impl Correction {
    /// Adjusted p-values and significance at level `alpha`.
    pub fn apply(&self, p_values: &[f64], alpha: f64) -> CorrectedPValues {
        match self {
            Correction::None => CorrectedPValues {
                adjusted_p_values: p_values.to_vec(),
                significant: p_values.iter().map(|&p| p < alpha).collect(),
            },
            Correction::Bonferroni => {
                let result = bonferroni(p_values, alpha);
                CorrectedPValues {
                    adjusted_p_values: result.adjusted_p_values,
                    significant: result.significant,
                }
            }
            Correction::BenjaminiHochberg => benjamini_hochberg(p_values, alpha),
            Correction::HolmBonferroni => holm_bonferroni(p_values, alpha),
            Correction::Storey => {
                let result = storey_q_values(p_values, alpha, 0.5);
                CorrectedPValues {
                    adjusted_p_values: result.q_values,
                    significant: result.significant,
                }
            }
        }
    }
}

/// Two-sample significance test used to compare ranking methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    PairedTTest,
    WilcoxonSignedRank,
    MannWhitneyU,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::PairedTTest => "paired_t_test",
            TestType::WilcoxonSignedRank => "wilcoxon_signed_rank",
            TestType::MannWhitneyU => "mann_whitney_u",
        }
    }

    /// Two-sided test of `a` against `b`.
    pub fn run(&self, a: &[f64], b: &[f64]) -> TestOutcome {
        match self {
            TestType::PairedTTest => paired_t_test(a, b),
            TestType::WilcoxonSignedRank => wilcoxon_signed_rank(a, b),
            TestType::MannWhitneyU => mann_whitney_u(a, b),
        }
    }
}

/// Test statistic (absent when undefined) and two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    pub statistic: Option<f64>,
    pub p_value: f64,
}

impl TestOutcome {
    const UNDEFINED: TestOutcome = TestOutcome {
        statistic: None,
        p_value: 1.0,
    };
}

/// Student's paired t-test over the first `min(len)` pairs.
pub fn paired_t_test(a: &[f64], b: &[f64]) -> TestOutcome {
    let n = a.len().min(b.len());
    if n < 2 {
        return TestOutcome::UNDEFINED;
    }
    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    let mean = diffs.iter().sum::<f64>() / n as f64;
    let var = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

    if var <= 0.0 {
        // Constant differences: no evidence if zero, certain otherwise.
        return if mean == 0.0 {
            TestOutcome {
                statistic: Some(0.0),
                p_value: 1.0,
            }
        } else {
            TestOutcome {
                statistic: None,
                p_value: 0.0,
            }
        };
    }

    let t = mean / (var / n as f64).sqrt();
    let df = (n - 1) as f64;
    TestOutcome {
        statistic: Some(t),
        p_value: incomplete_beta(df / 2.0, 0.5, df / (df + t * t)).clamp(0.0, 1.0),
    }
}

/// Wilcoxon signed-rank test, normal approximation with tie correction.
/// Zero differences are dropped. The statistic is `W+`.
pub fn wilcoxon_signed_rank(a: &[f64], b: &[f64]) -> TestOutcome {
    let diffs: Vec<f64> = a
        .iter()
        .zip(b)
        .map(|(x, y)| x - y)
        .filter(|d| *d != 0.0)
        .collect();
    let n = diffs.len() as f64;
    if diffs.is_empty() {
        return TestOutcome::UNDEFINED;
    }

    let magnitudes: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let ranks = average_ranks(&magnitudes);
    let w_plus: f64 = diffs
        .iter()
        .zip(&ranks)
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, r)| r)
        .sum();

    let mean = n * (n + 1.0) / 4.0;
    let var = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_term(&magnitudes) / 48.0;
    if var <= 0.0 {
        return TestOutcome {
            statistic: Some(w_plus),
            p_value: 1.0,
        };
    }
    let z = (w_plus - mean) / var.sqrt();
    TestOutcome {
        statistic: Some(w_plus),
        p_value: two_sided_normal(z),
    }
}

/// Mann–Whitney U test, normal approximation with tie correction.
/// The statistic is `U` for sample `a`.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> TestOutcome {
    if a.is_empty() || b.is_empty() {
        return TestOutcome::UNDEFINED;
    }
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let combined: Vec<f64> = a.iter().chain(b).copied().collect();
    let ranks = average_ranks(&combined);
    let r1: f64 = ranks[..a.len()].iter().sum();
    let u = r1 - n1 * (n1 + 1.0) / 2.0;

    let total = n1 + n2;
    let mean = n1 * n2 / 2.0;
    let var = if total > 1.0 {
        n1 * n2 / 12.0 * ((total + 1.0) - tie_term(&combined) / (total * (total - 1.0)))
    } else {
        0.0
    };
    if var <= 0.0 {
        return TestOutcome {
            statistic: Some(u),
            p_value: 1.0,
        };
    }
    let z = (u - mean) / var.sqrt();
    TestOutcome {
        statistic: Some(u),
        p_value: two_sided_normal(z),
    }
}

/// 1-based ranks with ties sharing their average rank.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end (0-based) hold ranks start+1..=end.
        let avg = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg;
        }
        start = end;
    }
    ranks
}

/// `sum(t^3 - t)` over groups of tied values.
fn tie_term(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut total = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        total += t * t * t - t;
        i = j;
    }
    total
}

fn two_sided_normal(z: f64) -> f64 {
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz–Stegun 7.1.26, absolute error below 1.5e-7.
fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A: [f64; 5] = [0.254_829_592, -0.284_496_736, 1.421_413_741, -1.453_152_027, 1.061_405_429];

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = A.iter().rev().fold(0.0, |acc, &a| acc * t + a) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Lanczos approximation (g = 7, n = 9).
fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEF: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula.
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + G + 0.5;
    let series = COEF
        .iter()
        .enumerate()
        .skip(1)
        .fold(COEF[0], |acc, (i, &c)| acc + c / (x + i as f64));
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Regularized incomplete beta `I_x(a, b)`.
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 3e-14;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let (qab, qap, qam) = (a + b, a + 1.0, a - 1.0);
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: [f64; 5] = [0.001, 0.02, 0.045, 0.08, 0.12];

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_bonferroni_reference_values() {
        let result = bonferroni(&P, 0.05);
        assert!(close(result.corrected_alpha, 0.01, 1e-15));
        assert_eq!(result.significant, vec![true, false, false, false, false]);
        assert!(close(result.adjusted_p_values[0], 0.005, 1e-15));
        assert!(close(result.adjusted_p_values[4], 0.6, 1e-12));
    }

    #[test]
    fn test_holm_reference_values() {
        let result = holm_bonferroni(&P, 0.05);
        assert_eq!(result.significant, vec![true, false, false, false, false]);
        // Running max of p * (m - j): 0.005, 0.08, 0.135, 0.16, 0.16
        let expected = [0.005, 0.08, 0.135, 0.16, 0.16];
        for (got, want) in result.adjusted_p_values.iter().zip(expected) {
            assert!(close(*got, want, 1e-12), "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_holm_stops_at_first_failure() {
        // 0.03 fails 0.05 / 2, so 0.04 is not tested even though 0.04 <= 0.05.
        let result = holm_bonferroni(&[0.01, 0.03, 0.04], 0.05);
        assert_eq!(result.significant, vec![true, false, false]);
    }

    #[test]
    fn test_benjamini_hochberg_reference_values() {
        let result = benjamini_hochberg(&P, 0.05);
        // p * m / k: 0.005, 0.05, 0.075, 0.1, 0.12 → running min from the top.
        let expected = [0.005, 0.05, 0.075, 0.1, 0.12];
        for (got, want) in result.adjusted_p_values.iter().zip(expected) {
            assert!(close(*got, want, 1e-12), "{} vs {}", got, want);
        }
        assert_eq!(result.significant, vec![true, false, false, false, false]);
    }

    #[test]
    fn test_benjamini_hochberg_monotone_in_input_order() {
        let p = [0.04, 0.01, 0.03, 0.02];
        let result = benjamini_hochberg(&p, 0.05);
        // All four scale to 0.04 after the running minimum.
        assert!(result.adjusted_p_values.iter().all(|&q| close(q, 0.04, 1e-12)));
        assert!(result.significant.iter().all(|&s| s));
    }

    #[test]
    fn test_storey_pi0_and_q_values() {
        let p = [0.01, 0.02, 0.6, 0.7, 0.8, 0.9];
        let result = storey_q_values(&p, 0.05, 0.5);
        // 4 of 6 above 0.5: (4 / 6) / 0.5 = 1.33 → capped at 1.
        assert_eq!(result.pi0, 1.0);
        let skewed = storey_q_values(&[0.001, 0.002, 0.003, 0.9], 0.05, 0.5);
        assert!(close(skewed.pi0, 0.5, 1e-12));
        // Largest rank: p * m * pi0 / m = 0.9 * 0.5
        assert!(close(skewed.q_values[3], 0.45, 1e-12));
        assert_eq!(skewed.significant, vec![true, true, true, false]);
    }

    #[test]
    fn test_empty_inputs_are_neutral() {
        let b = bonferroni(&[], 0.05);
        assert!(b.significant.is_empty() && b.adjusted_p_values.is_empty());
        assert!(benjamini_hochberg(&[], 0.05).significant.is_empty());
        assert!(holm_bonferroni(&[], 0.05).significant.is_empty());
        let s = storey_q_values(&[], 0.05, 0.5);
        assert!(s.q_values.is_empty());
        assert_eq!(s.pi0, 1.0);
    }

    #[test]
    fn test_correction_none_uses_raw_p() {
        let result = Correction::None.apply(&[0.01, 0.2], 0.05);
        assert_eq!(result.adjusted_p_values, vec![0.01, 0.2]);
        assert_eq!(result.significant, vec![true, false]);
    }

    #[test]
    fn test_paired_t_one_degree_of_freedom() {
        // Differences [0, 2]: mean 1, sd sqrt(2), t = 1 with df = 1 → p = 0.5.
        let outcome = paired_t_test(&[1.0, 3.0], &[1.0, 1.0]);
        assert!(close(outcome.statistic.unwrap(), 1.0, 1e-12));
        assert!(close(outcome.p_value, 0.5, 1e-9), "p = {}", outcome.p_value);
    }

    #[test]
    fn test_paired_t_cauchy_tail() {
        // t = sqrt(3), df = 1 → p = 1 - 2·atan(sqrt 3)/π = 1/3.
        let d = 3f64.sqrt();
        let a = [1.0 + d - 1.0, 1.0 + d + 1.0];
        let outcome = paired_t_test(&a, &[1.0, 1.0]);
        assert!(close(outcome.statistic.unwrap(), d, 1e-12));
        assert!(close(outcome.p_value, 1.0 / 3.0, 1e-9), "p = {}", outcome.p_value);
    }

    #[test]
    fn test_paired_t_identical_samples() {
        let outcome = paired_t_test(&[0.3, 0.5, 0.7], &[0.3, 0.5, 0.7]);
        assert_eq!(outcome.p_value, 1.0);
        assert_eq!(paired_t_test(&[1.0], &[2.0]).statistic, None);
    }

    #[test]
    fn test_wilcoxon_clear_shift() {
        let a: Vec<f64> = (1..=10).map(|i| i as f64 * 2.0).collect();
        let b: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let outcome = wilcoxon_signed_rank(&a, &b);
        assert_eq!(outcome.statistic, Some(55.0));
        assert!(outcome.p_value < 0.01, "p = {}", outcome.p_value);
        assert_eq!(wilcoxon_signed_rank(&a, &a).p_value, 1.0);
    }

    #[test]
    fn test_mann_whitney_separated_samples() {
        let outcome = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_eq!(outcome.statistic, Some(0.0));
        assert!(outcome.p_value > 0.04 && outcome.p_value < 0.06, "p = {}", outcome.p_value);
        assert_eq!(mann_whitney_u(&[], &[1.0]).p_value, 1.0);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        assert_eq!(average_ranks(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
    }

    #[test]
    fn test_normal_cdf_reference_points() {
        assert!(close(normal_cdf(0.0), 0.5, 1e-7));
        assert!(close(normal_cdf(1.959_963_985), 0.975, 1e-6));
        assert!(close(normal_cdf(-1.0), 0.158_655_254, 1e-6));
    }

    #[test]
    fn test_test_type_ids() {
        assert_eq!(TestType::MannWhitneyU.as_str(), "mann_whitney_u");
        assert_eq!(serde_json::to_string(&TestType::PairedTTest).unwrap(), "\"paired_t_test\"");
    }
}
