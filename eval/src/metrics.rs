//! Ranking quality metrics comparing a predicted ranking with planted
//! ground truth.
//!
//! Every function takes the candidates in predicted order (best first):
//! `relevance[i]` is the ground-truth relevance of the i-th ranked
//! candidate (0 = not relevant) and `scores[i]` its predicted score.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::statistics::average_ranks;

/// A ranking metric, identified by a stable string id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    Spearman,
    Kendall,
    Ndcg,
    Map,
    Mrr,
    PrecisionAt(usize),
    RecallAt(usize),
}

impl Metric {
    /// `spearman`, `kendall`, `ndcg`, `map`, `mrr`, `precision_at_K`,
    /// `recall_at_K`.
    pub fn id(&self) -> String {
        match self {
            Metric::Spearman => "spearman".to_string(),
            Metric::Kendall => "kendall".to_string(),
            Metric::Ndcg => "ndcg".to_string(),
            Metric::Map => "map".to_string(),
            Metric::Mrr => "mrr".to_string(),
            Metric::PrecisionAt(k) => format!("precision_at_{}", k),
            Metric::RecallAt(k) => format!("recall_at_{}", k),
        }
    }

    pub fn compute(&self, scores: &[f64], relevance: &[f64]) -> f64 {
        match *self {
            Metric::Spearman => spearman(scores, relevance),
            Metric::Kendall => kendall_tau_b(scores, relevance),
            Metric::Ndcg => ndcg(relevance),
            Metric::Map => average_precision(relevance),
            Metric::Mrr => reciprocal_rank(relevance),
            Metric::PrecisionAt(k) => precision_at_k(relevance, k),
            Metric::RecallAt(k) => recall_at_k(relevance, k),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl FromStr for Metric {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_k = |rest: &str| {
            rest.parse::<usize>()
                .map_err(|_| EvalError::InvalidConfiguration(format!("invalid cutoff in metric id: {}", s)))
        };
        match s {
            "spearman" => Ok(Metric::Spearman),
            "kendall" => Ok(Metric::Kendall),
            "ndcg" => Ok(Metric::Ndcg),
            "map" => Ok(Metric::Map),
            "mrr" => Ok(Metric::Mrr),
            _ => {
                if let Some(rest) = s.strip_prefix("precision_at_") {
                    parse_k(rest).map(Metric::PrecisionAt)
                } else if let Some(rest) = s.strip_prefix("recall_at_") {
                    parse_k(rest).map(Metric::RecallAt)
                } else {
                    Err(EvalError::InvalidConfiguration(format!("unknown metric: {}", s)))
                }
            }
        }
    }
}

impl TryFrom<String> for Metric {
    type Error = EvalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.id()
    }
}

fn is_relevant(rel: f64) -> bool {
    rel > 0.0
}

/// Fraction of the top `k` that is relevant.
pub fn precision_at_k(relevance: &[f64], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = relevance.iter().take(k).filter(|&&r| is_relevant(r)).count();
    hits as f64 / k as f64
}

/// Fraction of all relevant candidates found in the top `k`.
pub fn recall_at_k(relevance: &[f64], k: usize) -> f64 {
    let total = relevance.iter().filter(|&&r| is_relevant(r)).count();
    if total == 0 {
        return 0.0;
    }
    let hits = relevance.iter().take(k).filter(|&&r| is_relevant(r)).count();
    hits as f64 / total as f64
}

/// `1 / rank` of the first relevant candidate.
pub fn reciprocal_rank(relevance: &[f64]) -> f64 {
    relevance
        .iter()
        .position(|&r| is_relevant(r))
        .map(|pos| 1.0 / (pos + 1) as f64)
        .unwrap_or(0.0)
}

/// Average precision over the relevant candidates.
pub fn average_precision(relevance: &[f64]) -> f64 {
    let total = relevance.iter().filter(|&&r| is_relevant(r)).count();
    if total == 0 {
        return 0.0;
    }
    let mut hits = 0;
    let mut sum = 0.0;
    for (i, &r) in relevance.iter().enumerate() {
        if is_relevant(r) {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    sum / total as f64
}

/// Graded NDCG over the full list.
pub fn ndcg(relevance: &[f64]) -> f64 {
    let dcg = |rels: &[f64]| -> f64 {
        rels.iter()
            .enumerate()
            .map(|(i, &rel)| rel / (i as f64 + 2.0).log2())
            .sum()
    };
    let mut ideal = relevance.to_vec();
    ideal.sort_by(|a, b| b.total_cmp(a));
    let idcg = dcg(&ideal);
    if idcg < f64::EPSILON {
        0.0
    } else {
        dcg(relevance) / idcg
    }
}

/// Spearman correlation: Pearson correlation of average ranks.
pub fn spearman(scores: &[f64], relevance: &[f64]) -> f64 {
    let n = scores.len().min(relevance.len());
    if n < 2 {
        return 0.0;
    }
    pearson(&average_ranks(&scores[..n]), &average_ranks(&relevance[..n]))
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x * var_y).sqrt()
}

/// Kendall's tau-b, which corrects for ties in either ranking.
pub fn kendall_tau_b(scores: &[f64], relevance: &[f64]) -> f64 {
    let n = scores.len().min(relevance.len());
    if n < 2 {
        return 0.0;
    }
    let (mut concordant, mut discordant) = (0i64, 0i64);
    let (mut ties_x, mut ties_y) = (0i64, 0i64);
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = scores[i] - scores[j];
            let dy = relevance[i] - relevance[j];
            match (dx == 0.0, dy == 0.0) {
                (true, true) => {
                    ties_x += 1;
                    ties_y += 1;
                }
                (true, false) => ties_x += 1,
                (false, true) => ties_y += 1,
                (false, false) if (dx > 0.0) == (dy > 0.0) => concordant += 1,
                (false, false) => discordant += 1,
            }
        }
    }
    let pairs = (n * (n - 1) / 2) as i64;
    let denom = (((pairs - ties_x) * (pairs - ties_y)) as f64).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (concordant - discordant) as f64 / denom
}
