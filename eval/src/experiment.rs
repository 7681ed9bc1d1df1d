//! Experiment runner: planted-path benchmarks, per-method metrics,
//! pairwise significance tests and k-fold cross-validation.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use pathrank_core::{Graph, Path};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EvalError, EvalResult};
use crate::methods::{Ranker, ScoredPath};
use crate::metrics::Metric;
use crate::planting::{plant_paths, PlantedBenchmark, PlantingConfig};
use crate::statistics::{Correction, TestType};

pub const DEFAULT_FOLDS: usize = 5;

/// A named ranking method under evaluation.
#[derive(Clone)]
pub struct MethodConfig {
    pub name: String,
    pub ranker: Ranker,
}

impl MethodConfig {
    pub fn new(name: impl Into<String>, ranker: Ranker) -> Self {
        Self {
            name: name.into(),
            ranker,
        }
    }
}

impl fmt::Debug for MethodConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodConfig")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub name: String,
    /// Free-form description of the input graph, copied into the report.
    pub graph_spec: String,
    pub repetitions: usize,
    pub planting: PlantingConfig,
    pub methods: Vec<MethodConfig>,
    pub metrics: Vec<Metric>,
    pub statistical_tests: Vec<TestType>,
    pub correction: Correction,
    pub alpha: f64,
    /// Repetition `r` plants with `planting.seed.unwrap_or(seed) + r`.
    pub seed: u64,
}

impl ExperimentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph_spec: "custom".to_string(),
            repetitions: 10,
            planting: PlantingConfig::default(),
            methods: Vec::new(),
            metrics: vec![Metric::Ndcg, Metric::Map, Metric::Mrr],
            statistical_tests: vec![TestType::PairedTTest],
            correction: Correction::default(),
            alpha: 0.05,
            seed: 42,
        }
    }

    #[must_use]
    pub fn with_graph_spec(mut self, spec: impl Into<String>) -> Self {
        self.graph_spec = spec.into();
        self
    }

    #[must_use]
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    #[must_use]
    pub fn with_planting(mut self, planting: PlantingConfig) -> Self {
        self.planting = planting;
        self
    }

    #[must_use]
    pub fn with_method(mut self, name: impl Into<String>, ranker: Ranker) -> Self {
        self.methods.push(MethodConfig::new(name, ranker));
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: impl IntoIterator<Item = Metric>) -> Self {
        self.metrics = metrics.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_tests(mut self, tests: impl IntoIterator<Item = TestType>) -> Self {
        self.statistical_tests = tests.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> EvalResult<()> {
        if self.repetitions == 0 {
            return Err(EvalError::InvalidConfiguration(
                "repetitions must be at least 1".to_string(),
            ));
        }
        if self.methods.is_empty() {
            return Err(EvalError::InvalidConfiguration(
                "at least one method is required".to_string(),
            ));
        }
        for (i, method) in self.methods.iter().enumerate() {
            if self.methods[..i].iter().any(|m| m.name == method.name) {
                return Err(EvalError::InvalidConfiguration(format!(
                    "duplicate method name: {}",
                    method.name
                )));
            }
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(EvalError::InvalidConfiguration(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        self.planting.validate()
    }

    fn repetition_seed(&self, repetition: usize) -> u64 {
        self.planting
            .seed
            .unwrap_or(self.seed)
            .wrapping_add(repetition as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodResult {
    pub name: String,
    /// Metric id -> mean over repetitions.
    pub results: BTreeMap<String, f64>,
    pub per_repetition: Vec<BTreeMap<String, f64>>,
    /// Total time spent inside the ranker.
    pub runtime_ms: f64,
}

impl MethodResult {
    /// Mean of the declared metrics; 0 when none were computed.
    pub fn aggregate_score(&self) -> f64 {
        mean_of(self.results.values())
    }

    pub fn repetition_scores(&self) -> Vec<f64> {
        self.per_repetition.iter().map(|r| mean_of(r.values())).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticalTestResult {
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub compared_methods: Vec<String>,
    pub p_value: f64,
    pub adjusted_p_value: f64,
    pub significant: bool,
    pub statistic: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentReport {
    pub name: String,
    pub graph_spec: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub metrics: Vec<Metric>,
    pub methods: Vec<MethodResult>,
    pub winner: Option<String>,
    pub correction: Correction,
    pub statistical_tests: Vec<StatisticalTestResult>,
}

impl ExperimentReport {
    pub fn method(&self, name: &str) -> Option<&MethodResult> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeanStd {
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossValidationResult {
    pub k: usize,
    pub folds: Vec<ExperimentReport>,
    /// Method name -> metric id -> mean/std-dev of the fold means.
    pub aggregated: BTreeMap<String, BTreeMap<String, MeanStd>>,
}

/// Run every method on `config.repetitions` planted benchmarks.
pub fn run_experiment(config: &ExperimentConfig, graph: &Graph) -> EvalResult<ExperimentReport> {
    config.validate()?;
    let repetitions: Vec<usize> = (0..config.repetitions).collect();
    run_repetitions(config, graph, &repetitions)
}

/// Partition the repetitions into `k` folds (default 5) and run the
/// experiment once per fold.
///
/// Repetition `i` goes to fold `i % k`. When `k > repetitions`, an empty
/// fold `f` runs repetition `f` on its own so every fold has a distinct
/// seed.
pub fn run_cross_validation(
    config: &ExperimentConfig,
    graph: &Graph,
    k: Option<usize>,
) -> EvalResult<CrossValidationResult> {
    let k = k.unwrap_or(DEFAULT_FOLDS);
    if k == 0 {
        return Err(EvalError::InvalidConfiguration("k must be at least 1".to_string()));
    }
    config.validate()?;

    let mut folds = Vec::with_capacity(k);
    for fold in 0..k {
        let mut repetitions: Vec<usize> = (0..config.repetitions).filter(|i| i % k == fold).collect();
        if repetitions.is_empty() {
            repetitions.push(fold);
        }
        let report = run_repetitions(config, graph, &repetitions)?;
        info!(
            experiment = %config.name,
            fold,
            repetitions = repetitions.len(),
            winner = report.winner.as_deref().unwrap_or("-"),
            "cross-validation fold complete"
        );
        folds.push(report);
    }

    let mut aggregated = BTreeMap::new();
    for method in &config.methods {
        let mut per_metric = BTreeMap::new();
        for metric in &config.metrics {
            let id = metric.id();
            let values: Vec<f64> = folds
                .iter()
                .filter_map(|f| f.method(&method.name))
                .filter_map(|m| m.results.get(&id).copied())
                .collect();
            per_metric.insert(id, mean_std(&values));
        }
        aggregated.insert(method.name.clone(), per_metric);
    }

    Ok(CrossValidationResult { k, folds, aggregated })
}

fn run_repetitions(
    config: &ExperimentConfig,
    graph: &Graph,
    repetitions: &[usize],
) -> EvalResult<ExperimentReport> {
    let started = Instant::now();
    let timestamp = Utc::now();

    let mut per_repetition: Vec<Vec<BTreeMap<String, f64>>> = vec![Vec::new(); config.methods.len()];
    let mut runtime_ms = vec![0.0; config.methods.len()];

    for &rep in repetitions {
        let seed = config.repetition_seed(rep);
        let bench = plant_paths(graph, &config.planting, seed)?;
        debug!(
            repetition = rep,
            seed,
            candidates = bench.candidates.len(),
            "benchmark planted"
        );

        for (m, method) in config.methods.iter().enumerate() {
            let t = Instant::now();
            let scored = (method.ranker)(&bench.graph, &bench.candidates);
            runtime_ms[m] += t.elapsed().as_secs_f64() * 1000.0;

            let (scores, relevance) = align_with_ground_truth(&bench, scored);
            let values: BTreeMap<String, f64> = config
                .metrics
                .iter()
                .map(|metric| (metric.id(), metric.compute(&scores, &relevance)))
                .collect();
            per_repetition[m].push(values);
        }
    }

    let methods: Vec<MethodResult> = config
        .methods
        .iter()
        .zip(per_repetition)
        .zip(runtime_ms)
        .map(|((method, reps), runtime_ms)| {
            let results = config
                .metrics
                .iter()
                .map(|metric| {
                    let id = metric.id();
                    let mean = mean_of(reps.iter().filter_map(|r| r.get(&id)));
                    (id, mean)
                })
                .collect();
            MethodResult {
                name: method.name.clone(),
                results,
                per_repetition: reps,
                runtime_ms,
            }
        })
        .collect();

    let winner = if config.metrics.is_empty() {
        None
    } else {
        // First declared method wins ties.
        methods
            .iter()
            .fold(None::<&MethodResult>, |best, m| match best {
                Some(b) if b.aggregate_score() >= m.aggregate_score() => Some(b),
                _ => Some(m),
            })
            .map(|m| m.name.clone())
    };

    let statistical_tests = compare_methods(config, &methods);
    let duration_ms = u64::try_from(started.elapsed().as_millis()).ok();

    info!(
        experiment = %config.name,
        repetitions = repetitions.len(),
        winner = winner.as_deref().unwrap_or("-"),
        "experiment complete"
    );

    Ok(ExperimentReport {
        name: config.name.clone(),
        graph_spec: config.graph_spec.clone(),
        timestamp,
        duration_ms,
        metrics: config.metrics.clone(),
        methods,
        winner,
        correction: config.correction,
        statistical_tests,
    })
}

/// Predicted order (best first) with matching ground-truth relevance.
///
/// Candidates the ranker did not return are appended below its lowest
/// score, in candidate order.
fn align_with_ground_truth(bench: &PlantedBenchmark, mut scored: Vec<ScoredPath>) -> (Vec<f64>, Vec<f64>) {
    let truth: HashMap<&Path, f64> = bench.candidates.iter().zip(bench.relevance.iter().copied()).collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let floor = scored.last().map(|s| s.score - 1.0).unwrap_or(0.0);
    let mut scores = Vec::with_capacity(bench.candidates.len());
    let mut relevance = Vec::with_capacity(bench.candidates.len());
    let mut returned: Vec<&Path> = Vec::with_capacity(scored.len());
    for s in &scored {
        scores.push(s.score);
        relevance.push(truth.get(&s.path).copied().unwrap_or(0.0));
        returned.push(&s.path);
    }
    for (path, &rel) in bench.candidates.iter().zip(&bench.relevance) {
        if !returned.contains(&path) {
            scores.push(floor);
            relevance.push(rel);
        }
    }
    (scores, relevance)
}

/// Every declared test on every method pair, then the configured
/// correction over all resulting p-values.
fn compare_methods(config: &ExperimentConfig, methods: &[MethodResult]) -> Vec<StatisticalTestResult> {
    let samples: Vec<Vec<f64>> = methods.iter().map(MethodResult::repetition_scores).collect();

    let mut raw = Vec::new();
    for &test_type in &config.statistical_tests {
        for i in 0..methods.len() {
            for j in (i + 1)..methods.len() {
                let outcome = test_type.run(&samples[i], &samples[j]);
                raw.push((test_type, i, j, outcome));
            }
        }
    }

    let p_values: Vec<f64> = raw.iter().map(|(_, _, _, o)| o.p_value).collect();
    let corrected = config.correction.apply(&p_values, config.alpha);

    raw.into_iter()
        .enumerate()
        .map(|(idx, (test_type, i, j, outcome))| StatisticalTestResult {
            test_type,
            compared_methods: vec![methods[i].name.clone(), methods[j].name.clone()],
            p_value: outcome.p_value,
            adjusted_p_value: corrected.adjusted_p_values[idx],
            significant: corrected.significant[idx],
            statistic: outcome.statistic,
        })
        .collect()
}

fn mean_of<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Mean and sample standard deviation (0 for fewer than two values).
fn mean_std(values: &[f64]) -> MeanStd {
    let mean = mean_of(values.iter());
    let std_dev = if values.len() < 2 {
        0.0
    } else {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        var.sqrt()
    };
    MeanStd { mean, std_dev }
}
