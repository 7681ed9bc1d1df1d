//! pathrank-eval: statistical validation harness for path ranking.
//!
//! Plants known high-signal paths into benchmark graphs, runs ranking
//! methods against them, scores the rankings with IR metrics, compares
//! methods with significance tests under multiple-comparison correction,
//! and renders the outcome as Markdown, LaTeX, JSON or HTML.

pub mod datasets;
mod error;
pub mod experiment;
pub mod generators;
pub mod methods;
pub mod metrics;
pub mod planting;
pub mod report;
pub mod statistics;

pub use datasets::{list_benchmarks, load_benchmark, BenchmarkDatasetMeta, LoadedBenchmark};
pub use error::{EvalError, EvalResult};
pub use experiment::{
    run_cross_validation, run_experiment, CrossValidationResult, ExperimentConfig, ExperimentReport,
    MeanStd, MethodConfig, MethodResult, StatisticalTestResult,
};
pub use methods::{Ranker, ScoredPath};
pub use metrics::Metric;
pub use planting::{plant_paths, OverlapPolicy, PlantedBenchmark, PlantingConfig};
pub use report::{generate_html_report, generate_json_summary, generate_latex_table, generate_markdown_report};
pub use statistics::{
    benjamini_hochberg, bonferroni, holm_bonferroni, storey_q_values, Correction, TestType,
};
